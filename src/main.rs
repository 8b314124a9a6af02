use anyhow::{Context, Result};

mod config;
mod models;
mod output;
mod pipeline;
mod telegram;
mod utils;

use crate::config::Config;
use crate::models::listing::ListingRecord;
use crate::telegram::channel::ChannelPreview;
use crate::telegram::{ChannelMessage, MessageSource};

/// Run every fetched message through the pipeline and stamp provenance.
fn collect_records(messages: &[ChannelMessage]) -> Vec<ListingRecord> {
    let mut all_records = Vec::new();

    for message in messages {
        let mut records = pipeline::process_message(&message.text, message.published_at);
        if records.is_empty() {
            continue;
        }

        let message_date = message.published_at.format("%Y-%m-%d").to_string();
        for record in &mut records {
            record.message_id = Some(message.id);
            record.message_date = Some(message_date.clone());
        }

        // The builder only emits validated dates; this guard catches anything
        // that still slipped through before it can poison dedup keys.
        records.retain(|record| {
            if record.has_well_formed_date() {
                true
            } else {
                tracing::warn!(
                    message_id = message.id,
                    date = %record.date,
                    "Skipping listing with invalid date"
                );
                false
            }
        });

        if !records.is_empty() {
            tracing::info!(
                message_id = message.id,
                listings = records.len(),
                "Found {} listing(s) in message #{}",
                records.len(),
                message.id
            );
            all_records.extend(records);
        }
    }

    all_records
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::new().context("Failed to load configuration")?;

    // Initialize logging
    utils::init_logger(&config.log_level);

    tracing::info!(
        channel = %config.channel,
        limit = config.message_limit,
        "Starting CEX listing scrape of @{}",
        config.channel
    );

    let source = ChannelPreview::new(&config.channel);
    let messages = source
        .fetch_messages(config.message_limit)
        .await
        .with_context(|| format!("Failed to fetch messages from @{}", config.channel))?;

    tracing::info!(
        messages = messages.len(),
        "Fetched {} messages from @{}",
        messages.len(),
        source.source_name()
    );

    let all_records = collect_records(&messages);
    tracing::info!(
        listings = all_records.len(),
        "Extracted {} listing record(s) before deduplication",
        all_records.len()
    );

    let unique = pipeline::normalize::normalize(all_records);
    tracing::info!(
        listings = unique.len(),
        "{} listing record(s) after deduplication",
        unique.len()
    );

    output::write_json(&config.json_out, &unique).context("Failed to write JSON output")?;
    tracing::info!(path = %config.json_out.display(), "Wrote JSON artifact");

    output::write_js(&config.js_out, &unique).context("Failed to write JS output")?;
    tracing::info!(path = %config.js_out.display(), "Wrote JS artifact");

    Ok(())
}
