use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::telegram::{ChannelMessage, FeedError, MessageSource};
use crate::utils::{create_browser_client, polite_pause, retry_request};

const PREVIEW_BASE: &str = "https://t.me/s/";
const PAGE_DELAY_MS: u64 = 400;

/// Reads a public channel's history through the t.me web preview.
///
/// The preview serves ~20 messages per page and pages backwards with a
/// `before=<message id>` query parameter, which is all the driver needs; no
/// account or API credentials are involved.
pub struct ChannelPreview {
    client: Client,
    channel: String,
}

/// One parsed preview page. `container_count` counts message blocks before
/// the text filter so pagination can continue past photo-only messages.
#[derive(Debug, Default)]
struct PreviewPage {
    messages: Vec<ChannelMessage>,
    oldest_id: Option<i64>,
    container_count: usize,
}

static MESSAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.tgme_widget_message").unwrap());
static TEXT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.tgme_widget_message_text").unwrap());
static TIME_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("time[datetime]").unwrap());
static BR_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

impl ChannelPreview {
    pub fn new(channel: &str) -> Self {
        Self {
            client: create_browser_client(),
            channel: channel.trim_start_matches('@').to_string(),
        }
    }

    fn page_url(&self, before: Option<i64>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", PREVIEW_BASE, self.channel))
            .context("Failed to build channel preview URL")?;
        if let Some(before) = before {
            url.query_pairs_mut().append_pair("before", &before.to_string());
        }
        Ok(url)
    }

    async fn fetch_page(&self, before: Option<i64>) -> Result<String> {
        let url = self.page_url(before)?;
        let client = self.client.clone();
        let response = retry_request(
            move || {
                let client = client.clone();
                let url = url.clone();
                async move {
                    client
                        .get(url)
                        .send()
                        .await
                        .context("Failed to request channel preview page")
                }
            },
            3,
            500,
        )
        .await
        .context("Failed to fetch channel preview page after retries")?;

        response
            .text()
            .await
            .context("Failed to read channel preview page body")
    }
}

/// Convert a message body's inner HTML to plain text, folding `<br>` tags to
/// newlines so line-anchored patterns still see message structure.
fn html_to_text(inner_html: &str) -> String {
    let with_newlines = BR_TAG.replace_all(inner_html, "\n");
    let fragment = Html::parse_fragment(&with_newlines);
    let text: String = fragment.root_element().text().collect();
    html_escape::decode_html_entities(text.trim()).into_owned()
}

/// Parse one preview page into messages, skipping blocks without a text body.
fn parse_page(html: &str) -> PreviewPage {
    let document = Html::parse_document(html);
    let mut page = PreviewPage::default();

    for element in document.select(&MESSAGE_SELECTOR) {
        page.container_count += 1;

        // data-post holds "<channel>/<message id>"
        let id = match element
            .value()
            .attr("data-post")
            .and_then(|post| post.rsplit('/').next())
            .and_then(|id| id.parse::<i64>().ok())
        {
            Some(id) => id,
            None => {
                tracing::warn!("Skipping preview message block without a post id");
                continue;
            }
        };

        page.oldest_id = Some(page.oldest_id.map_or(id, |oldest: i64| oldest.min(id)));

        let published_at = element
            .select(&TIME_SELECTOR)
            .next()
            .and_then(|time| time.value().attr("datetime"))
            .and_then(|stamp| DateTime::parse_from_rfc3339(stamp).ok())
            .map(|stamp| stamp.with_timezone(&Utc));
        let published_at = match published_at {
            Some(stamp) => stamp,
            None => {
                tracing::warn!(message_id = id, "Skipping preview message without a timestamp");
                continue;
            }
        };

        let text = match element.select(&TEXT_SELECTOR).next() {
            Some(body) => html_to_text(&body.inner_html()),
            // Media-only message; nothing for the pipeline.
            None => continue,
        };
        if text.is_empty() {
            continue;
        }

        page.messages.push(ChannelMessage {
            id,
            text,
            published_at,
        });
    }

    page
}

#[async_trait]
impl MessageSource for ChannelPreview {
    fn source_name(&self) -> &str {
        &self.channel
    }

    async fn fetch_messages(&self, limit: usize) -> Result<Vec<ChannelMessage>> {
        let mut messages: Vec<ChannelMessage> = Vec::new();
        let mut before: Option<i64> = None;

        loop {
            let html = self.fetch_page(before).await?;
            let mut page = parse_page(&html);

            if page.container_count == 0 {
                if before.is_none() {
                    return Err(FeedError::ChannelUnavailable {
                        channel: self.channel.clone(),
                    }
                    .into());
                }
                // Walked past the first message in the channel.
                break;
            }
            let oldest = match page.oldest_id {
                Some(oldest) => oldest,
                None => {
                    return Err(FeedError::MalformedPage {
                        channel: self.channel.clone(),
                    }
                    .into())
                }
            };

            // Preview pages run oldest to newest; the caller wants newest first.
            page.messages.sort_by(|a, b| b.id.cmp(&a.id));
            for message in page.messages {
                if messages.len() >= limit {
                    break;
                }
                messages.push(message);
            }

            tracing::debug!(
                channel = %self.channel,
                fetched = messages.len(),
                oldest_id = oldest,
                "Fetched preview page"
            );

            if messages.len() >= limit {
                break;
            }
            if before == Some(oldest) {
                // No progress; the feed is exhausted.
                break;
            }
            before = Some(oldest);

            polite_pause(PAGE_DELAY_MS).await;
        }

        Ok(messages)
    }
}
