use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::listing::ListingRecord;

/// Notes field cap in the JS artifact.
const NOTES_MAX_CHARS: usize = 150;

/// Write the record set as a pretty-printed JSON array.
pub fn write_json(path: &Path, records: &[ListingRecord]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON output at {}", path.display()))?;
    serde_json::to_writer_pretty(file, records).context("Failed to serialize listing records")?;
    Ok(())
}

/// Write the record set as an embeddable `data.js` script.
pub fn write_js(path: &Path, records: &[ListingRecord]) -> Result<()> {
    std::fs::write(path, render_js(records))
        .with_context(|| format!("Failed to write JS output at {}", path.display()))
}

/// Render records as a literal `const cexListings = [...]` assignment with
/// free-text fields escaped for embedding.
pub fn render_js(records: &[ListingRecord]) -> String {
    let mut out = String::new();
    out.push_str("// CEX listing data\n");
    out.push_str("// Shape: { date: 'YYYY-MM-DD', token, token_display, exchange, type, time, pairs, notes }\n");
    out.push_str("// Generated by cex-listing-scraper\n\n");
    out.push_str("const cexListings = [\n");

    for record in records {
        out.push_str("    {\n");
        out.push_str(&format!("        date: '{}',\n", record.date));
        out.push_str(&format!("        token: '{}',\n", record.token));
        out.push_str(&format!(
            "        token_display: '{}',\n",
            escape_field(&record.token_display)
        ));
        out.push_str(&format!("        exchange: '{}',\n", record.exchange));
        out.push_str(&format!("        type: '{}',\n", record.market_type));
        if let Some(time) = &record.time {
            out.push_str(&format!("        time: '{}',\n", time));
        }
        if let Some(pairs) = &record.pairs {
            out.push_str(&format!("        pairs: '{}',\n", pairs));
        }
        if !record.text.is_empty() {
            let notes: String = record.text.chars().take(NOTES_MAX_CHARS).collect();
            out.push_str(&format!("        notes: '{}',\n", escape_field(&notes)));
        }
        out.push_str("    },\n");
    }

    out.push_str("];\n");
    out
}

/// Flatten newlines and escape quote characters for a single-quoted JS string.
fn escape_field(text: &str) -> String {
    text.replace('\n', " ")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
}
