use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use crate::models::listing::ListingRecord;
use crate::pipeline::lexicon::canonical_exchange;

/// An all-caps run inside brackets is treated as the authoritative ticker.
static BRACKETED_TICKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([A-Z0-9]+)\)").unwrap());

static ANY_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]+\)").unwrap());

/// Merge the per-message record stream into the final corpus: canonicalize
/// exchanges and tokens, drop malformed dates, deduplicate, sort by date.
///
/// Idempotent: running it on its own output changes nothing.
pub fn normalize(records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let mut unique: Vec<ListingRecord> = Vec::new();
    let mut seen = HashSet::new();

    for mut record in records {
        // Records normally arrive canonical already; this re-map catches any
        // alias that slipped through.
        if let Some(canonical) = canonical_exchange(&record.exchange) {
            record.exchange = canonical.to_string();
        }

        reconcile_token(&mut record);

        if !record.has_well_formed_date() {
            tracing::warn!(
                date = %record.date,
                token = %record.token,
                exchange = %record.exchange,
                "Dropping listing record with malformed date"
            );
            continue;
        }

        if seen.insert(record.dedup_key()) {
            unique.push(record);
        }
    }

    // Lexicographic ISO sort is date-correct; stable, so first-seen order is
    // kept within a day.
    unique.sort_by(|a, b| a.date.cmp(&b.date));
    unique
}

/// If the display string embeds a bracketed ticker that differs from the bare
/// `token` field, the bracketed form wins and the display brackets are
/// rewritten to match (reconciles e.g. `BOB` vs `BOBBOB`).
fn reconcile_token(record: &mut ListingRecord) {
    let token_upper = record.token.to_uppercase();
    let bracketed = BRACKETED_TICKER
        .captures(&record.token_display)
        .map(|caps| caps[1].to_uppercase());

    match bracketed {
        Some(ticker) if ticker != token_upper => {
            record.token_display = ANY_BRACKET
                .replace_all(&record.token_display, NoExpand(&format!("({})", ticker)))
                .into_owned();
            record.token = ticker;
        }
        _ => record.token = token_upper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listing::MarketType;

    fn record(date: &str, token: &str, exchange: &str, market_type: MarketType) -> ListingRecord {
        ListingRecord {
            date: date.to_string(),
            token: token.to_string(),
            token_display: token.to_string(),
            exchange: exchange.to_string(),
            market_type,
            time: None,
            pairs: None,
            text: String::new(),
            message_id: None,
            message_date: None,
        }
    }

    #[test]
    fn duplicate_listings_across_messages_collapse_to_one() {
        let mut first = record("2024-03-05", "SEI", "Binance", MarketType::Spot);
        first.text = "Binance will list SEI".to_string();
        let mut second = record("2024-03-05", "SEI", "binance", MarketType::Spot);
        second.text = "SEI goes live on Binance today".to_string();

        let normalized = normalize(vec![first, second]);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].text, "Binance will list SEI");
    }

    #[test]
    fn distinct_market_types_are_not_merged() {
        let normalized = normalize(vec![
            record("2024-03-05", "SEI", "Binance", MarketType::Spot),
            record("2024-03-05", "SEI", "Binance", MarketType::Perp),
        ]);
        assert_eq!(normalized.len(), 2);
    }

    #[test]
    fn normalize_is_idempotent() {
        let records = vec![
            record("2024-03-07", "ABC", "okex", MarketType::Spot),
            record("2024-03-05", "SEI", "Binance", MarketType::Spot),
            record("2024-03-05", "SEI", "Binance", MarketType::Spot),
        ];
        let once = normalize(records);
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn bracketed_ticker_in_display_overrides_the_token_field() {
        let mut short = record("2024-03-05", "BOB", "Binance", MarketType::Spot);
        short.token_display = "BOB (BOBBOB)".to_string();
        let long = record("2024-03-05", "BOBBOB", "Binance", MarketType::Spot);

        let normalized = normalize(vec![short, long]);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].token, "BOBBOB");
        assert_eq!(normalized[0].token_display, "BOB (BOBBOB)");
    }

    #[test]
    fn lowercase_bracket_names_do_not_override_the_token() {
        let mut rec = record("2024-03-05", "SEI", "Binance", MarketType::Spot);
        rec.token_display = "SEI (Sei Network)".to_string();
        let normalized = normalize(vec![rec]);
        assert_eq!(normalized[0].token, "SEI");
        assert_eq!(normalized[0].token_display, "SEI (Sei Network)");
    }

    #[test]
    fn malformed_dates_are_dropped_not_deduplicated() {
        let normalized = normalize(vec![
            record("2024-3-5", "SEI", "Binance", MarketType::Spot),
            record("2024-03-05", "SEI", "Binance", MarketType::Spot),
        ]);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].date, "2024-03-05");
    }

    #[test]
    fn exchange_aliases_are_reapplied_defensively() {
        let normalized = normalize(vec![record("2024-03-05", "SEI", "okex", MarketType::Spot)]);
        assert_eq!(normalized[0].exchange, "OKX");
    }

    #[test]
    fn output_is_sorted_ascending_by_date() {
        let normalized = normalize(vec![
            record("2025-01-10", "SENT", "OKX", MarketType::PreMarket),
            record("2024-03-05", "SEI", "Binance", MarketType::Spot),
            record("2024-12-15", "IRYS", "Upbit", MarketType::Spot),
        ]);
        let dates: Vec<&str> = normalized.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-05", "2024-12-15", "2025-01-10"]);
    }
}
