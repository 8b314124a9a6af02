use crate::models::listing::{ListingRecord, MarketType};
use crate::pipeline::classifier::Classification;
use crate::pipeline::extractor::Extraction;

/// Caps on the cartesian expansion. They bound per-message fan-out to
/// 5 x 2 records per market type and keep downstream dedup/sort cheap.
pub const MAX_TOKENS_PER_MESSAGE: usize = 5;
pub const MAX_EXCHANGES_PER_MESSAGE: usize = 2;

/// Provenance snippet length kept on every record.
const SOURCE_SNIPPET_CHARS: usize = 300;

/// Combine classifier and extractor output into listing records.
///
/// `fallback_date` is the message publish date; it is only consulted when no
/// in-text date was found and the message carries the alpha market type.
/// (The classifier currently suppresses alpha messages outright, so that
/// branch is unreachable through `process_message`; it is kept to match the
/// documented date-resolution policy and is exercised directly in tests.)
pub fn build_records(
    classification: &Classification,
    extraction: &Extraction,
    text: &str,
    fallback_date: Option<&str>,
) -> Vec<ListingRecord> {
    if !classification.relevant {
        return Vec::new();
    }
    if extraction.tokens.is_empty() || extraction.exchanges.is_empty() {
        return Vec::new();
    }

    let date = match extraction.date {
        Some(date) => date.to_string(),
        None => {
            if classification.market_types.contains(&MarketType::Alpha) {
                match fallback_date {
                    Some(fallback) => fallback.to_string(),
                    None => return Vec::new(),
                }
            } else {
                // A publish date is no substitute for an announced listing date.
                return Vec::new();
            }
        }
    };

    let snippet: String = text.chars().take(SOURCE_SNIPPET_CHARS).collect();
    let mut records = Vec::new();

    for token in extraction.tokens.iter().take(MAX_TOKENS_PER_MESSAGE) {
        let display = extraction
            .token_display
            .get(token)
            .cloned()
            .unwrap_or_else(|| token.clone());
        let pair = extraction
            .pairs
            .iter()
            .find(|(base, _)| base.eq_ignore_ascii_case(token))
            .map(|(base, quote)| format!("{}/{}", base, quote));

        for exchange in extraction.exchanges.iter().take(MAX_EXCHANGES_PER_MESSAGE) {
            for market_type in &classification.market_types {
                records.push(ListingRecord {
                    date: date.clone(),
                    token: token.clone(),
                    token_display: display.clone(),
                    exchange: exchange.clone(),
                    market_type: *market_type,
                    time: extraction.time.clone(),
                    pairs: pair.clone(),
                    text: snippet.clone(),
                    message_id: None,
                    message_date: None,
                });
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listing::ListingDate;

    fn spot_classification() -> Classification {
        Classification {
            relevant: true,
            market_types: vec![MarketType::Spot],
        }
    }

    fn extraction_with(tokens: &[&str], exchanges: &[&str]) -> Extraction {
        Extraction {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            exchanges: exchanges.iter().map(|e| e.to_string()).collect(),
            date: ListingDate::from_ymd(2024, 3, 5),
            ..Extraction::default()
        }
    }

    #[test]
    fn cartesian_expansion_respects_token_and_exchange_caps() {
        let extraction = extraction_with(&["A1", "B1", "C1", "D1", "E1", "F1"], &["X", "Y", "Z"]);
        let records = build_records(&spot_classification(), &extraction, "msg", None);
        assert_eq!(records.len(), MAX_TOKENS_PER_MESSAGE * MAX_EXCHANGES_PER_MESSAGE);
        assert!(records.iter().all(|r| r.token != "F1"));
        assert!(records.iter().all(|r| r.exchange != "Z"));
    }

    #[test]
    fn no_tokens_or_no_exchanges_yields_nothing() {
        let records = build_records(
            &spot_classification(),
            &extraction_with(&[], &["Binance"]),
            "msg",
            None,
        );
        assert!(records.is_empty());
        let records = build_records(
            &spot_classification(),
            &extraction_with(&["SEI"], &[]),
            "msg",
            None,
        );
        assert!(records.is_empty());
    }

    #[test]
    fn missing_date_discards_non_alpha_records() {
        let mut extraction = extraction_with(&["SEI"], &["Binance"]);
        extraction.date = None;
        let records = build_records(&spot_classification(), &extraction, "msg", Some("2024-03-05"));
        assert!(records.is_empty());
    }

    #[test]
    fn alpha_records_fall_back_to_the_publish_date() {
        let classification = Classification {
            relevant: true,
            market_types: vec![MarketType::Alpha],
        };
        let mut extraction = extraction_with(&["VSN"], &["Binance"]);
        extraction.date = None;
        let records = build_records(&classification, &extraction, "msg", Some("2025-06-01"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2025-06-01");

        let records = build_records(&classification, &extraction, "msg", None);
        assert!(records.is_empty());
    }

    #[test]
    fn irrelevant_classification_yields_nothing() {
        let classification = Classification {
            relevant: false,
            market_types: Vec::new(),
        };
        let extraction = extraction_with(&["SEI"], &["Binance"]);
        assert!(build_records(&classification, &extraction, "msg", None).is_empty());
    }

    #[test]
    fn matching_pair_is_attached_per_token() {
        let mut extraction = extraction_with(&["SEI", "ABC"], &["Binance"]);
        extraction.pairs = vec![("SEI".to_string(), "USDT".to_string())];
        let records = build_records(&spot_classification(), &extraction, "msg", None);
        let sei = records.iter().find(|r| r.token == "SEI").unwrap();
        assert_eq!(sei.pairs.as_deref(), Some("SEI/USDT"));
        let abc = records.iter().find(|r| r.token == "ABC").unwrap();
        assert!(abc.pairs.is_none());
    }

    #[test]
    fn display_falls_back_to_the_bare_ticker() {
        let extraction = extraction_with(&["SEI"], &["Binance"]);
        let records = build_records(&spot_classification(), &extraction, "msg", None);
        assert_eq!(records[0].token_display, "SEI");
    }

    #[test]
    fn source_snippet_is_truncated_to_300_chars() {
        let text = "Binance will list ABC ".repeat(30);
        let extraction = extraction_with(&["ABC"], &["Binance"]);
        let records = build_records(&spot_classification(), &extraction, &text, None);
        assert_eq!(records[0].text.chars().count(), 300);
    }
}
