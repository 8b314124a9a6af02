use std::fmt;

use serde::{Deserialize, Serialize};

/// Market segment a listing announcement refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketType {
    #[serde(rename = "spot")]
    Spot,
    #[serde(rename = "perp")]
    Perp,
    #[serde(rename = "pre-market")]
    PreMarket,
    /// Binance "Alpha Coin" tier. Detected so the classifier can suppress
    /// the whole message; never present on emitted records.
    #[serde(rename = "alpha")]
    Alpha,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Spot => "spot",
            MarketType::Perp => "perp",
            MarketType::PreMarket => "pre-market",
            MarketType::Alpha => "alpha",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar date of a listing, validated field-wise at construction.
///
/// Kept as raw year/month/day rather than a `chrono` date on purpose: the
/// source messages occasionally carry dates like `2024-02-31`, and the range
/// check (not calendar validity) is what decides acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl ListingDate {
    /// Accepts a parsed date only when every field is in range.
    /// Out-of-range values are discarded, never corrected.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if (2000..=2100).contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day) {
            Some(Self { year, month, day })
        } else {
            None
        }
    }
}

impl fmt::Display for ListingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// One extracted listing, the unit of both output artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Effective/announced date as `YYYY-MM-DD`.
    pub date: String,
    /// Canonical uppercase ticker symbol.
    pub token: String,
    /// Human-readable form, e.g. `"SEI (Sei Network)"`; falls back to the
    /// bare ticker when no richer form was found.
    pub token_display: String,
    /// Canonical exchange name, resolved from the alias table.
    pub exchange: String,
    #[serde(rename = "type")]
    pub market_type: MarketType,
    /// Clock time as announced, e.g. `"10:00 UTC"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Trading pair as announced, e.g. `"SEI/USDT"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairs: Option<String>,
    /// Leading snippet of the source message, kept as provenance.
    pub text: String,
    /// Source message id, stamped by the ingestion driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
    /// Source message publish date (`YYYY-MM-DD`), stamped by the driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_date: Option<String>,
}

impl ListingRecord {
    /// Key under which corpus-level deduplication collapses records.
    pub fn dedup_key(&self) -> (String, String, String, MarketType) {
        (
            self.date.clone(),
            self.token.to_uppercase(),
            self.exchange.to_lowercase(),
            self.market_type,
        )
    }

    /// A `date` is usable for dedup/sort only in its exact `YYYY-MM-DD` shape.
    pub fn has_well_formed_date(&self) -> bool {
        self.date.len() == 10 && self.date.chars().filter(|c| *c == '-').count() == 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_date_accepts_in_range_values() {
        let date = ListingDate::from_ymd(2024, 3, 5).expect("date should be accepted");
        assert_eq!(date.to_string(), "2024-03-05");
    }

    #[test]
    fn listing_date_rejects_out_of_range_values() {
        assert!(ListingDate::from_ymd(1999, 12, 31).is_none());
        assert!(ListingDate::from_ymd(2101, 1, 1).is_none());
        assert!(ListingDate::from_ymd(2024, 13, 1).is_none());
        assert!(ListingDate::from_ymd(2024, 1, 32).is_none());
        assert!(ListingDate::from_ymd(2024, 0, 10).is_none());
    }

    #[test]
    fn market_type_serializes_with_hyphenated_pre_market() {
        assert_eq!(
            serde_json::to_string(&MarketType::PreMarket).unwrap(),
            "\"pre-market\""
        );
        assert_eq!(serde_json::to_string(&MarketType::Perp).unwrap(), "\"perp\"");
    }

    #[test]
    fn dedup_key_folds_exchange_case() {
        let record = ListingRecord {
            date: "2024-03-05".to_string(),
            token: "sei".to_string(),
            token_display: "SEI".to_string(),
            exchange: "Binance".to_string(),
            market_type: MarketType::Spot,
            time: None,
            pairs: None,
            text: String::new(),
            message_id: None,
            message_date: None,
        };
        let key = record.dedup_key();
        assert_eq!(key.1, "SEI");
        assert_eq!(key.2, "binance");
    }

    #[test]
    fn well_formed_date_requires_exact_shape() {
        let mut record = ListingRecord {
            date: "2024-03-05".to_string(),
            token: "SEI".to_string(),
            token_display: "SEI".to_string(),
            exchange: "Binance".to_string(),
            market_type: MarketType::Spot,
            time: None,
            pairs: None,
            text: String::new(),
            message_id: None,
            message_date: None,
        };
        assert!(record.has_well_formed_date());
        record.date = "2024-3-5".to_string();
        assert!(!record.has_well_formed_date());
        record.date = "2024-03-05-x".to_string();
        assert!(!record.has_well_formed_date());
    }
}
