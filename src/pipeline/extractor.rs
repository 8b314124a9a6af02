use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::listing::ListingDate;
use crate::pipeline::lexicon::{
    canonical_exchange, is_reserved_symbol, month_number, EXCHANGE_PATTERN_CN, EXCHANGE_PATTERN_EN,
    PAIR_SUFFIXES,
};

/// Entities pulled out of a single message.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Ticker candidates in the order they were found.
    pub tokens: Vec<String>,
    /// Richer display forms keyed by ticker, e.g. `"SEI" -> "SEI (Sei Network)"`.
    pub token_display: HashMap<String, String>,
    /// Canonical exchange names, deduplicated in first-seen order.
    pub exchanges: Vec<String>,
    pub date: Option<ListingDate>,
    pub time: Option<String>,
    /// `(base, quote)` trading pairs as announced.
    pub pairs: Vec<(String, String)>,
}

/// How the capture groups of a date pattern map onto year/month/day.
#[derive(Debug, Clone, Copy)]
enum DateShape {
    /// `2024-12-15`, `2024/12/15`
    YearMonthDay,
    /// `Oct 23, 2025`
    MonthNameDayYear,
    /// `23 Oct 2025`
    DayMonthNameYear,
    /// `2025年11月14日`
    CjkYearMonthDay,
    /// `12-15-2024`
    MonthDayYear,
}

/// Date patterns tried in order; the first pattern to match decides the
/// parse. ISO comes first because it is the least ambiguous.
static DATE_PATTERNS: Lazy<Vec<(Regex, DateShape)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(\d{4})[-/](\d{1,2})[-/](\d{1,2})").unwrap(),
            DateShape::YearMonthDay,
        ),
        (
            Regex::new(r"(?i)(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[\s./,-]+(\d{1,2})[\s./,-]+(\d{4})").unwrap(),
            DateShape::MonthNameDayYear,
        ),
        (
            Regex::new(r"(?i)(\d{1,2})[\s./,-]+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[\s./,-]+(\d{4})").unwrap(),
            DateShape::DayMonthNameYear,
        ),
        (
            Regex::new(r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日").unwrap(),
            DateShape::CjkYearMonthDay,
        ),
        (
            Regex::new(r"(\d{1,2})[-/](\d{1,2})[-/](\d{4})").unwrap(),
            DateShape::MonthDayYear,
        ),
    ]
});

/// `Name (TICKER)`, e.g. `Rayls (RLS)`.
static BRACKET_NAME_TICKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z][A-Za-z]+)\s*\(([A-Z]{2,10})\)").unwrap());

/// `TICKER (Name)`, e.g. `SENT (Sentient)` or `SEI (Sei Network)`.
static BRACKET_TICKER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]{2,10})\s*\(([A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]*)*)\)").unwrap());

/// Single-capture ticker shapes, most specific first. These run against the
/// original-case text; candidates already claimed by a bracket shape are not
/// re-added.
static TOKEN_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // announcement phrasing with the ticker in object position
        r"list\s+perpetual\s+futures\s+for\s+([A-Z]{2,10})",
        r"to\s+list\s+perpetual\s+futures\s+for\s+([A-Z]{2,10})",
        r"list\s+([A-Z]{2,10})\s+for\s+spot",
        r"list\s+([A-Z]{2,10})\s+for\s+perpetual",
        // alpha-tier phrasing (the classifier suppresses these messages, but
        // the shapes stay extractable on their own)
        r"new\s+binance\s+alpha\s+coin[:\s]+([A-Z]{2,10})",
        r"binance\s+alpha\s+coin[:\s]+([A-Z]{2,10})",
        r"alpha\s+coin[:\s]+([A-Z]{2,10})",
        // Upbit Korean notice shapes
        r"([A-Z]{2,10})\s*\([^)]+\)\s*원화",
        r"플룸\s*\(([A-Z]{2,10})\)",
        r"([A-Z]{2,10})\s+KRW",
        // standard listing phrasing
        r"list\s+([A-Z]{2,10})\s+for",
        r"list\s+([A-Z]{2,10})",
        r"listing\s+of\s+([A-Z]{2,10})",
        r"to\s+list\s+([A-Z]{2,10})",
        r"上线\s+([A-Z]{2,10})",
        r"add\s+([A-Z]{2,10})",
        // looser shapes
        r"\$([A-Z]{2,10})\b",
        r"\b([A-Z]{3,10})\s+(?:will|to|is|are|has|have|listing|list|on|for)",
        r"introducing\s+([A-Z]{2,10})",
        r"\(([A-Z]{2,10})\)",
        r"([A-Z]{2,10})\s*\(",
        // concatenated pair mentions, e.g. IRYSUSDT
        r"([A-Z]{2,10})(?:USDT|USD|BTC|ETH|EUR|GBP|KRW|USDC)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})\s*(?:AM|PM|am|pm)?\s*(UTC|utc|GMT|gmt)?").unwrap());

static PAIR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]{2,10})[/\-](USDT|USDC|USD|BTC|ETH|EUR|GBP)").unwrap());

/// Bookkeeping for token candidates: which tickers are already claimed, which
/// display strings they carry, and which bracket display-names must never be
/// resurfaced as tickers of their own.
#[derive(Debug, Default)]
struct TokenSieve {
    tokens: Vec<String>,
    display: HashMap<String, String>,
    claimed: HashSet<String>,
    bracket_names: Vec<String>,
}

impl TokenSieve {
    /// Claim a `Name (TICKER)` match.
    fn claim_name_ticker(&mut self, name: &str, ticker: &str) {
        let upper = ticker.to_uppercase();
        if self.claimed.contains(&upper) {
            return;
        }
        self.bracket_names.push(name.to_string());
        self.display
            .insert(upper.clone(), format!("{} ({})", name, ticker));
        self.tokens.push(upper.clone());
        self.claimed.insert(upper);
    }

    /// Claim a `TICKER (Name)` match.
    fn claim_ticker_name(&mut self, ticker: &str, name: &str) {
        let upper = ticker.to_uppercase();
        if self.claimed.contains(&upper) {
            return;
        }
        self.display
            .insert(upper.clone(), format!("{} ({})", ticker, name));
        self.tokens.push(upper.clone());
        self.claimed.insert(upper);
    }

    /// Offer a generic candidate; reserved symbols and common words are
    /// rejected here.
    fn offer(&mut self, raw: &str) {
        let upper = raw.to_uppercase();
        if self.bracket_names.iter().any(|name| *name == upper) {
            return;
        }
        if self.claimed.contains(&upper) {
            return;
        }
        if is_reserved_symbol(&upper) {
            return;
        }
        self.tokens.push(upper.clone());
        self.claimed.insert(upper);
    }

    /// Strip pair-suffixes and drop candidates that were really the name half
    /// of a bracket match.
    fn finish(self) -> (Vec<String>, HashMap<String, String>) {
        let mut cleaned: Vec<String> = Vec::new();
        for mut token in self.tokens {
            for suffix in PAIR_SUFFIXES {
                if token.ends_with(suffix) && token.len() > suffix.len() {
                    token.truncate(token.len() - suffix.len());
                    break;
                }
            }
            if self.bracket_names.iter().any(|name| *name == token) {
                continue;
            }
            if !cleaned.contains(&token) {
                cleaned.push(token);
            }
        }
        (cleaned, self.display)
    }
}

/// Pull tokens, exchanges, date, time, and trading pairs out of one message.
pub fn extract(text: &str) -> Extraction {
    let lower = text.to_lowercase();

    let mut sieve = TokenSieve::default();
    for caps in BRACKET_NAME_TICKER.captures_iter(text) {
        sieve.claim_name_ticker(&caps[1], &caps[2]);
    }
    for caps in BRACKET_TICKER_NAME.captures_iter(text) {
        sieve.claim_ticker_name(&caps[1], &caps[2]);
    }
    for pattern in TOKEN_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            sieve.offer(&caps[1]);
        }
    }
    let (tokens, token_display) = sieve.finish();

    Extraction {
        tokens,
        token_display,
        exchanges: extract_exchanges(&lower),
        date: extract_date(text),
        time: extract_time(text),
        pairs: extract_pairs(text),
    }
}

fn extract_exchanges(lower: &str) -> Vec<String> {
    let mut exchanges: Vec<String> = Vec::new();
    let push = |alias: &str, exchanges: &mut Vec<String>| {
        if let Some(canonical) = canonical_exchange(alias) {
            if !exchanges.iter().any(|e| e == canonical) {
                exchanges.push(canonical.to_string());
            }
        }
    };
    for caps in EXCHANGE_PATTERN_EN.captures_iter(lower) {
        push(&caps[1], &mut exchanges);
    }
    for caps in EXCHANGE_PATTERN_CN.captures_iter(lower) {
        push(&caps[1], &mut exchanges);
    }
    exchanges
}

/// First date pattern to match decides the parse; an out-of-range result is
/// discarded without falling through to later patterns.
fn extract_date(text: &str) -> Option<ListingDate> {
    for (pattern, shape) in DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            return parse_date(&caps, *shape);
        }
    }
    None
}

fn parse_date(caps: &regex::Captures<'_>, shape: DateShape) -> Option<ListingDate> {
    let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");
    let (year, month, day) = match shape {
        DateShape::YearMonthDay | DateShape::CjkYearMonthDay => (
            group(1).parse().ok()?,
            group(2).parse().ok()?,
            group(3).parse().ok()?,
        ),
        DateShape::MonthNameDayYear => (
            group(3).parse().ok()?,
            month_number(group(1))?,
            group(2).parse().ok()?,
        ),
        DateShape::DayMonthNameYear => (
            group(3).parse().ok()?,
            month_number(group(2))?,
            group(1).parse().ok()?,
        ),
        DateShape::MonthDayYear => (
            group(3).parse().ok()?,
            group(1).parse().ok()?,
            group(2).parse().ok()?,
        ),
    };
    ListingDate::from_ymd(year, month, day)
}

/// `HH:MM` with an optional timezone label; a meridiem is consumed but not
/// echoed, matching the upstream feed's rendering.
fn extract_time(text: &str) -> Option<String> {
    let caps = TIME_PATTERN.captures(text)?;
    let mut time = format!("{}:{}", &caps[1], &caps[2]);
    if let Some(tz) = caps.get(3) {
        time.push(' ');
        time.push_str(&tz.as_str().to_uppercase());
    }
    Some(time)
}

fn extract_pairs(text: &str) -> Vec<(String, String)> {
    PAIR_PATTERN
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}
