use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::listing::MarketType;
use crate::pipeline::lexicon::{EXCHANGE_PATTERN_CN, EXCHANGE_PATTERN_EN};

/// Outcome of classifying one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// False when the message is a delist, a pure promotion, lacks listing
    /// language or a recognized exchange, or is an alpha-tier announcement.
    pub relevant: bool,
    /// Resolved market types in first-seen order, no duplicates.
    pub market_types: Vec<MarketType>,
}

impl Classification {
    fn irrelevant() -> Self {
        Self {
            relevant: false,
            market_types: Vec::new(),
        }
    }
}

fn patterns(raw: &[&str]) -> Vec<Regex> {
    raw.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// Delisting/suspension phrases. Any hit makes the whole message irrelevant,
/// even when listing language is also present.
static DELIST_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    patterns(&[
        r"\bdelisting\b",
        r"\bdelist\b",
        r"下架",
        r"removal",
        r"暂停交易",
        r"suspend.*trading",
        r"停止交易",
        r"停止.*交易",
        r"终止.*交易",
        r"取消.*交易",
        r"remove.*trading",
        r"will.*delist",
        r"to.*delist",
        r"going.*to.*delist",
        r"停止.*上市",
    ])
});

/// Broad "is this about a listing at all" probe. A message failing this probe
/// is still kept unless it also reads as a pure promotion.
static LISTING_PROBE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\blisting\b|\blist\b|上市|上线|alpha\s+coin|new.*coin|add.*trading").unwrap());

/// Whole-message promotion shapes. Only applied when the listing probe failed,
/// so a listing that happens to bundle an airdrop survives.
static PURE_PROMO_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    patterns(&[
        r"^.*airdrop\s*$",
        r"^.*空投\s*$",
        r"^.*campaign\s*$",
        r"^.*promotion\s*$",
        r"^.*giveaway\s*$",
        r"^.*contest\s*$",
        r"^.*reward\s*$",
    ])
});

/// The full listing-phrase gate, wider than the probe above.
static LISTING_KEYWORDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    patterns(&[
        r"\blisting\b",
        r"\blist\b",
        r"上市",
        r"上线",
        r"add.*spot",
        r"add.*perpetual",
        r"new.*trading",
        r"launch.*trading",
        r"will.*list",
        r"to.*list",
        r"list.*spot",
        r"list.*perpetual",
        r"list.*perp",
        r"add.*trading",
        r"opens.*trading",
        r"start.*trading",
        r"available.*trading",
        r"alpha\s+coin",
        r"new.*coin",
        r"introducing.*on",
        r"마켓.*추가",
        r"新增.*资产",
        r"important\s+notice.*list",
        r"重要通知.*上线",
    ])
});

static PRE_MARKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"pre-market|premarket|预上市|预市").unwrap());

static ALPHA_TIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"new\s+binance\s+alpha\s+coin|binance\s+alpha\s+coin|alpha\s+coin|binance\s+alpha")
        .unwrap()
});

static DERIVATIVE_WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"perpetual|perp|futures|永续|合约").unwrap());

static EXPLICIT_PERP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"perpetual\s+futures|perpetual\s+contract|perp\s+contract|永续合约|futures.*perpetual|contract.*api|合约.*api").unwrap()
});

static BINANCE_FUTURES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"binance\s+futures|futures.*will\s+launch").unwrap());

static BINANCE_SPOT_PRODUCTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"earn|buy\s+crypto|convert.*margin|margin").unwrap());

static OKX_SPOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"spot\s+trading|list.*for\s+spot").unwrap());

static OKX_PERP: Lazy<Regex> = Lazy::new(|| Regex::new(r"perpetual\s+futures|list.*perpetual").unwrap());

static GENERIC_PERP: Lazy<Regex> = Lazy::new(|| Regex::new(r"perpetual|perp|futures|swap|合约").unwrap());

static GENERIC_SPOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"spot|现货|roadmap|마켓.*추가|新增.*资产").unwrap());

fn push_unique(types: &mut Vec<MarketType>, market_type: MarketType) {
    if !types.contains(&market_type) {
        types.push(market_type);
    }
}

/// Decide whether a message announces a tradable listing, and of which kinds.
///
/// Gates run in strict priority order: delist filter, listing-intent probe
/// with the pure-promotion fallback, the listing-keyword gate, the
/// exchange-presence gate, then market-type resolution. Alpha-tier messages
/// pass every gate and are then suppressed wholesale.
pub fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();

    if DELIST_PATTERNS.iter().any(|p| p.is_match(&lower)) {
        return Classification::irrelevant();
    }

    if !LISTING_PROBE.is_match(&lower)
        && PURE_PROMO_PATTERNS.iter().any(|p| p.is_match(&lower))
    {
        return Classification::irrelevant();
    }

    if !LISTING_KEYWORDS.iter().any(|p| p.is_match(&lower)) {
        return Classification::irrelevant();
    }

    if !EXCHANGE_PATTERN_EN.is_match(&lower) && !EXCHANGE_PATTERN_CN.is_match(&lower) {
        return Classification::irrelevant();
    }

    match resolve_market_types(&lower) {
        Some(market_types) => Classification {
            relevant: true,
            market_types,
        },
        // Alpha-tier announcements are excluded from output entirely.
        None => Classification::irrelevant(),
    }
}

/// Priority-ordered market-type resolution over the case-folded text.
///
/// The Coinbase branch appends before the ladder starts, so a Coinbase
/// message can carry a second type from a later branch; every other branch is
/// part of one if/else-if chain. Returns `None` for alpha-tier messages.
fn resolve_market_types(lower: &str) -> Option<Vec<MarketType>> {
    let mut types = Vec::new();
    let pre_market = PRE_MARKET.is_match(lower);

    // Coinbase announcements are spot unless explicitly pre-market.
    if lower.contains("coinbase") {
        push_unique(
            &mut types,
            if pre_market {
                MarketType::PreMarket
            } else {
                MarketType::Spot
            },
        );
    }

    if ALPHA_TIER.is_match(lower) {
        return None;
    } else if pre_market && DERIVATIVE_WORDS.is_match(lower) {
        push_unique(&mut types, MarketType::PreMarket);
    } else if pre_market {
        push_unique(&mut types, MarketType::PreMarket);
    } else if EXPLICIT_PERP.is_match(lower) {
        push_unique(&mut types, MarketType::Perp);
    } else if lower.contains("bybit") && lower.contains("convert") {
        push_unique(&mut types, MarketType::Spot);
    } else if lower.contains("bybit") && lower.contains("contract") && !lower.contains("convert") {
        push_unique(&mut types, MarketType::Perp);
    } else if BINANCE_FUTURES.is_match(lower) {
        push_unique(&mut types, MarketType::Perp);
    } else if lower.contains("binance") && BINANCE_SPOT_PRODUCTS.is_match(lower) {
        push_unique(&mut types, MarketType::Spot);
    } else if lower.contains("okx") && OKX_SPOT.is_match(lower) {
        push_unique(&mut types, MarketType::Spot);
    } else if lower.contains("okx") && OKX_PERP.is_match(lower) && !pre_market {
        push_unique(&mut types, MarketType::Perp);
    } else if lower.contains("hyperliquid") && lower.contains("永续合约") {
        push_unique(&mut types, MarketType::Perp);
    } else if GENERIC_PERP.is_match(lower) && !lower.contains("spot") && !pre_market {
        push_unique(&mut types, MarketType::Perp);
    } else if GENERIC_SPOT.is_match(lower) {
        push_unique(&mut types, MarketType::Spot);
    }

    if types.is_empty() {
        types.push(MarketType::Spot);
    }
    Some(types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delist_wins_over_cooccurring_listing_language() {
        let result = classify("Binance will delist XYZ trading pairs on 2024-01-01");
        assert!(!result.relevant);
    }

    #[test]
    fn chinese_delist_phrases_are_filtered() {
        assert!(!classify("币安将下架 ABC 交易对").relevant);
        assert!(!classify("OKX 暂停交易 ABC，listing 取消").relevant);
    }

    #[test]
    fn pure_promotion_without_listing_intent_is_filtered() {
        assert!(!classify("Join the huge Binance airdrop").relevant);
        assert!(!classify("Trade on OKX and win big: trading contest").relevant);
    }

    #[test]
    fn listing_bundled_with_promotion_survives() {
        let result = classify("Binance will list ABC with a bonus airdrop for early traders");
        assert!(result.relevant);
        assert_eq!(result.market_types, vec![MarketType::Spot]);
    }

    #[test]
    fn message_without_listing_keywords_is_irrelevant() {
        assert!(!classify("Binance scheduled wallet maintenance tonight").relevant);
    }

    #[test]
    fn message_without_recognized_exchange_is_irrelevant() {
        assert!(!classify("New listing: ABC will start trading on 2024-01-01").relevant);
    }

    #[test]
    fn pre_market_takes_precedence_over_perp_phrasing() {
        let result = classify("OKX to list pre-market perpetual futures for SENT (Sentient)");
        assert!(result.relevant);
        assert_eq!(result.market_types, vec![MarketType::PreMarket]);
    }

    #[test]
    fn alpha_tier_suppresses_the_whole_message() {
        assert!(!classify("New Binance Alpha Coin: VSN").relevant);
        assert!(!classify("Binance Alpha will list ABC today").relevant);
    }

    #[test]
    fn bybit_convert_is_spot() {
        let result = classify("Bybit adds ABC listing on Convert");
        assert!(result.relevant);
        assert_eq!(result.market_types, vec![MarketType::Spot]);
    }

    #[test]
    fn bybit_contract_without_convert_is_perp() {
        let result = classify("Bybit will list ABC contract trading");
        assert!(result.relevant);
        assert_eq!(result.market_types, vec![MarketType::Perp]);
    }

    #[test]
    fn explicit_perpetual_futures_is_perp() {
        let result = classify("Binance will list perpetual futures for SEI");
        assert!(result.relevant);
        assert_eq!(result.market_types, vec![MarketType::Perp]);
    }

    #[test]
    fn coinbase_branch_appends_alongside_generic_perp() {
        let result = classify("Coinbase will list ABC, and perpetual futures will follow");
        assert!(result.relevant);
        assert_eq!(
            result.market_types,
            vec![MarketType::Spot, MarketType::Perp]
        );
    }

    #[test]
    fn coinbase_pre_market_yields_one_pre_market_type() {
        let result = classify("Coinbase pre-market listing for ABC futures");
        assert!(result.relevant);
        assert_eq!(result.market_types, vec![MarketType::PreMarket]);
    }

    #[test]
    fn unnarrowed_listing_defaults_to_spot() {
        let result = classify("Binance will list ABC on 2024-01-01");
        assert!(result.relevant);
        assert_eq!(result.market_types, vec![MarketType::Spot]);
    }

    #[test]
    fn generic_spot_phrasing_resolves_to_spot() {
        let result = classify("Upbit 마켓 추가: new trading for KRW market");
        assert!(result.relevant);
        assert_eq!(result.market_types, vec![MarketType::Spot]);
    }
}
