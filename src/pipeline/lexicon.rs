use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use once_cell::sync::Lazy;
use regex::Regex;

lazy_static! {
    /// Every recognized spelling of an exchange, mapped to its canonical
    /// display name. Canonical names map to themselves so the table can be
    /// re-applied at normalization without changing anything.
    pub static ref EXCHANGE_ALIASES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("binance", "Binance");
        map.insert("coinbase", "Coinbase");
        map.insert("okx", "OKX");
        map.insert("okex", "OKX");
        map.insert("kraken", "Kraken");
        map.insert("bybit", "Bybit");
        map.insert("huobi", "Huobi");
        map.insert("gate.io", "Gate");
        map.insert("gateio", "Gate");
        map.insert("gate", "Gate");
        map.insert("kucoin", "KuCoin");
        map.insert("bitfinex", "Bitfinex");
        map.insert("bitstamp", "Bitstamp");
        map.insert("mexc", "MEXC");
        map.insert("bitget", "Bitget");
        map.insert("bitmart", "BitMart");
        map.insert("coinlist", "CoinList");
        map.insert("gemini", "Gemini");
        map.insert("bithumb", "Bithumb");
        map.insert("upbit", "Upbit");
        map.insert("hyperliquid", "Hyperliquid");
        // Chinese spellings used by the channel
        map.insert("币安", "Binance");
        map.insert("欧易", "OKX");
        map.insert("火币", "Huobi");
        map.insert("库币", "KuCoin");
        map
    };

    /// Symbols that look like tickers but never are: exchange names plus the
    /// quote currencies that show up in pair suffixes.
    pub static ref RESERVED_SYMBOLS: HashSet<&'static str> = [
        "BINANCE", "COINBASE", "OKX", "OKEX", "KRAKEN", "BYBIT", "HUOBI", "KUCOIN",
        "BITFINEX", "BITSTAMP", "GATE", "BITHUMB", "UPBIT", "MEXC", "BITGET", "BITMART",
        "COINLIST", "GEMINI", "HYPERLIQUID",
        "USD", "USDT", "USDC", "KRW", "BTC", "ETH", "EUR", "GBP",
    ]
    .into_iter()
    .collect();

    /// Common English words that match the generic ticker shapes. Candidates
    /// in this set are dropped before record building.
    pub static ref COMMON_WORDS: HashSet<&'static str> = [
        "THE", "AND", "FOR", "ARE", "BUT", "NOT", "YOU", "ALL", "CAN", "HER", "WAS",
        "ONE", "OUR", "OUT", "DAY", "GET", "HAS", "HIM", "HIS", "HOW", "ITS", "MAY",
        "NEW", "NOW", "OLD", "SEE", "TWO", "WHO", "WAY", "USE", "SHE", "PUT", "END",
        "WHY", "ASK", "MEN", "TURN", "WANT", "TELL", "WENT", "WERE", "WHAT", "WHEN",
        "WITH", "YOUR", "FROM", "HAVE", "THIS", "THAT", "WILL", "MORE", "VERY", "KNOW",
        "JUST", "LIKE", "LONG", "MAKE", "MANY", "OVER", "SUCH", "TAKE", "THAN", "THEM",
        "WELL", "YEAR", "ABOUT", "AFTER", "AGAIN", "BEING", "BELOW", "BETWEEN", "BOTH",
        "CAME", "CARRY", "CHANGE", "CHILDREN", "CLOSE", "COME", "COULD", "DOES",
        "DON'T", "DURING", "EACH", "EARLY", "EARTH", "EIGHT", "EVERY", "EXAMPLE",
        "EYES", "FACE", "FAMILY", "FAR", "FATHER", "FEET", "FEW", "FIND", "FIRST",
        "FOUND", "FOUR", "GAVE", "GIRL", "GIVE", "GOES", "GOOD", "GOT", "GREAT",
        "GROUP", "GROW", "HAD", "HAND", "HARD", "HEAD", "HEAR", "HELP", "HERE",
        "HIGH", "HOME", "HOUR", "HOUSE", "INTO", "KEEP", "KIND", "KNEW", "LARGE",
        "LAST", "LATE", "LEARN", "LEFT", "LESS", "LIFE", "LIGHT", "LINE", "LIST",
        "LITTLE", "LIVE", "LOOK", "LOOKED", "MADE", "MAN", "MEAN", "MIGHT", "MILES",
        "MISS", "MONEY", "MORNING", "MOST", "MOTHER", "MOVE", "MUCH", "MUST", "NAME",
        "NEAR", "NEED", "NEVER", "NEXT", "NIGHT", "NOON", "NOTE", "NOTHING", "NUMBER",
        "OFF", "OFTEN", "ONCE", "ONLY", "OPEN", "ORDER", "OTHER", "OWN", "PAGE",
        "PAPER", "PART", "PASS", "PAST", "PEOPLE", "PER", "PICTURE", "PLACE", "PLAN",
        "PLAY", "POINT", "READ", "REAL", "RIGHT", "ROOM", "ROUND", "SAID", "SAME",
        "SAW", "SAY", "SCHOOL", "SEA", "SECOND", "SEEM", "SENT", "SET", "SHIP",
        "SHORT", "SHOULD", "SHOW", "SIDE", "SINCE", "SING", "SIT", "SIX", "SIZE",
        "SLOW", "SMALL", "SOON", "SOUND", "SOUTH", "SPACE", "SPEAK", "SPELL", "STAND",
        "START", "STATE", "STILL", "STOP", "STORY", "SURE", "TALK", "TEN", "TEST",
        "THEIR", "THEN", "THERE", "THESE", "THEY", "THING", "THINK", "THOSE", "THREE",
        "THROUGH", "TIME", "TOLD", "TOOK", "TOO", "TOOL", "TOP", "TOWARD", "TOWN",
        "TREE", "TRIED", "TRUE", "TRY", "UNDER", "UNTIL", "UPON", "USED", "USING",
        "USUAL", "VALUE", "VOICE", "WALK", "WARM", "WATCH", "WATER", "WAVE", "WAYS",
        "WEAR", "WEEK", "WEIGHT", "WEST", "WHEEL", "WHERE", "WHICH", "WHILE", "WHITE",
        "WHOLE", "WHOSE", "WIDE", "WIFE", "WILD", "WIND", "WINDOW", "WISH", "WITHIN",
        "WITHOUT", "WOMAN", "WOMEN", "WON'T", "WONDER", "WOOD", "WORD", "WORE",
        "WORK", "WORLD", "WOULD", "WRITE", "WRONG", "WROTE", "YARD", "YELLOW", "YES",
        "YESTERDAY", "YET", "YOUNG", "YOURSELF",
    ]
    .into_iter()
    .collect();
}

/// English exchange spellings, matched against case-folded text.
pub static EXCHANGE_PATTERN_EN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(binance|coinbase|okx|okex|kraken|bybit|huobi|gate\.io|gateio|gate|kucoin|bitfinex|bitstamp|mexc|bitget|bitmart|coinlist|gemini|bithumb|upbit|hyperliquid)\b",
    )
    .unwrap()
});

/// Chinese exchange spellings (no word boundaries around CJK).
pub static EXCHANGE_PATTERN_CN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(币安|欧易|火币|库币)").unwrap());

/// Quote currencies stripped off pair-style candidates, probed in this order
/// so `USDT` wins over its `USD` prefix.
pub const PAIR_SUFFIXES: [&str; 8] = ["USDT", "USD", "USDC", "BTC", "ETH", "EUR", "GBP", "KRW"];

/// Resolve any recognized alias to its canonical display name.
pub fn canonical_exchange(alias: &str) -> Option<&'static str> {
    EXCHANGE_ALIASES.get(alias.to_lowercase().as_str()).copied()
}

/// True for symbols that must never be treated as token candidates.
pub fn is_reserved_symbol(symbol: &str) -> bool {
    RESERVED_SYMBOLS.contains(symbol) || COMMON_WORDS.contains(symbol)
}

/// English month abbreviation to month number.
pub fn month_number(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_names() {
        assert_eq!(canonical_exchange("okex"), Some("OKX"));
        assert_eq!(canonical_exchange("gate.io"), Some("Gate"));
        assert_eq!(canonical_exchange("gateio"), Some("Gate"));
        assert_eq!(canonical_exchange("币安"), Some("Binance"));
        assert_eq!(canonical_exchange("库币"), Some("KuCoin"));
        assert_eq!(canonical_exchange("nasdaq"), None);
    }

    #[test]
    fn canonical_names_are_fixed_points() {
        for canonical in EXCHANGE_ALIASES.values() {
            assert_eq!(canonical_exchange(canonical), Some(*canonical));
        }
    }

    #[test]
    fn reserved_symbols_cover_exchanges_and_quotes() {
        assert!(is_reserved_symbol("BINANCE"));
        assert!(is_reserved_symbol("USDT"));
        assert!(is_reserved_symbol("LIST"));
        assert!(!is_reserved_symbol("SEI"));
    }

    #[test]
    fn english_pattern_matches_known_names_only() {
        assert!(EXCHANGE_PATTERN_EN.is_match("listing on binance today"));
        assert!(EXCHANGE_PATTERN_EN.is_match("gate.io opens trading"));
        assert!(EXCHANGE_PATTERN_EN.is_match("gate opens trading"));
        assert!(!EXCHANGE_PATTERN_EN.is_match("the binances of the world"));
        assert!(!EXCHANGE_PATTERN_EN.is_match("the delegate voted"));
    }

    #[test]
    fn month_lookup_is_case_insensitive() {
        assert_eq!(month_number("Oct"), Some(10));
        assert_eq!(month_number("dec"), Some(12));
        assert_eq!(month_number("foo"), None);
    }
}
