pub mod builder;
pub mod classifier;
pub mod extractor;
pub mod lexicon;
pub mod normalize;

use chrono::{DateTime, Utc};

use crate::models::listing::ListingRecord;

/// Run the whole per-message pipeline: classify, extract, build.
///
/// Pure and synchronous; irrelevant messages and extraction misses yield an
/// empty set, never an error. Provenance fields are left for the caller to
/// stamp.
pub fn process_message(text: &str, published_at: DateTime<Utc>) -> Vec<ListingRecord> {
    let classification = classifier::classify(text);
    if !classification.relevant {
        return Vec::new();
    }

    let extraction = extractor::extract(text);
    let fallback_date = published_at.format("%Y-%m-%d").to_string();
    builder::build_records(&classification, &extraction, text, Some(&fallback_date))
}
