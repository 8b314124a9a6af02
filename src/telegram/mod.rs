pub mod channel;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// One raw message pulled from the channel, before any classification.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    /// Channel-local message id.
    pub id: i64,
    /// Plain message text, entities decoded and line breaks preserved.
    pub text: String,
    /// Publish timestamp reported by the channel.
    pub published_at: DateTime<Utc>,
}

/// Failure modes of the channel feed the driver distinguishes.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("channel @{channel} has no public preview")]
    ChannelUnavailable { channel: String },
    #[error("preview page for @{channel} had no parseable message blocks")]
    MalformedPage { channel: String },
}

/// MessageSource defines the common interface for message-history providers.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Human-readable name of the source, used in logs.
    fn source_name(&self) -> &str;

    /// Fetch up to `limit` messages, newest first.
    async fn fetch_messages(&self, limit: usize) -> Result<Vec<ChannelMessage>>;
}
