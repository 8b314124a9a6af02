use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

const DEFAULT_CHANNEL: &str = "news6551";
const DEFAULT_MESSAGE_LIMIT: usize = 2000;

/// Configuration for one scrape run. None of this reaches the extraction
/// pipeline; it only steers the driver and the output writers.
#[derive(Debug, Clone)]
pub struct Config {
    /// Channel username, without the leading `@`.
    pub channel: String,
    /// Maximum number of messages to pull from the channel history.
    pub message_limit: usize,
    /// Path of the JSON output artifact.
    pub json_out: PathBuf,
    /// Path of the embeddable JS output artifact.
    pub js_out: PathBuf,
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,
}

#[derive(Parser, Debug)]
#[command(name = "cex-listing-scraper")]
#[command(about = "Extract CEX listing records from a public Telegram channel")]
pub struct CliArgs {
    /// Channel username to scrape (with or without the leading @)
    #[arg(short, long)]
    pub channel: Option<String>,

    /// Maximum number of messages to fetch from the channel history
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Path for the JSON output artifact
    #[arg(long, default_value = "cex_listings.json")]
    pub json_out: PathBuf,

    /// Path for the embeddable JS output artifact
    #[arg(long, default_value = "data.js")]
    pub js_out: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Path to dotenv file for configuration
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

impl Config {
    /// Create a new configuration from command line arguments and environment
    /// variables. CLI flags win over the environment, which wins over the
    /// built-in defaults.
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    fn from_args(args: CliArgs) -> Result<Self> {
        // Load environment variables from .env file if specified
        if let Some(env_file) = &args.env_file {
            dotenv::from_path(env_file)?;
        } else {
            // Try to load from default .env file, but don't fail if not found
            let _ = dotenv::dotenv();
        }

        let channel = args
            .channel
            .or_else(|| env::var("CHANNEL_USERNAME").ok())
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string())
            .trim_start_matches('@')
            .to_string();

        let message_limit = args
            .limit
            .or_else(|| env::var("MESSAGE_LIMIT").ok().and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_MESSAGE_LIMIT);

        Ok(Self {
            channel,
            message_limit,
            json_out: args.json_out,
            js_out: args.js_out,
            log_level: args.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs {
            channel: Some("@somechannel".to_string()),
            limit: Some(50),
            json_out: PathBuf::from("out.json"),
            js_out: PathBuf::from("out.js"),
            log_level: "debug".to_string(),
            env_file: None,
        }
    }

    #[test]
    fn explicit_flags_win_and_at_prefix_is_stripped() {
        let config = Config::from_args(args()).unwrap();
        assert_eq!(config.channel, "somechannel");
        assert_eq!(config.message_limit, 50);
        assert_eq!(config.log_level, "debug");
    }
}
