//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Missing or unparsable values fall back
//! to defaults; only `LISTEN_ADDR` is strict.

use std::net::SocketAddr;
use std::str::FromStr;

use crate::domain::AuctionRules;
use crate::error::GatewayError;

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(GatewayError::Configuration(format!(
                "unknown log format: {other}"
            ))),
        }
    }
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Per-request timeout for REST routes, in seconds.
    pub request_timeout_secs: u64,

    /// Log output format.
    pub log_format: LogFormat,

    /// Delivery queue capacity for auction and chat participants.
    pub delivery_queue_capacity: usize,

    /// Delivery queue capacity for notes clients.
    pub notes_queue_capacity: usize,

    /// Chat messages retained by the room.
    pub chat_history_limit: usize,

    /// Recent chat messages returned on join.
    pub chat_recent_on_join: usize,

    /// Whether the auction house opens its first round on startup.
    pub auction_autostart: bool,

    /// Round timing and bid rules.
    pub auction: AuctionRules,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            request_timeout_secs: 30,
            log_format: LogFormat::Text,
            delivery_queue_capacity: 50,
            notes_queue_capacity: 100,
            chat_history_limit: 100,
            chat_recent_on_join: 20,
            auction_autostart: true,
            auction: AuctionRules::default(),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if `LISTEN_ADDR` is set but
    /// cannot be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, GatewayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let env = Lookup(lookup);

        let listen_addr = match env.get("LISTEN_ADDR") {
            Some(raw) => raw.parse().map_err(|e| {
                GatewayError::Configuration(format!("invalid LISTEN_ADDR {raw:?}: {e}"))
            })?,
            None => defaults.listen_addr,
        };

        let rules = defaults.auction;
        let auction = AuctionRules {
            round_duration_secs: env.parse("AUCTION_ROUND_SECS", rules.round_duration_secs),
            bid_increment: env.parse("AUCTION_BID_INCREMENT", rules.bid_increment),
            extension_threshold_secs: env.parse(
                "AUCTION_EXTENSION_THRESHOLD_SECS",
                rules.extension_threshold_secs,
            ),
            extension_secs: env.parse("AUCTION_EXTENSION_SECS", rules.extension_secs),
            inter_round_delay_secs: env.parse(
                "AUCTION_INTER_ROUND_DELAY_SECS",
                rules.inter_round_delay_secs,
            ),
            first_round_delay_secs: env.parse(
                "AUCTION_FIRST_ROUND_DELAY_SECS",
                rules.first_round_delay_secs,
            ),
            history_limit: env.parse("AUCTION_HISTORY_LIMIT", rules.history_limit),
            ..rules
        };

        Ok(Self {
            listen_addr,
            request_timeout_secs: env.parse("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            log_format: env.parse("LOG_FORMAT", defaults.log_format),
            delivery_queue_capacity: env
                .parse("DELIVERY_QUEUE_CAPACITY", defaults.delivery_queue_capacity),
            notes_queue_capacity: env.parse("NOTES_QUEUE_CAPACITY", defaults.notes_queue_capacity),
            chat_history_limit: env.parse("CHAT_HISTORY_LIMIT", defaults.chat_history_limit),
            chat_recent_on_join: env.parse("CHAT_RECENT_ON_JOIN", defaults.chat_recent_on_join),
            auction_autostart: env.parse_bool("AUCTION_AUTOSTART", defaults.auction_autostart),
            auction,
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parses `key` as `T`, returning `default` on missing or invalid values.
    fn parse<T: FromStr>(&self, key: &str, default: T) -> T {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Accepts `true`/`1`/`yes` and `false`/`0`/`no` (case-insensitive).
    fn parse_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("true" | "1" | "yes") => true,
            Some("false" | "0" | "no") => false,
            _ => default,
        }
    }
}
