// In crates/app-config/src/lib.rs

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use std::collections::HashSet;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{
    AppSettings, BinanceSettings, SchedulerSettings, ServerSettings, Settings, TelegramSettings,
    UniverseConfig,
};

use types::{MAX_KLINE_LIMIT, MIN_HISTORY_MARGIN};

/// Plain environment variables honoured on top of the `APP_` prefixed ones,
/// so the bot can be deployed with just `TOKEN`, `CHAT_ID` and `PORT`.
const PLAIN_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("TOKEN", "telegram.bot_token"),
    ("CHAT_ID", "telegram.chat_id"),
    ("PORT", "server.port"),
];

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables (`APP_TELEGRAM__CHAT_ID=...`).
/// 4. Applies the plain `TOKEN`, `CHAT_ID` and `PORT` variables last.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let builder = Config::builder()
        .add_source(File::with_name("config/base"))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    let builder = with_plain_env_overrides(builder, |name| std::env::var(name).ok())?;

    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = builder.build()?.try_deserialize()?;

    Ok(settings)
}

fn with_plain_env_overrides<F>(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> Result<ConfigBuilder<DefaultState>>
where
    F: Fn(&str) -> Option<String>,
{
    for &(var, key) in PLAIN_ENV_OVERRIDES {
        builder = builder.set_override_option(key, lookup(var))?;
    }
    Ok(builder)
}

/// Loads and validates the scan universe from `universe.toml`.
pub fn load_universe() -> Result<UniverseConfig> {
    let content = std::fs::read_to_string("config/universe.toml")?;
    parse_universe(&content)
}

/// Parses and validates a scan universe from TOML text.
pub fn parse_universe(content: &str) -> Result<UniverseConfig> {
    let universe: UniverseConfig = toml::from_str(content)?;
    universe.validate()?;
    Ok(universe)
}

impl UniverseConfig {
    /// Checks the invariants the scanner relies on.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidUniverse(msg));

        if self.instruments.is_empty() {
            return invalid("at least one instrument is required".into());
        }
        if self.timeframes.is_empty() {
            return invalid("at least one timeframe is required".into());
        }
        if self.history_margin < MIN_HISTORY_MARGIN {
            return invalid(format!(
                "history_margin must be at least {MIN_HISTORY_MARGIN}, got {}",
                self.history_margin
            ));
        }

        let mut seen_symbols = HashSet::new();
        for symbol in &self.instruments {
            if symbol.0.trim().is_empty() {
                return invalid("instrument identifiers must not be blank".into());
            }
            if !seen_symbols.insert(symbol) {
                return invalid(format!("instrument {symbol} is listed twice"));
            }
        }

        let mut seen_names = HashSet::new();
        for tf in &self.timeframes {
            if !seen_names.insert(tf.name.as_str()) {
                return invalid(format!("timeframe {} is listed twice", tf.name));
            }
            if tf.short_window == 0 {
                return invalid(format!("timeframe {}: short_window must be positive", tf.name));
            }
            if tf.short_window >= tf.long_window {
                return invalid(format!(
                    "timeframe {}: short_window ({}) must be below long_window ({})",
                    tf.name, tf.short_window, tf.long_window
                ));
            }
            if self.fetch_limit(tf.long_window) > MAX_KLINE_LIMIT {
                return invalid(format!(
                    "timeframe {}: long_window + history_margin exceeds {MAX_KLINE_LIMIT}",
                    tf.name
                ));
            }
        }

        Ok(())
    }

    /// Number of bars to request for a timeframe with the given long window.
    pub fn fetch_limit(&self, long_window: usize) -> usize {
        long_window + self.history_margin
    }

    /// The total number of (instrument, timeframe) pairs in one scan cycle.
    pub fn pair_count(&self) -> usize {
        self.instruments.len() * self.timeframes.len()
    }
}
