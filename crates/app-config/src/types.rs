// In crates/app-config/src/types.rs

use core_types::{Symbol, TimeframeSpec};
use serde::Deserialize;

/// The smallest number of extra bars fetched beyond the long EMA window.
pub const MIN_HISTORY_MARGIN: usize = 10;

/// The largest `limit` the Binance klines endpoint accepts.
pub const MAX_KLINE_LIMIT: usize = 1000;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the Binance market data API.
    pub binance: BinanceSettings,
    /// Settings for the Telegram notification channel.
    #[serde(default)]
    pub telegram: TelegramSettings,
    pub server: ServerSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BinanceSettings {
    /// The REST API base URL for Binance market data.
    pub rest_base_url: String,
    /// Upper bound for a single klines request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TelegramSettings {
    #[serde(default = "default_telegram_api")]
    pub api_base_url: String,
    /// The bot credential. Read from `TOKEN` or `APP_TELEGRAM__BOT_TOKEN`.
    pub bot_token: Option<String>,
    /// The recipient chat. Read from `CHAT_ID` or `APP_TELEGRAM__CHAT_ID`.
    pub chat_id: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_telegram_api(),
            bot_token: None,
            chat_id: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl TelegramSettings {
    /// Returns `(bot_token, chat_id)` when both are present and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = non_blank(self.bot_token.as_deref())?;
        let chat_id = non_blank(self.chat_id.as_deref())?;
        Some((token, chat_id))
    }

    /// The configured recipient, if any.
    pub fn recipient(&self) -> Option<&str> {
        non_blank(self.chat_id.as_deref())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SchedulerSettings {
    /// Seconds between interval-driven scans. The first scan runs at startup.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    /// Also scan at minute 0 of every hour.
    #[serde(default = "default_true")]
    pub hourly_scan: bool,
    /// Send a greeting through the notifier when the scanner starts.
    #[serde(default = "default_true")]
    pub announce_startup: bool,
    /// Upper bound on any single candle fetch or notification inside a scan.
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
            hourly_scan: true,
            announce_startup: true,
            io_timeout_secs: default_io_timeout_secs(),
        }
    }
}

// --- Structs for universe.toml Configuration ---

/// The complete scan universe: every instrument is scanned on every timeframe.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UniverseConfig {
    /// Extra bars fetched beyond the long window so the EMA can move off its seed.
    #[serde(default = "default_history_margin")]
    pub history_margin: usize,
    /// Scanned in this order (outer loop).
    pub instruments: Vec<Symbol>,
    /// Scanned in this order for each instrument (inner loop).
    pub timeframes: Vec<TimeframeSpec>,
}

/// Helper functions for serde defaults
fn default_request_timeout_secs() -> u64 { 10 }
fn default_telegram_api() -> String { "https://api.telegram.org".to_string() }
fn default_scan_interval_secs() -> u64 { 15 * 60 }
fn default_io_timeout_secs() -> u64 { 15 }
fn default_history_margin() -> usize { MIN_HISTORY_MARGIN }
fn default_true() -> bool { true }

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
