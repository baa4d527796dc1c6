// In crates/api-client/src/lib.rs

use app_config::types::BinanceSettings;
use async_trait::async_trait;
use core_types::{Kline, Symbol};
use rust_decimal::Decimal;
use std::time::Duration;

pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::*;

/// A source of historical candlestick data.
///
/// Implementations return bars oldest-first. Network errors, bad statuses and
/// malformed payloads are all reported as `Err`; callers treat any error as
/// "no data this cycle".
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// The name of the source (e.g., "BinanceRest").
    fn name(&self) -> &'static str;

    /// Fetches up to `limit` of the most recent bars for `symbol` at `interval`.
    async fn fetch_candles(&self, symbol: &Symbol, interval: &str, limit: u16) -> Result<Vec<Kline>>;
}

impl ApiClient {
    /// Constructs a new ApiClient from BinanceSettings.
    pub fn new(settings: &BinanceSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;
        let base_url = settings.rest_base_url.trim_end_matches('/').to_string();
        Ok(ApiClient {
            http_client,
            base_url,
        })
    }

    /// Fetches historical kline (candlestick) data.
    ///
    /// This corresponds to the `GET /api/v3/klines` endpoint.
    ///
    /// # Arguments
    ///
    /// * `symbol`: The symbol to fetch klines for.
    /// * `interval`: The kline interval (e.g., "15m", "1h").
    /// * `limit`: Optional number of klines to return (max 1000, default 500).
    pub async fn get_historical_klines(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: Option<u16>,
    ) -> Result<Vec<Kline>> {
        let mut params = format!("symbol={}&interval={}", symbol.0, interval);

        if let Some(l) = limit {
            params.push_str(&format!("&limit={}", l));
        }

        let url = format!("{}/api/v3/klines?{}", self.base_url, params);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(Error::RequestFailed)?;

        let klines = parse_klines(status, &body)?;
        tracing::debug!(symbol = %symbol, interval, count = klines.len(), "Fetched klines.");
        Ok(klines)
    }
}

#[async_trait]
impl CandleSource for ApiClient {
    fn name(&self) -> &'static str {
        "BinanceRest"
    }

    async fn fetch_candles(&self, symbol: &Symbol, interval: &str, limit: u16) -> Result<Vec<Kline>> {
        self.get_historical_klines(symbol, interval, Some(limit)).await
    }
}

/// Turns a klines response (status + body) into our clean, internal `Kline` type.
pub fn parse_klines(status: u16, body: &str) -> Result<Vec<Kline>> {
    // Binance returns an error object on failure, so we check for that first.
    if let Ok(err) = serde_json::from_str::<BinanceErrorBody>(body) {
        return Err(Error::ApiError {
            code: err.code,
            msg: err.msg,
        });
    }

    if !(200..300).contains(&status) {
        return Err(Error::HttpStatus {
            status,
            body: body.chars().take(200).collect(),
        });
    }

    let raw_klines: Vec<RawKline> = serde_json::from_str(body).map_err(Error::DeserializationFailed)?;

    raw_klines
        .into_iter()
        .map(|raw| {
            Ok(Kline {
                open_time: raw.0,
                open: parse_decimal("open", &raw.1)?,
                high: parse_decimal("high", &raw.2)?,
                low: parse_decimal("low", &raw.3)?,
                close: parse_decimal("close", &raw.4)?,
                volume: parse_decimal("volume", &raw.5)?,
                close_time: raw.6,
            })
        })
        .collect()
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal> {
    value.parse().map_err(|_| Error::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

// Free function to allow api_client::new usage
pub fn new(settings: &BinanceSettings) -> Result<ApiClient> {
    ApiClient::new(settings)
}
