// In crates/engine/src/scanner.rs

use crate::state::StateStore;
use anyhow::{Context, anyhow, bail};
use api_client::CandleSource;
use app_config::UniverseConfig;
use core_types::{Crossover, PairKey, Symbol, TimeframeSpec};
use notifier::Notifier;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counters for a single pass over the scan universe.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub pairs_scanned: usize,
    pub notifications_sent: usize,
    /// Pairs whose data could not be fetched or was too short.
    pub inconclusive: usize,
    pub delivery_failures: usize,
}

/// Runs one detection pass over every (instrument, timeframe) pair.
///
/// The scanner owns a handle to the `StateStore`; the scheduler and the web
/// server may hold other handles to the same store.
pub struct Scanner {
    universe: UniverseConfig,
    candles: Arc<dyn CandleSource>,
    notifier: Arc<dyn Notifier>,
    store: StateStore,
    /// Upper bound on every individual fetch or send.
    io_timeout: Duration,
}

impl Scanner {
    pub fn new(
        universe: UniverseConfig,
        candles: Arc<dyn CandleSource>,
        notifier: Arc<dyn Notifier>,
        store: StateStore,
        io_timeout: Duration,
    ) -> Self {
        Self {
            universe,
            candles,
            notifier,
            store,
            io_timeout,
        }
    }

    /// Scans the whole universe once, instruments outer and timeframes inner.
    ///
    /// Never fails: every per-pair problem is logged and isolated to that pair.
    pub async fn run_scan_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::default();
        tracing::info!(pairs = self.universe.pair_count(), "Starting scan cycle.");

        for symbol in &self.universe.instruments {
            for timeframe in &self.universe.timeframes {
                report.pairs_scanned += 1;
                let key = PairKey::new(symbol, timeframe);

                let detected = match self.evaluate_pair(symbol, timeframe).await {
                    Ok(detected) => detected,
                    Err(e) => {
                        tracing::warn!(pair = %key, error = %format!("{e:#}"), "Pair inconclusive this cycle. State reset.");
                        self.store.clear(&key);
                        report.inconclusive += 1;
                        continue;
                    }
                };

                let Some(direction) = detected else {
                    self.store.clear(&key);
                    continue;
                };

                if !self.store.transition(&key, direction) {
                    tracing::debug!(pair = %key, %direction, "Crossover already notified.");
                    continue;
                }

                tracing::info!(pair = %key, %direction, "New crossover detected.");
                let text = format_alert(symbol, timeframe, direction);
                match self.notify(&text).await {
                    Ok(()) => report.notifications_sent += 1,
                    Err(e) => {
                        // The crossover stays recorded; delivery is at-most-once.
                        tracing::error!(pair = %key, error = %format!("{e:#}"), "Failed to deliver crossover notification.");
                        report.delivery_failures += 1;
                    }
                }
            }
        }

        tracing::info!(?report, elapsed = ?started.elapsed(), "Scan cycle complete.");
        report
    }

    /// Sends the start-up greeting. Failures are logged only.
    pub async fn announce_startup(&self) {
        let text = startup_message(&self.universe);
        if let Err(e) = self.notify(&text).await {
            tracing::error!(error = %format!("{e:#}"), "Failed to deliver start-up message.");
        }
    }

    async fn evaluate_pair(
        &self,
        symbol: &Symbol,
        timeframe: &TimeframeSpec,
    ) -> anyhow::Result<Option<Crossover>> {
        let limit = self.universe.fetch_limit(timeframe.long_window);
        let limit = u16::try_from(limit).context("kline limit does not fit in a request")?;

        let klines = tokio::time::timeout(
            self.io_timeout,
            self.candles.fetch_candles(symbol, &timeframe.interval, limit),
        )
        .await
        .map_err(|_| anyhow!("candle fetch timed out after {:?}", self.io_timeout))?
        .with_context(|| format!("fetching candles from {}", self.candles.name()))?;

        let required = timeframe.required_bars();
        if klines.len() < required {
            bail!("insufficient history: got {} bars, need {}", klines.len(), required);
        }

        let closes = strategies::closing_prices(&klines)?;
        let detected =
            strategies::detect_from_closes(&closes, timeframe.short_window, timeframe.long_window)?;
        Ok(detected)
    }

    async fn notify(&self, text: &str) -> anyhow::Result<()> {
        tokio::time::timeout(self.io_timeout, self.notifier.send_message(text))
            .await
            .map_err(|_| anyhow!("notification timed out after {:?}", self.io_timeout))?
            .with_context(|| format!("sending through {}", self.notifier.name()))?;
        Ok(())
    }
}

/// The crossover notification text.
pub fn format_alert(symbol: &Symbol, timeframe: &TimeframeSpec, direction: Crossover) -> String {
    format!(
        "EMA {}/{} {}\n{}\nTimeframe: {}",
        timeframe.short_window,
        timeframe.long_window,
        symbol,
        direction.label(),
        timeframe.name.to_uppercase()
    )
}

/// The greeting sent when the scanner starts, e.g. "EMA 20/50 on 15M, 1H".
pub fn startup_message(universe: &UniverseConfig) -> String {
    let windows = |tf: &TimeframeSpec| (tf.short_window, tf.long_window);
    let names: Vec<String> = universe.timeframes.iter().map(|tf| tf.name.to_uppercase()).collect();

    let detail = match universe.timeframes.first() {
        Some(first) if universe.timeframes.iter().all(|tf| windows(tf) == windows(first)) => {
            format!("EMA {}/{} on {}", first.short_window, first.long_window, names.join(", "))
        }
        _ => universe
            .timeframes
            .iter()
            .zip(&names)
            .map(|(tf, name)| format!("EMA {}/{} on {}", tf.short_window, tf.long_window, name))
            .collect::<Vec<_>>()
            .join(", "),
    };

    format!("EMA crossover scanner started\n{detail}")
}
