// In crates/engine/src/lib.rs

pub mod scanner;
pub mod state;

pub use scanner::{CycleReport, Scanner, format_alert, startup_message};
pub use state::StateStore;

use anyhow::Result;
use app_config::SchedulerSettings;
use chrono::{DateTime, Timelike, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Wall-clock source for the top-of-hour trigger.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The scheduler that drives the `Scanner` for the lifetime of the process.
pub struct Engine {
    scanner: Arc<Scanner>,
    schedule: SchedulerSettings,
    clock: Clock,
}

impl Engine {
    pub fn new(scanner: Arc<Scanner>, schedule: SchedulerSettings) -> Self {
        Self {
            scanner,
            schedule,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the system clock used to find the next top of the hour.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The main run method for the scheduler.
    ///
    /// Fires a scan immediately, then every `scan_interval_secs`, plus at the top
    /// of every hour when `hourly_scan` is set. Each scan runs in its own task, so
    /// a slow cycle never delays the next trigger.
    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            interval_secs = self.schedule.scan_interval_secs,
            hourly = self.schedule.hourly_scan,
            "Starting crossover scan scheduler..."
        );

        if self.schedule.announce_startup {
            self.scanner.announce_startup().await;
        }

        let period = Duration::from_secs(self.schedule.scan_interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.spawn_cycle("interval"),
                _ = tokio::time::sleep(until_next_hour((self.clock)())), if self.schedule.hourly_scan => {
                    self.spawn_cycle("hourly")
                }
            }
        }
    }

    fn spawn_cycle(&self, trigger: &'static str) {
        tracing::info!(trigger, "Scan cycle triggered.");
        let scanner = Arc::clone(&self.scanner);
        tokio::spawn(async move {
            scanner.run_scan_cycle().await;
        });
    }
}

/// Time left until minute 0 of the next hour.
pub fn until_next_hour(now: DateTime<Utc>) -> Duration {
    let into_hour = u64::from(now.minute()) * 60 + u64::from(now.second());
    // Leap seconds report nanoseconds above one billion.
    let nanos = u64::from(now.nanosecond() % 1_000_000_000);
    Duration::from_secs(3600 - into_hour).saturating_sub(Duration::from_nanos(nanos))
}
