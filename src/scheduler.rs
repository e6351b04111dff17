//! # Periodic Scheduler
//!
//! Runs one upload cycle per interval until shutdown.
//!
//! Cycles run inline, so at most one is ever in flight. Ticks that come
//! due while a cycle is still running are skipped: they collapse into a
//! single tick once the cycle ends instead of queueing up as a burst.

use std::future::Future;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

/// Fixed-interval cycle runner
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    period: Duration,
}

impl Scheduler {
    /// Create a scheduler ticking every `period`
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn new(period: Duration) -> Self {
        assert!(!period.is_zero(), "scheduler period must be non-zero");
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run `job` on every tick until `shutdown` resolves
    ///
    /// The first tick fires immediately. `shutdown` is only observed
    /// between cycles; a cycle in progress always runs to completion.
    ///
    /// # Returns
    ///
    /// * `u64` - Number of cycles run
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use meso_cwop::scheduler::Scheduler;
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let scheduler = Scheduler::new(Duration::from_secs(300));
    ///     scheduler
    ///         .run(|| async { println!("tick") }, async {
    ///             let _ = tokio::signal::ctrl_c().await;
    ///         })
    ///         .await;
    /// }
    /// ```
    pub async fn run<F, Fut, S>(self, mut job: F, shutdown: S) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
        S: Future<Output = ()>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut cycles: u64 = 0;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested after {} cycles", cycles);
                    break;
                }

                _ = ticker.tick() => {
                    cycles += 1;
                    debug!("Starting cycle {}", cycles);
                    job().await;
                }
            }
        }

        cycles
    }
}
