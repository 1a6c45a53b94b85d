//! Request-rate governor shared by all lookups of one fetch-and-merge run.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Interval, MissedTickBehavior};

/// Admits outbound calls at a bounded rate.
///
/// Every concurrent lookup awaits [`RateGovernor::admit`] once before issuing
/// its request; each call consumes exactly one admission token.
#[async_trait]
pub trait RateGovernor: Send + Sync {
    async fn admit(&self);
}

/// Emits one admission token per fixed period.
///
/// The first token is available immediately, so admitting `n` calls takes at
/// least `(n - 1) * period`. A zero period disables throttling.
pub struct IntervalGovernor {
    period: Duration,
    ticker: Option<Mutex<Interval>>,
}

impl IntervalGovernor {
    /// Create a governor. Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let ticker = if period.is_zero() {
            None
        } else {
            let mut interval = tokio::time::interval(period);
            // Never hand out a burst of catch-up tokens after an idle stretch.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Some(Mutex::new(interval))
        };
        Self { period, ticker }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait]
impl RateGovernor for IntervalGovernor {
    async fn admit(&self) {
        if let Some(ticker) = &self.ticker {
            ticker.lock().await.tick().await;
        }
    }
}
