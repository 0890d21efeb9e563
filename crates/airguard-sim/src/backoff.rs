//! Retry schedule for a failing weather feed.
//!
//! Each consecutive failure doubles the wait (with up to 20% random jitter)
//! until `max`; a success clears the schedule. Deadlines are on the tokio
//! clock so they line up with the runner's timers.

use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

const JITTER_RATIO: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    next_delay: Duration,
    retry_at: Option<Instant>,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        Self {
            base,
            max: max.max(base),
            next_delay: base,
            retry_at: None,
        }
    }

    /// Whether a retry is scheduled after a failure.
    pub fn is_pending(&self) -> bool {
        self.retry_at.is_some()
    }

    /// No retry is scheduled, or its deadline has passed.
    pub fn is_due(&self) -> bool {
        self.retry_at.map_or(true, |at| Instant::now() >= at)
    }

    /// Time until the scheduled retry; zero when due.
    pub fn remaining(&self) -> Duration {
        self.retry_at
            .map(|at| at.saturating_duration_since(Instant::now()))
            .unwrap_or_default()
    }

    pub fn succeed(&mut self) {
        self.next_delay = self.base;
        self.retry_at = None;
    }

    /// Schedule the next retry and return its delay.
    pub fn fail(&mut self) -> Duration {
        let delay = with_jitter(self.next_delay, JITTER_RATIO, &mut rand::rng());
        self.retry_at = Some(Instant::now() + delay);
        self.next_delay = self.next_delay.saturating_mul(2).min(self.max);
        delay
    }
}

fn with_jitter<R: Rng>(delay: Duration, ratio: f64, rng: &mut R) -> Duration {
    let jitter_max_ms = (delay.as_millis() as f64 * ratio.clamp(0.0, 1.0)) as u64;
    if jitter_max_ms == 0 {
        return delay;
    }
    delay + Duration::from_millis(rng.random_range(0..=jitter_max_ms))
}
