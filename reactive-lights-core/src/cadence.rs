use std::time::{Duration, Instant};

use crate::logging::{debug, warn};

/// Counts control loop iterations and reports the rate about once a second.
///
/// Also complains when a single iteration took longer than the loop's target period.
pub struct CadenceTracker {
    period: Duration,
    last_report: Instant,
    count: u64,
    overruns: u64,
}

impl CadenceTracker {
    pub fn new(period: Duration) -> Self {
        Self::starting_at(period, Instant::now())
    }

    pub fn starting_at(period: Duration, now: Instant) -> Self {
        Self {
            period,
            last_report: now,
            count: 0,
            overruns: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Record one iteration that started at `started` and finished at `now`.
    ///
    /// Returns the iterations per second when a report was due.
    pub fn tick(&mut self, started: Instant, now: Instant) -> Option<u64> {
        self.count += 1;

        let took = now.saturating_duration_since(started);

        if took > self.period {
            self.overruns += 1;

            warn!(
                "control loop iteration took {:?}. target is {:?}",
                took, self.period
            );
        }

        let elapsed = now.saturating_duration_since(self.last_report);

        if elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.count * 1_000u64 / (elapsed.as_millis() as u64).max(1);

        self.count = 0;
        self.last_report = now;

        debug!("control loop: {} Hz", per_second);

        Some(per_second)
    }

    /// how long to sleep so the next iteration starts one period after `started`
    pub fn remaining(&self, started: Instant, now: Instant) -> Duration {
        self.period
            .saturating_sub(now.saturating_duration_since(started))
    }
}
