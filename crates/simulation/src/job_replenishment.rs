//! Job availability as a single refill timestamp.
//!
//! Arriving commuters push the "next job available" tick forward by their
//! share of the replenishment window `W`; jobs come back linearly as the
//! clock catches up. One timestamp per structure replaces per-job timers.

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct JobClock {
    /// Tick at which the next unit of job capacity becomes available.
    pub available_by: i64,
}

impl Default for JobClock {
    /// Fully stale: every job is available.
    fn default() -> Self {
        Self {
            available_by: i64::MIN,
        }
    }
}

impl JobClock {
    /// New structures start with no banked capacity.
    pub fn starting_at(now: i64) -> Self {
        Self { available_by: now }
    }

    /// Consume `arrivals` jobs at `now`.
    ///
    /// Staleness is capped: the clock never starts further back than one
    /// window before `now`.
    pub fn record_arrival(&mut self, arrivals: u16, adjusted_jobs: u16, now: i64, window: i64) {
        let window = window.max(1);
        let delta = i64::from(arrivals) * window / i64::from(adjusted_jobs.max(1));
        let from_stale = (now - window).saturating_add(delta);
        let from_current = self.available_by.saturating_add(delta);
        self.available_by = from_stale.max(from_current);
    }

    fn is_stale(&self, now: i64, window: i64) -> bool {
        self.available_by <= now - window
    }

    /// Jobs free at `now`. Negative while more commuters arrived than the
    /// refill has caught up with.
    pub fn remaining_jobs(&self, adjusted_jobs: u16, now: i64, window: i64) -> i64 {
        let window = window.max(1);
        if self.is_stale(now, window) {
            return i64::from(adjusted_jobs);
        }
        (now - self.available_by) * i64::from(adjusted_jobs) / window
    }

    /// [`Self::remaining_jobs`] floored at zero, for display.
    pub fn remaining_jobs_capped(&self, adjusted_jobs: u16, now: i64, window: i64) -> i64 {
        self.remaining_jobs(adjusted_jobs, now, window).max(0)
    }

    /// Percentage of job slots currently filled. Can exceed 100.
    pub fn staffing_percentage(&self, adjusted_jobs: u16, now: i64, window: i64) -> i64 {
        if adjusted_jobs == 0 {
            return 100;
        }
        let jobs = i64::from(adjusted_jobs);
        (jobs - self.remaining_jobs(adjusted_jobs, now, window)) * 100 / jobs
    }

    pub fn jobs_available(&self, now: i64) -> bool {
        self.available_by <= now
    }
}
