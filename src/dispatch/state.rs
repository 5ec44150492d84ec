// src/dispatch/state.rs
// =============================================================================
// State shared by every worker for the duration of one run.
//
// - BlockingState: the consecutive-403 streak plus the latest backoff deadline
// - Progress: how many candidates have finished, out of how many
// - Tally: per-outcome counters that become the RunSummary
//
// All of it is touched concurrently. Counters are atomics; the deadline is a
// std Mutex that is only ever held for a load or a store, never across an
// .await.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use super::engine::Outcome;
use crate::probe::ForbiddenStreak;

#[derive(Debug, Default)]
pub struct BlockingState {
    streak: ForbiddenStreak,
    backoff_until: Mutex<Option<Instant>>,
}

impl BlockingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn streak(&self) -> &ForbiddenStreak {
        &self.streak
    }

    /// Records a backoff ending at `now + wait`.
    ///
    /// Returns the deadline of a backoff that was still running, if any. A
    /// deadline further out than the new one is kept. Only the worker that
    /// calls this sleeps; nobody else waits on the deadline.
    pub fn begin_backoff(&self, wait: Duration) -> Option<Instant> {
        let now = Instant::now();
        let requested = now + wait;
        let mut backoff_until = self.lock_deadline();

        let running = backoff_until.filter(|deadline| *deadline > now);
        *backoff_until = Some(match running {
            Some(current) if current > requested => current,
            _ => requested,
        });
        running
    }

    fn lock_deadline(&self) -> MutexGuard<'_, Option<Instant>> {
        // The guarded value is a plain Option<Instant>, so a poisoned lock
        // still holds a usable value
        self.backoff_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Completed candidates out of the total. Never goes backwards.
#[derive(Debug)]
pub struct Progress {
    completed: AtomicUsize,
    total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Marks one more candidate as finished and returns the new count
    pub fn tick(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn percent(completed: usize, total: usize) -> f64 {
        if total == 0 {
            return 100.0;
        }
        completed as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Default)]
pub struct Tally {
    hits: AtomicUsize,
    suppressed: AtomicUsize,
    transport_errors: AtomicUsize,
    blocked: AtomicUsize,
}

impl Tally {
    pub fn record(&self, outcome: &Outcome) {
        let counter = match outcome {
            Outcome::Success { .. } => &self.hits,
            Outcome::Suppressed { .. } => &self.suppressed,
            Outcome::TransportError { .. } => &self.transport_errors,
            Outcome::Blocked => &self.blocked,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summarize(&self, progress: &Progress) -> RunSummary {
        RunSummary {
            total: progress.total(),
            completed: progress.completed(),
            hits: self.hits.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
        }
    }
}

/// What happened over a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    /// Responses printed as results
    pub hits: usize,
    /// Responses hidden by the silent codes
    pub suppressed: usize,
    pub transport_errors: usize,
    /// Candidates dropped because the response looked like blocking
    pub blocked: usize,
}
