//! Poll statistics shared with the status endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

/// Whether a baseline snapshot is known to exist.
///
/// A fresh orchestrator is `Bootstrapping` until
/// [`PollOrchestrator::detect_baseline`](super::PollOrchestrator::detect_baseline)
/// finds a stored snapshot or a poll succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollPhase {
    /// No poll has observed or created a snapshot yet
    Bootstrapping,
    /// A baseline exists; polls diff against it
    Steady,
}

/// Coarse result of a successful poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Bootstrapped,
    Unchanged,
    Changed,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Bootstrapped => "bootstrapped",
            Self::Unchanged => "unchanged",
            Self::Changed => "changed",
        })
    }
}

/// Snapshot of the orchestrator's running statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollStatus {
    pub phase: PollPhase,
    pub started_at: DateTime<Utc>,
    /// Completed polls, successful or not
    pub poll_count: u64,
    pub failed_polls: u64,
    /// Changes detected across all polls
    pub total_changes: u64,
    pub last_poll: Option<DateTime<Utc>>,
    pub last_outcome: Option<OutcomeKind>,
    /// Error of the most recent poll, cleared by the next success
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub(crate) struct PollState {
    inner: Mutex<PollStatus>,
}

impl PollState {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(PollStatus {
                phase: PollPhase::Bootstrapping,
                started_at: Utc::now(),
                poll_count: 0,
                failed_polls: 0,
                total_changes: 0,
                last_poll: None,
                last_outcome: None,
                last_error: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PollStatus> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Note that a baseline exists without counting a poll.
    pub(crate) fn mark_steady(&self) {
        self.lock().phase = PollPhase::Steady;
    }

    pub(crate) fn record_success(&self, kind: OutcomeKind, changes: usize) {
        let mut status = self.lock();
        status.phase = PollPhase::Steady;
        status.poll_count += 1;
        status.total_changes += changes as u64;
        status.last_poll = Some(Utc::now());
        status.last_outcome = Some(kind);
        status.last_error = None;
    }

    pub(crate) fn record_failure(&self, error: &str) {
        let mut status = self.lock();
        status.poll_count += 1;
        status.failed_polls += 1;
        status.last_poll = Some(Utc::now());
        status.last_error = Some(error.to_string());
    }

    pub(crate) fn snapshot(&self) -> PollStatus {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_then_success_clears_error() {
        let state = PollState::new();
        assert_eq!(state.snapshot().phase, PollPhase::Bootstrapping);

        state.record_failure("bucket unreachable");
        let status = state.snapshot();
        assert_eq!(status.failed_polls, 1);
        assert_eq!(status.phase, PollPhase::Bootstrapping);
        assert_eq!(status.last_error.as_deref(), Some("bucket unreachable"));

        state.record_success(OutcomeKind::Changed, 3);
        let status = state.snapshot();
        assert_eq!(status.poll_count, 2);
        assert_eq!(status.total_changes, 3);
        assert_eq!(status.phase, PollPhase::Steady);
        assert_eq!(status.last_outcome, Some(OutcomeKind::Changed));
        assert!(status.last_error.is_none());
    }
}
