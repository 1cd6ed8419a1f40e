//! Fixed-interval poll scheduling.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::PollOrchestrator;
use crate::error::{NotifierError, Result};

/// Drive `orchestrator` every `interval` until `shutdown` is cancelled.
///
/// The first poll runs after one interval, or immediately when
/// `poll_on_start` is set. Ticks missed while a poll is running are
/// skipped. A poll in flight when shutdown is requested runs to completion.
pub async fn run_scheduler(
    orchestrator: Arc<PollOrchestrator>,
    interval: Duration,
    poll_on_start: bool,
    shutdown: CancellationToken,
) -> Result<()> {
    if interval.is_zero() {
        return Err(NotifierError::config("poll interval must be greater than zero"));
    }

    let now = Instant::now();
    let start = if poll_on_start {
        now
    } else {
        now.checked_add(interval)
            .ok_or_else(|| NotifierError::config("poll interval is too large"))?
    };
    let mut ticker = interval_at(start, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        "Polling '{}' every {}s",
        orchestrator.bucket(),
        interval.as_secs()
    );

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                tracing::info!("Scheduler stopped");
                return Ok(());
            }
            _ = ticker.tick() => {
                // Failures are logged and recorded by the orchestrator.
                let _ = orchestrator.execute_poll().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::{KeyFilter, StaticLister};
    use crate::notify::{Notifier, NotifyOptions};
    use crate::store::MemorySnapshotStore;

    fn orchestrator() -> Arc<PollOrchestrator> {
        Arc::new(PollOrchestrator::new(
            "reports",
            KeyFilter::default(),
            Arc::new(StaticLister::default()),
            Arc::new(MemorySnapshotStore::new()),
            Arc::new(Notifier::new("reports", NotifyOptions::default()).unwrap()),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_polls_each_interval() {
        let orchestrator = orchestrator();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_scheduler(
            Arc::clone(&orchestrator),
            Duration::from_secs(60),
            false,
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(orchestrator.status().poll_count, 0);

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(orchestrator.status().poll_count, 2);

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_on_start_runs_immediately() {
        let orchestrator = orchestrator();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_scheduler(
            Arc::clone(&orchestrator),
            Duration::from_secs(300),
            true,
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(orchestrator.status().poll_count, 1);

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let result = run_scheduler(
            orchestrator(),
            Duration::ZERO,
            false,
            CancellationToken::new(),
        )
        .await;
        assert!(result.is_err());
    }
}
