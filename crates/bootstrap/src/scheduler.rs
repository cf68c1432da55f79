//! Delayed retries which are skipped once the process is shutting down.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Result of waiting for a scheduled retry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScheduleOutcome {
    /// The delay elapsed and the retry should run.
    Elapsed,

    /// The process is shutting down and the retry will not run.
    ShuttingDown,
}

/// Runs retries after a delay, unless shutting down.
#[async_trait]
pub trait RetryScheduler
where
    Self: Send + Sync + 'static,
{
    /// Wait for `delay` before the retry described by `description` runs.
    async fn schedule_after(&self, delay: Duration, description: String) -> ScheduleOutcome;
}

/// Tokio timer backed scheduler with a shutdown token.
#[derive(Clone, Debug, Default)]
pub struct TokioRetryScheduler {
    shutdown_token: CancellationToken,
}

impl TokioRetryScheduler {
    /// Creates a new instance of `TokioRetryScheduler`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scheduler which declines retries once `shutdown_token` is cancelled.
    #[must_use]
    pub const fn with_shutdown_token(shutdown_token: CancellationToken) -> Self {
        Self { shutdown_token }
    }

    /// Decline all pending and future retries.
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }
}

#[async_trait]
impl RetryScheduler for TokioRetryScheduler {
    async fn schedule_after(&self, delay: Duration, description: String) -> ScheduleOutcome {
        if self.shutdown_token.is_cancelled() {
            debug!("shutting down, not scheduling [{description}]");
            return ScheduleOutcome::ShuttingDown;
        }

        trace!("scheduling [{description}] in {delay:?}");

        tokio::select! {
            () = tokio::time::sleep(delay) => ScheduleOutcome::Elapsed,
            () = self.shutdown_token.cancelled() => {
                debug!("shutting down, dropping [{description}]");
                ScheduleOutcome::ShuttingDown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_elapses_after_delay() {
        let scheduler = TokioRetryScheduler::new();
        let started = tokio::time::Instant::now();

        let outcome = scheduler
            .schedule_after(Duration::from_secs(10), "retry".to_string())
            .await;

        assert_eq!(outcome, ScheduleOutcome::Elapsed);
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_declines_after_shutdown() {
        let scheduler = TokioRetryScheduler::new();
        scheduler.shutdown();

        let outcome = scheduler
            .schedule_after(Duration::from_secs(3600), "retry".to_string())
            .await;

        assert_eq!(outcome, ScheduleOutcome::ShuttingDown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_pending_delay() {
        let token = CancellationToken::new();
        let scheduler = Arc::new(TokioRetryScheduler::with_shutdown_token(token.clone()));

        let pending = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move {
                scheduler
                    .schedule_after(Duration::from_secs(3600), "retry".to_string())
                    .await
            }
        });

        tokio::task::yield_now().await;
        token.cancel();

        assert_eq!(pending.await.unwrap(), ScheduleOutcome::ShuttingDown);
    }
}
