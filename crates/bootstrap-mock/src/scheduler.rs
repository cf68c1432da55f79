use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use proven_bootstrap::{RetryScheduler, ScheduleOutcome};
use tokio::sync::{Notify, oneshot};

/// A retry request seen by [`ManualScheduler`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScheduledRetry {
    /// Requested delay.
    pub delay: Duration,

    /// Description the retry was tagged with.
    pub description: String,
}

#[derive(Debug, Default)]
struct Pending {
    senders: VecDeque<oneshot::Sender<ScheduleOutcome>>,
    shutting_down: bool,
}

#[derive(Debug, Default)]
struct Inner {
    scheduled: Mutex<Vec<ScheduledRetry>>,
    pending: Mutex<Pending>,
    retry_scheduled: Notify,
}

/// Scheduler whose retries only run when the test fires them.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    inner: Arc<Inner>,
}

impl ManualScheduler {
    /// Creates a new instance of `ManualScheduler`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every retry requested so far, fired or not.
    #[must_use]
    pub fn scheduled(&self) -> Vec<ScheduledRetry> {
        self.inner.scheduled.lock().clone()
    }

    /// Number of retries waiting to be fired.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.pending.lock().senders.len()
    }

    /// Wait for at least `count` retries to have been requested.
    pub async fn wait_for_scheduled(&self, count: usize) {
        loop {
            let notified = self.inner.retry_scheduled.notified();
            if self.inner.scheduled.lock().len() >= count {
                return;
            }
            notified.await;
        }
    }

    /// Run the oldest pending retry. Returns `false` if none was pending.
    pub fn fire_next(&self) -> bool {
        let sender = self.inner.pending.lock().senders.pop_front();
        sender.is_some_and(|sender| sender.send(ScheduleOutcome::Elapsed).is_ok())
    }

    /// Decline all pending and future retries, as when the process shuts down.
    pub fn shutdown(&self) {
        let senders = {
            let mut pending = self.inner.pending.lock();
            pending.shutting_down = true;
            std::mem::take(&mut pending.senders)
        };

        for sender in senders {
            let _ = sender.send(ScheduleOutcome::ShuttingDown);
        }
    }
}

#[async_trait]
impl RetryScheduler for ManualScheduler {
    async fn schedule_after(&self, delay: Duration, description: String) -> ScheduleOutcome {
        self.inner
            .scheduled
            .lock()
            .push(ScheduledRetry { delay, description });

        let receiver = {
            let mut pending = self.inner.pending.lock();
            if pending.shutting_down {
                None
            } else {
                let (sender, receiver) = oneshot::channel();
                pending.senders.push_back(sender);
                Some(receiver)
            }
        };
        self.inner.retry_scheduled.notify_waiters();

        match receiver {
            Some(receiver) => receiver.await.unwrap_or(ScheduleOutcome::ShuttingDown),
            None => ScheduleOutcome::ShuttingDown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fire_next() {
        let scheduler = ManualScheduler::new();

        let pending = tokio::spawn({
            let scheduler = scheduler.clone();
            async move {
                scheduler
                    .schedule_after(Duration::from_secs(10), "retry".to_string())
                    .await
            }
        });

        scheduler.wait_for_scheduled(1).await;
        assert_eq!(scheduler.pending(), 1);
        assert!(scheduler.fire_next());
        assert!(!scheduler.fire_next());

        assert_eq!(pending.await.unwrap(), ScheduleOutcome::Elapsed);
        assert_eq!(
            scheduler.scheduled(),
            vec![ScheduledRetry {
                delay: Duration::from_secs(10),
                description: "retry".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_shutdown_declines() {
        let scheduler = ManualScheduler::new();
        scheduler.shutdown();

        let outcome = scheduler
            .schedule_after(Duration::from_secs(10), "retry".to_string())
            .await;

        assert_eq!(outcome, ScheduleOutcome::ShuttingDown);
        assert_eq!(scheduler.pending(), 0);
    }
}
