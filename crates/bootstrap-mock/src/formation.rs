use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use proven_bootstrap::{FormationAdaptor, FormationConfiguration, FormationResponse};
use tokio::sync::Notify;

use crate::Error;

#[derive(Debug, Default)]
struct Inner {
    submissions: Mutex<Vec<FormationConfiguration>>,
    scripted: Mutex<VecDeque<Result<FormationResponse, Error>>>,
    submitted: Notify,
}

/// Formation command which records submissions and answers from a script.
///
/// Once the script is exhausted every submission succeeds.
#[derive(Clone, Debug, Default)]
pub struct MockFormation {
    inner: Arc<Inner>,
}

impl MockFormation {
    /// Formation which always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Formation which answers the first submissions with `outcomes`, in order.
    #[must_use]
    pub fn with_outcomes(outcomes: Vec<Result<FormationResponse, Error>>) -> Self {
        let formation = Self::new();
        formation.inner.scripted.lock().extend(outcomes);
        formation
    }

    /// Formation which fails the first `count` submissions with [`Error::Rejected`].
    #[must_use]
    pub fn failing_times(count: usize, reason: &str) -> Self {
        Self::with_outcomes(
            (0..count)
                .map(|_| Err(Error::Rejected(reason.to_string())))
                .collect(),
        )
    }

    /// All configurations submitted so far, in order.
    #[must_use]
    pub fn submissions(&self) -> Vec<FormationConfiguration> {
        self.inner.submissions.lock().clone()
    }

    /// Wait for at least `count` submissions.
    pub async fn wait_for_submissions(&self, count: usize) {
        loop {
            let notified = self.inner.submitted.notified();
            if self.inner.submissions.lock().len() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl FormationAdaptor for MockFormation {
    type Error = Error;

    async fn submit(
        &self,
        configuration: &FormationConfiguration,
    ) -> Result<FormationResponse, Self::Error> {
        let already_formed = {
            let mut submissions = self.inner.submissions.lock();
            submissions.push(configuration.clone());
            submissions.len() > 1
        };
        self.inner.submitted.notify_waiters();

        self.inner
            .scripted
            .lock()
            .pop_front()
            .unwrap_or(Ok(FormationResponse { already_formed }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proven_bootstrap::NodeDescription;

    #[tokio::test]
    async fn test_scripted_then_success() {
        let formation = MockFormation::failing_times(1, "quorum changed");
        let configuration = FormationConfiguration::new(vec![NodeDescription::named("node-a")]);

        assert_eq!(
            formation.submit(&configuration).await,
            Err(Error::Rejected("quorum changed".to_string()))
        );
        assert_eq!(
            formation.submit(&configuration).await,
            Ok(FormationResponse {
                already_formed: true
            })
        );
        assert_eq!(formation.submissions().len(), 2);
    }
}
