use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use proven_bootstrap::{DiscoveryAdaptor, DiscoveryQuery, Peer};
use tokio::sync::Notify;

use crate::Error;

#[derive(Debug, Default)]
struct Inner {
    queries: Mutex<Vec<DiscoveryQuery>>,
    outcome: Mutex<Option<Result<Vec<Peer>, Error>>>,
    query_received: Notify,
    outcome_ready: Notify,
}

/// Discovery which answers with a preset outcome, or waits until one is given.
#[derive(Clone, Debug, Default)]
pub struct MockDiscovery {
    inner: Arc<Inner>,
}

impl MockDiscovery {
    /// Discovery which stays outstanding until [`complete`](Self::complete) is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovery which immediately returns `peers`.
    #[must_use]
    pub fn with_peers(peers: Vec<Peer>) -> Self {
        let discovery = Self::new();
        discovery.complete(Ok(peers));
        discovery
    }

    /// Discovery which immediately fails with `error`.
    #[must_use]
    pub fn failing(error: Error) -> Self {
        let discovery = Self::new();
        discovery.complete(Err(error));
        discovery
    }

    /// Answer outstanding and future queries with `outcome`.
    pub fn complete(&self, outcome: Result<Vec<Peer>, Error>) {
        *self.inner.outcome.lock() = Some(outcome);
        self.inner.outcome_ready.notify_waiters();
    }

    /// All queries received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<DiscoveryQuery> {
        self.inner.queries.lock().clone()
    }

    /// Wait for at least `count` queries to have been received.
    pub async fn wait_for_queries(&self, count: usize) {
        loop {
            let notified = self.inner.query_received.notified();
            if self.inner.queries.lock().len() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl DiscoveryAdaptor for MockDiscovery {
    type Error = Error;

    async fn discover(&self, query: DiscoveryQuery) -> Result<Vec<Peer>, Self::Error> {
        self.inner.queries.lock().push(query);
        self.inner.query_received.notify_waiters();

        loop {
            let notified = self.inner.outcome_ready.notified();
            if let Some(outcome) = self.inner.outcome.lock().clone() {
                return outcome;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_preset_peers() {
        let discovery = MockDiscovery::with_peers(vec![Peer::eligible("1", "node-a")]);

        let peers = discovery.discover(DiscoveryQuery::default()).await.unwrap();

        assert_eq!(peers, vec![Peer::eligible("1", "node-a")]);
        assert_eq!(discovery.queries(), vec![DiscoveryQuery::default()]);
    }

    #[tokio::test]
    async fn test_waits_for_completion() {
        let discovery = MockDiscovery::new();

        let pending = tokio::spawn({
            let discovery = discovery.clone();
            async move { discovery.discover(DiscoveryQuery::default()).await }
        });

        discovery.wait_for_queries(1).await;
        assert!(!pending.is_finished());

        discovery.complete(Err(Error::Transport("unreachable".to_string())));

        assert_matches!(pending.await.unwrap(), Err(Error::Transport(_)));
    }
}
