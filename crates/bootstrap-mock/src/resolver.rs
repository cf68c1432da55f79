use std::sync::Arc;

use parking_lot::Mutex;
use proven_bootstrap::{FormationConfiguration, FormationResolver, Peer};

use crate::Error;

/// Resolver which returns a preset configuration and records the peer sets it was given.
#[derive(Clone, Debug)]
pub struct MockResolver {
    outcome: Result<FormationConfiguration, Error>,
    resolved: Arc<Mutex<Vec<Vec<Peer>>>>,
}

impl MockResolver {
    /// Resolver which always returns `configuration`.
    #[must_use]
    pub fn returning(configuration: FormationConfiguration) -> Self {
        Self {
            outcome: Ok(configuration),
            resolved: Arc::default(),
        }
    }

    /// Resolver which always fails with `error`.
    #[must_use]
    pub fn failing(error: Error) -> Self {
        Self {
            outcome: Err(error),
            resolved: Arc::default(),
        }
    }

    /// Peer sets passed to [`FormationResolver::resolve`], in order.
    #[must_use]
    pub fn resolved(&self) -> Vec<Vec<Peer>> {
        self.resolved.lock().clone()
    }
}

impl FormationResolver for MockResolver {
    type Error = Error;

    fn resolve(&self, peers: &[Peer]) -> Result<FormationConfiguration, Self::Error> {
        self.resolved.lock().push(peers.to_vec());
        self.outcome.clone()
    }
}
