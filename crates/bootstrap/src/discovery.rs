//! Abstract interface for discovering formation-eligible peers.

use std::error::Error;
use std::fmt::{self, Debug, Display};

use async_trait::async_trait;

use crate::{Peer, TriggerConfig};

/// A request for the formation-eligible peers currently visible to this node.
///
/// There is no timeout: the query stays outstanding until it can be satisfied.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiscoveryQuery {
    /// Minimum number of peers to wait for, if any.
    pub min_count: Option<u32>,

    /// Peers (by name or ID) which must all be visible.
    pub required_peers: Vec<String>,
}

impl From<&TriggerConfig> for DiscoveryQuery {
    fn from(trigger: &TriggerConfig) -> Self {
        Self {
            min_count: (trigger.expected_count > 0).then_some(trigger.expected_count),
            required_peers: trigger.required_peers.clone(),
        }
    }
}

impl Display for DiscoveryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiscoveryQuery{{min_count=")?;
        match self.min_count {
            Some(count) => write!(f, "{count}")?,
            None => write!(f, "none")?,
        }
        write!(f, ", required_peers={:?}}}", self.required_peers)
    }
}

/// The kind of discovery error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DiscoveryErrorKind {
    /// The request could not be delivered or answered
    Transport,

    /// Other/unknown error
    Other,
}

impl Display for DiscoveryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Marker trait for `DiscoveryAdaptor` errors
pub trait DiscoveryError: Debug + Error + Send + Sync {
    /// Returns the kind of this error
    fn kind(&self) -> DiscoveryErrorKind;
}

/// Answers which formation-eligible peers are currently visible.
#[async_trait]
pub trait DiscoveryAdaptor
where
    Self: Send + Sync + 'static,
{
    /// The error type for this adaptor.
    type Error: DiscoveryError;

    /// Wait until the query is satisfied and return the visible peers.
    ///
    /// Implementations guarantee that the result holds at least `min_count` peers, contains
    /// every required peer, and contains only formation-eligible peers.
    async fn discover(&self, query: DiscoveryQuery) -> Result<Vec<Peer>, Self::Error>;
}
