//! Turning a discovered peer set into a formation configuration.

use std::collections::HashSet;
use std::error::Error;
use std::fmt::{self, Debug, Display};

use thiserror::Error as ThisError;

use crate::{FormationConfiguration, NodeDescription, Peer, PeerId};

/// The kind of resolver error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResolverErrorKind {
    /// The discovered peers cannot form a valid configuration
    InvalidPeers,

    /// A required peer was not matched
    MissingRequiredPeer,

    /// Other/unknown error
    Other,
}

impl Display for ResolverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Marker trait for `FormationResolver` errors
pub trait ResolverError: Debug + Error + Send + Sync {
    /// Returns the kind of this error
    fn kind(&self) -> ResolverErrorKind;
}

/// Produces a voting configuration from a discovered peer set.
pub trait FormationResolver
where
    Self: Send + Sync + 'static,
{
    /// The error type for this resolver.
    type Error: ResolverError;

    /// Resolve `peers` into a formation configuration.
    fn resolve(&self, peers: &[Peer]) -> Result<FormationConfiguration, Self::Error>;
}

/// Errors from [`DiscoveredPeersResolver`].
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResolveError {
    /// No peers to form a cluster from.
    #[error("no peers discovered")]
    NoPeers,

    /// The same peer ID was discovered twice.
    #[error("peer [{0}] discovered more than once")]
    DuplicatePeer(PeerId),

    /// A discovered peer may not take part in forming a cluster.
    #[error("peer [{0}] is not formation-eligible")]
    IneligiblePeer(PeerId),

    /// A required peer matched none of the discovered peers.
    #[error("required peer [{0}] was not discovered")]
    MissingRequiredPeer(String),

    /// A required peer matched several discovered peers.
    #[error("required peer [{reference}] matches several discovered peers: {matches}")]
    AmbiguousRequiredPeer {
        /// The configured reference.
        reference: String,

        /// Display form of the matching peers.
        matches: String,
    },
}

impl ResolverError for ResolveError {
    fn kind(&self) -> ResolverErrorKind {
        match self {
            Self::NoPeers
            | Self::DuplicatePeer(_)
            | Self::IneligiblePeer(_)
            | Self::AmbiguousRequiredPeer { .. } => ResolverErrorKind::InvalidPeers,
            Self::MissingRequiredPeer(_) => ResolverErrorKind::MissingRequiredPeer,
        }
    }
}

/// Uses every discovered peer as a voting member, in discovery order.
///
/// Each configured required peer must match exactly one discovered peer, by name or by ID.
#[derive(Clone, Debug, Default)]
pub struct DiscoveredPeersResolver {
    required_peers: Vec<String>,
}

impl DiscoveredPeersResolver {
    /// Create a resolver which checks the given required peers.
    #[must_use]
    pub const fn new(required_peers: Vec<String>) -> Self {
        Self { required_peers }
    }
}

impl FormationResolver for DiscoveredPeersResolver {
    type Error = ResolveError;

    fn resolve(&self, peers: &[Peer]) -> Result<FormationConfiguration, Self::Error> {
        if peers.is_empty() {
            return Err(ResolveError::NoPeers);
        }

        let mut seen = HashSet::with_capacity(peers.len());
        for peer in peers {
            if !peer.is_formation_eligible() {
                return Err(ResolveError::IneligiblePeer(peer.id.clone()));
            }
            if !seen.insert(&peer.id) {
                return Err(ResolveError::DuplicatePeer(peer.id.clone()));
            }
        }

        for reference in &self.required_peers {
            let matches = peers
                .iter()
                .filter(|peer| peer.matches(reference))
                .collect::<Vec<_>>();

            match matches.len() {
                0 => return Err(ResolveError::MissingRequiredPeer(reference.clone())),
                1 => {}
                _ => {
                    return Err(ResolveError::AmbiguousRequiredPeer {
                        reference: reference.clone(),
                        matches: matches
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", "),
                    });
                }
            }
        }

        Ok(FormationConfiguration::new(
            peers
                .iter()
                .map(|peer| NodeDescription::new(peer.id.clone(), peer.name.clone()))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    fn peers() -> Vec<Peer> {
        vec![
            Peer::eligible("1", "node-a"),
            Peer::eligible("2", "node-b"),
            Peer::eligible("3", "node-c"),
        ]
    }

    #[test]
    fn test_resolves_all_peers_in_order() {
        let configuration = DiscoveredPeersResolver::default().resolve(&peers()).unwrap();

        assert_eq!(
            configuration.nodes(),
            &[
                NodeDescription::new("1", "node-a"),
                NodeDescription::new("2", "node-b"),
                NodeDescription::new("3", "node-c"),
            ]
        );
    }

    #[test]
    fn test_required_peers_by_name_or_id() {
        let resolver = DiscoveredPeersResolver::new(vec!["node-a".to_string(), "3".to_string()]);

        assert!(resolver.resolve(&peers()).is_ok());
    }

    #[test]
    fn test_missing_required_peer() {
        let resolver = DiscoveredPeersResolver::new(vec!["node-z".to_string()]);
        let err = resolver.resolve(&peers()).unwrap_err();

        assert_eq!(err, ResolveError::MissingRequiredPeer("node-z".to_string()));
        assert_eq!(err.kind(), ResolverErrorKind::MissingRequiredPeer);
    }

    #[test]
    fn test_ambiguous_required_peer() {
        let resolver = DiscoveredPeersResolver::new(vec!["node-a".to_string()]);
        let peers = vec![Peer::eligible("1", "node-a"), Peer::eligible("node-a", "node-x")];

        assert_matches!(
            resolver.resolve(&peers),
            Err(ResolveError::AmbiguousRequiredPeer { reference, .. }) if reference == "node-a"
        );
    }

    #[test]
    fn test_invalid_peer_sets() {
        let resolver = DiscoveredPeersResolver::default();

        assert_eq!(resolver.resolve(&[]), Err(ResolveError::NoPeers));

        let duplicate = vec![Peer::eligible("1", "node-a"), Peer::eligible("1", "node-b")];
        assert_eq!(
            resolver.resolve(&duplicate),
            Err(ResolveError::DuplicatePeer(PeerId::from("1")))
        );

        let mut ineligible = peers();
        ineligible[1].formation_eligible = false;
        assert_matches!(
            resolver.resolve(&ineligible),
            Err(ResolveError::IneligiblePeer(id)) if id.as_str() == "2"
        );
    }
}
