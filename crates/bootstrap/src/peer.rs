//! Peer identity types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a peer in the network.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Create a new peer ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the peer ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A peer as reported by discovery.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    /// Unique identifier of the peer.
    pub id: PeerId,

    /// Human-readable name of the peer.
    pub name: String,

    /// Whether the peer may take part in forming a cluster.
    pub formation_eligible: bool,
}

impl Peer {
    /// Create a formation-eligible peer.
    pub fn eligible(id: impl Into<PeerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            formation_eligible: true,
        }
    }

    /// Whether this peer matches a configured peer reference, by name or by ID.
    #[must_use]
    pub fn matches(&self, reference: &str) -> bool {
        self.name == reference || self.id.as_str() == reference
    }

    /// Whether the peer may take part in forming a cluster.
    #[must_use]
    pub const fn is_formation_eligible(&self) -> bool {
        self.formation_eligible
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{{{}}}", self.name, self.id)
    }
}

/// Comma-joined display form of a set of peers.
pub(crate) fn describe_peers(peers: &[Peer]) -> String {
    peers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_matches_by_name_or_id() {
        let peer = Peer::eligible("a1b2", "node-a");

        assert!(peer.matches("node-a"));
        assert!(peer.matches("a1b2"));
        assert!(!peer.matches("node-b"));
    }

    #[test]
    fn test_describe_peers() {
        let peers = vec![Peer::eligible("1", "node-a"), Peer::eligible("2", "node-b")];

        assert_eq!(describe_peers(&peers), "{node-a}{1}, {node-b}{2}");
        assert_eq!(describe_peers(&[]), "");
    }
}
