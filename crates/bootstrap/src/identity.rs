//! Local node identity.

use crate::PeerId;

/// What the orchestrator needs to know about the node it runs on.
pub trait NodeIdentity
where
    Self: Send + Sync + 'static,
{
    /// The local node's peer ID.
    fn local_peer(&self) -> &PeerId;

    /// Whether the local node may take part in forming a cluster.
    fn is_formation_eligible(&self) -> bool;
}

/// Fixed identity of the local node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalNode {
    peer_id: PeerId,
    formation_eligible: bool,
}

impl LocalNode {
    /// Create the identity of a node.
    pub fn new(peer_id: impl Into<PeerId>, formation_eligible: bool) -> Self {
        Self {
            peer_id: peer_id.into(),
            formation_eligible,
        }
    }
}

impl NodeIdentity for LocalNode {
    fn local_peer(&self) -> &PeerId {
        &self.peer_id
    }

    fn is_formation_eligible(&self) -> bool {
        self.formation_eligible
    }
}
