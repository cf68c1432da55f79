//! Formation configuration and the command that submits it.

use std::error::Error;
use std::fmt::{self, Debug, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::PeerId;

/// Describes one voting member of the initial cluster.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeDescription {
    /// The peer's ID, if known.
    pub id: Option<PeerId>,

    /// The peer's name.
    pub name: String,
}

impl NodeDescription {
    /// Create a description of a peer with a known ID.
    pub fn new(id: impl Into<PeerId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
        }
    }

    /// Create a description of a peer known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

impl Display for NodeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{{{}}}{{{id}}}", self.name),
            None => write!(f, "{{{}}}", self.name),
        }
    }
}

/// The voting configuration submitted to form the cluster.
///
/// Derived once from a discovered peer set and replayed unchanged on every retry.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FormationConfiguration {
    nodes: Vec<NodeDescription>,
}

impl FormationConfiguration {
    /// Create a configuration from its voting members.
    #[must_use]
    pub const fn new(nodes: Vec<NodeDescription>) -> Self {
        Self { nodes }
    }

    /// The voting members.
    #[must_use]
    pub fn nodes(&self) -> &[NodeDescription] {
        &self.nodes
    }

    /// Human-readable, comma-joined descriptions of the voting members.
    #[must_use]
    pub fn node_descriptions(&self) -> String {
        self.nodes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Display for FormationConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormationConfiguration[{}]", self.node_descriptions())
    }
}

/// Response to a successful formation request.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FormationResponse {
    /// Whether the cluster had already been formed before this request.
    pub already_formed: bool,
}

impl Display for FormationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormationResponse{{already_formed={}}}", self.already_formed)
    }
}

/// The kind of formation error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FormationErrorKind {
    /// The configuration no longer matches the discovered peers or lost its quorum
    Rejected,

    /// The request could not be delivered or answered
    Transport,

    /// Other/unknown error
    Other,
}

impl Display for FormationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Marker trait for `FormationAdaptor` errors
pub trait FormationError: Debug + Error + Send + Sync {
    /// Returns the kind of this error
    fn kind(&self) -> FormationErrorKind;
}

/// Submits a formation configuration to the local node.
#[async_trait]
pub trait FormationAdaptor
where
    Self: Send + Sync + 'static,
{
    /// The error type for this adaptor.
    type Error: FormationError;

    /// Ask the node to form the cluster with `configuration`.
    ///
    /// Must be idempotent: submitting a configuration for a cluster that has already formed
    /// succeeds.
    async fn submit(
        &self,
        configuration: &FormationConfiguration,
    ) -> Result<FormationResponse, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_descriptions() {
        let configuration = FormationConfiguration::new(vec![
            NodeDescription::new("1", "node-a"),
            NodeDescription::named("node-b"),
        ]);

        assert_eq!(configuration.node_descriptions(), "{node-a}{1}, {node-b}");
        assert_eq!(
            configuration.to_string(),
            "FormationConfiguration[{node-a}{1}, {node-b}]"
        );
    }
}
