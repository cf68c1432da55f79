//! Error types for the mock bootstrap ports.

use proven_bootstrap::{
    DiscoveryError, DiscoveryErrorKind, FormationError, FormationErrorKind, ResolverError,
    ResolverErrorKind,
};
use thiserror::Error;

/// Error type for the mock bootstrap ports.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The formation request was rejected, e.g. because the quorum changed.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The configuration could not be resolved.
    #[error("unresolvable: {0}")]
    Unresolvable(String),

    /// The request could not be delivered.
    #[error("transport error: {0}")]
    Transport(String),
}

impl DiscoveryError for Error {
    fn kind(&self) -> DiscoveryErrorKind {
        match self {
            Self::Transport(_) => DiscoveryErrorKind::Transport,
            Self::Rejected(_) | Self::Unresolvable(_) => DiscoveryErrorKind::Other,
        }
    }
}

impl FormationError for Error {
    fn kind(&self) -> FormationErrorKind {
        match self {
            Self::Rejected(_) => FormationErrorKind::Rejected,
            Self::Transport(_) => FormationErrorKind::Transport,
            Self::Unresolvable(_) => FormationErrorKind::Other,
        }
    }
}

impl ResolverError for Error {
    fn kind(&self) -> ResolverErrorKind {
        match self {
            Self::Unresolvable(_) => ResolverErrorKind::InvalidPeers,
            Self::Rejected(_) | Self::Transport(_) => ResolverErrorKind::Other,
        }
    }
}
