//! Automatic cluster formation for freshly started nodes.
//!
//! This crate provides:
//! - Trigger configuration (when a node should try to form a cluster)
//! - Port traits for discovery, configuration resolution, formation and retry scheduling
//! - A reference resolver and a tokio-backed retry scheduler
//! - The [`ClusterBootstrap`] orchestrator tying them together
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod bootstrap;
pub mod config;
pub mod discovery;
mod error;
pub mod formation;
pub mod identity;
pub mod peer;
pub mod resolver;
pub mod scheduler;

pub use bootstrap::{BootstrapState, ClusterBootstrap, ClusterBootstrapOptions, RETRY_DELAY};
pub use config::TriggerConfig;
pub use discovery::{DiscoveryAdaptor, DiscoveryError, DiscoveryErrorKind, DiscoveryQuery};
pub use error::{Error, Result};
pub use formation::{
    FormationAdaptor, FormationConfiguration, FormationError, FormationErrorKind,
    FormationResponse, NodeDescription,
};
pub use identity::{LocalNode, NodeIdentity};
pub use peer::{Peer, PeerId};
pub use resolver::{
    DiscoveredPeersResolver, FormationResolver, ResolveError, ResolverError, ResolverErrorKind,
};
pub use scheduler::{RetryScheduler, ScheduleOutcome, TokioRetryScheduler};
