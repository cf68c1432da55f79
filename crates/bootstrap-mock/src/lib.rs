//! In-memory implementations of the cluster bootstrap ports for tests and local development.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod discovery;
mod error;
mod formation;
mod resolver;
mod scheduler;

pub use discovery::MockDiscovery;
pub use error::Error;
pub use formation::MockFormation;
pub use resolver::MockResolver;
pub use scheduler::{ManualScheduler, ScheduledRetry};
