//! Automatic cluster formation orchestrator.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, trace, warn};

use crate::discovery::{DiscoveryAdaptor, DiscoveryError, DiscoveryQuery};
use crate::formation::{FormationAdaptor, FormationConfiguration, FormationError};
use crate::identity::NodeIdentity;
use crate::peer::{Peer, describe_peers};
use crate::resolver::{FormationResolver, ResolverError};
use crate::scheduler::{RetryScheduler, ScheduleOutcome};
use crate::{Result, TriggerConfig};

/// Delay between a failed formation request and its retry.
pub const RETRY_DELAY: Duration = Duration::from_secs(10);

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Lifecycle state of a [`ClusterBootstrap`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BootstrapState {
    /// Not yet started.
    Idle,

    /// Started and not yet stopped.
    Running,

    /// Stopped; no further formation attempts will be made.
    Stopped,
}

impl BootstrapState {
    const fn from_u8(value: u8) -> Self {
        match value {
            IDLE => Self::Idle,
            RUNNING => Self::Running,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Options for creating a new `ClusterBootstrap`.
pub struct ClusterBootstrapOptions<D, R, F, S>
where
    D: DiscoveryAdaptor,
    R: FormationResolver,
    F: FormationAdaptor,
    S: RetryScheduler,
{
    /// When this node should trigger formation.
    pub trigger: TriggerConfig,

    /// Identity of the local node.
    pub identity: Arc<dyn NodeIdentity>,

    /// Finds formation-eligible peers.
    pub discovery: D,

    /// Turns discovered peers into a formation configuration.
    pub resolver: R,

    /// Submits the formation configuration.
    pub formation: F,

    /// Delays retries of failed submissions.
    pub scheduler: S,
}

struct Inner<D, R, F, S> {
    trigger: TriggerConfig,
    identity: Arc<dyn NodeIdentity>,
    discovery: D,
    resolver: R,
    formation: F,
    scheduler: S,
    state: AtomicU8,
}

/// Forms a cluster from this node once enough formation-eligible peers are visible.
///
/// Created once per node process. [`start`](Self::start) is called once during startup and
/// [`stop`](Self::stop) once during shutdown. All work happens on a single background task;
/// neither call blocks.
pub struct ClusterBootstrap<D, R, F, S>
where
    D: DiscoveryAdaptor,
    R: FormationResolver,
    F: FormationAdaptor,
    S: RetryScheduler,
{
    inner: Arc<Inner<D, R, F, S>>,
    task_tracker: TaskTracker,
}

impl<D, R, F, S> ClusterBootstrap<D, R, F, S>
where
    D: DiscoveryAdaptor,
    R: FormationResolver,
    F: FormationAdaptor,
    S: RetryScheduler,
{
    /// Creates a new instance of `ClusterBootstrap`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if the trigger
    /// configuration can never be satisfied.
    pub fn new(options: ClusterBootstrapOptions<D, R, F, S>) -> Result<Self> {
        options.trigger.validate()?;

        Ok(Self {
            inner: Arc::new(Inner {
                trigger: options.trigger,
                identity: options.identity,
                discovery: options.discovery,
                resolver: options.resolver,
                formation: options.formation,
                scheduler: options.scheduler,
                state: AtomicU8::new(IDLE),
            }),
            task_tracker: TaskTracker::new(),
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> BootstrapState {
        self.inner.state()
    }

    /// Start the bootstrap.
    ///
    /// If the trigger is configured and the local node is formation-eligible, spawns the task
    /// that waits for discovery and then submits the formation configuration until it succeeds.
    /// Otherwise does nothing further.
    ///
    /// # Panics
    ///
    /// Panics if already started, or if called outside a tokio runtime when the trigger fires.
    /// In the latter case the state is left untouched.
    pub fn start(&self) {
        let handle = self.should_trigger().then(|| {
            Handle::try_current()
                .unwrap_or_else(|e| panic!("cluster bootstrap started outside a runtime: {e}"))
        });

        if let Err(state) =
            self.inner
                .state
                .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        {
            panic!(
                "cluster bootstrap started while {}",
                BootstrapState::from_u8(state)
            );
        }

        if let Some(handle) = handle {
            debug!(
                "waiting for discovery of [{}] formation-eligible peers, requiring {:?}",
                self.inner.trigger.expected_count, self.inner.trigger.required_peers
            );

            let inner = Arc::clone(&self.inner);
            self.task_tracker
                .spawn_on(async move { inner.run().await }.in_current_span(), &handle);
        }

        self.task_tracker.close();
    }

    fn should_trigger(&self) -> bool {
        if !self.inner.trigger.is_active() {
            debug!("no formation trigger configured, not bootstrapping");
            false
        } else if !self.inner.identity.is_formation_eligible() {
            debug!(
                "node {} is not formation-eligible, not bootstrapping",
                self.inner.identity.local_peer()
            );
            false
        } else {
            true
        }
    }

    /// Stop the bootstrap.
    ///
    /// Prevents any further formation attempt. An in-flight discovery query or formation
    /// request is left to complete.
    ///
    /// # Panics
    ///
    /// Panics if not running.
    pub fn stop(&self) {
        if let Err(state) =
            self.inner
                .state
                .compare_exchange(RUNNING, STOPPED, Ordering::AcqRel, Ordering::Acquire)
        {
            panic!(
                "cluster bootstrap stopped while {}",
                BootstrapState::from_u8(state)
            );
        }

        debug!("cluster bootstrap stopped");
    }

    /// Wait for the background task to finish.
    ///
    /// Only returns once [`start`](Self::start) has been called and the task (if any) has
    /// either formed the cluster or given up.
    pub async fn wait(&self) {
        self.task_tracker.wait().await;
    }
}

impl<D, R, F, S> Inner<D, R, F, S>
where
    D: DiscoveryAdaptor,
    R: FormationResolver,
    F: FormationAdaptor,
    S: RetryScheduler,
{
    fn state(&self) -> BootstrapState {
        BootstrapState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    async fn run(&self) {
        let query = DiscoveryQuery::from(&self.trigger);
        trace!("sending {query}");

        let peers = match self.discovery.discover(query).await {
            Ok(peers) => peers,
            Err(e) => {
                warn!("discovery attempt failed ({}): {e}", e.kind());
                return;
            }
        };

        if peers.len() < self.trigger.expected_count as usize {
            warn!(
                "discovered [{}], fewer than the expected [{}] peers, not bootstrapping",
                describe_peers(&peers),
                self.trigger.expected_count
            );
            return;
        }
        if !peers.iter().all(Peer::is_formation_eligible) {
            warn!(
                "discovered [{}] including ineligible peers, not bootstrapping",
                describe_peers(&peers)
            );
            return;
        }
        debug!(
            "discovered [{}], starting to bootstrap",
            describe_peers(&peers)
        );

        let configuration = match self.resolver.resolve(&peers) {
            Ok(configuration) => configuration,
            Err(e) => {
                warn!(
                    "could not resolve formation configuration from [{}] ({}): {e}",
                    describe_peers(&peers),
                    e.kind()
                );
                return;
            }
        };

        self.await_bootstrap(&configuration).await;
    }

    async fn await_bootstrap(&self, configuration: &FormationConfiguration) {
        loop {
            if !self.is_running() {
                debug!(
                    "not running, abandoning bootstrap with [{}]",
                    configuration.node_descriptions()
                );
                return;
            }

            trace!("sending formation request with {configuration}");

            match self.formation.submit(configuration).await {
                Ok(response) => {
                    debug!("automatic cluster bootstrapping successful: received {response}");
                    return;
                }
                Err(e) => {
                    warn!(
                        "automatic cluster bootstrapping failed ({}), retrying [{}]: {e}",
                        e.kind(),
                        configuration.node_descriptions()
                    );
                }
            }

            let description = format!(
                "retry bootstrapping with [{}]",
                configuration.node_descriptions()
            );

            if self.scheduler.schedule_after(RETRY_DELAY, description).await
                == ScheduleOutcome::ShuttingDown
            {
                debug!(
                    "shutting down, abandoning bootstrap with [{}]",
                    configuration.node_descriptions()
                );
                return;
            }
        }
    }
}

impl<D, R, F, S> fmt::Debug for ClusterBootstrap<D, R, F, S>
where
    D: DiscoveryAdaptor,
    R: FormationResolver,
    F: FormationAdaptor,
    S: RetryScheduler,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterBootstrap")
            .field("trigger", &self.inner.trigger)
            .field("local_peer", self.inner.identity.local_peer())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_u8() {
        assert_eq!(BootstrapState::from_u8(IDLE), BootstrapState::Idle);
        assert_eq!(BootstrapState::from_u8(RUNNING), BootstrapState::Running);
        assert_eq!(BootstrapState::from_u8(STOPPED), BootstrapState::Stopped);
    }

    #[test]
    fn test_retry_delay() {
        assert_eq!(RETRY_DELAY, Duration::from_secs(10));
    }
}
