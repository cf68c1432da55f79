//! Runs the cluster bootstrap against in-memory discovery and formation.
//!
//! ```sh
//! cargo run -p proven-bootstrap --example local_bootstrap -- --initial-node-count 3 --failures 1
//! ```

use std::sync::Arc;

use clap::Parser;
use proven_bootstrap::{
    ClusterBootstrap, ClusterBootstrapOptions, DiscoveredPeersResolver, LocalNode, Peer,
    TokioRetryScheduler, TriggerConfig,
};
use proven_bootstrap_mock::{MockDiscovery, MockFormation};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(about = "Form a local cluster from simulated peers")]
struct Args {
    #[command(flatten)]
    trigger: TriggerConfig,

    /// Number of formation requests to reject before accepting one
    #[arg(long, default_value_t = 0)]
    failures: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(Level::TRACE)
            .finish(),
    )?;

    let args = Args::parse();

    // Required peers are discovered under their configured names, topped up to the expected count
    let mut peers = args
        .trigger
        .required_peers
        .iter()
        .enumerate()
        .map(|(i, name)| Peer::eligible(format!("peer-{i}"), name.clone()))
        .collect::<Vec<_>>();
    while peers.len() < args.trigger.expected_count as usize {
        let i = peers.len();
        peers.push(Peer::eligible(format!("peer-{i}"), format!("node-{i}")));
    }

    let formation = MockFormation::failing_times(args.failures, "quorum changed");
    let scheduler = TokioRetryScheduler::new();

    let bootstrap = ClusterBootstrap::new(ClusterBootstrapOptions {
        resolver: DiscoveredPeersResolver::new(args.trigger.required_peers.clone()),
        trigger: args.trigger,
        identity: Arc::new(LocalNode::new("peer-0", true)),
        discovery: MockDiscovery::with_peers(peers),
        formation: formation.clone(),
        scheduler: scheduler.clone(),
    })?;

    bootstrap.start();

    tokio::select! {
        () = bootstrap.wait() => {}
        _ = tokio::signal::ctrl_c() => {
            scheduler.shutdown();
            bootstrap.wait().await;
        }
    }

    bootstrap.stop();
    info!(
        "bootstrap finished after {} formation requests",
        formation.submissions().len()
    );

    Ok(())
}
