//! Three agents, radius 10, 100ms ticks, run for ten seconds.
//!
//! `RUST_LOG=debug cargo run --example three_agents` also prints the
//! connection table after every tick.

use std::thread;
use std::time::Duration;

use signal_sim::{
    AgentSpec, ConnectionMap, FanOut, SharedSink, SimConfig, Simulation, SimulationRunner,
    TracingSink,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let agents = vec![
        AgentSpec::new("A", 0.0, 0.0),
        AgentSpec::new("B", 5.0, 5.0),
        // Out of A's range.
        AgentSpec::new("C", 9.0, 9.0),
    ];
    let config = SimConfig::default().with_radius(10.0).with_seed(rand::random::<u64>());
    let controller = SharedSink::new(ConnectionMap::new());
    let sink = FanOut::new().with(TracingSink::new()).with(controller.clone());

    let sim = Simulation::new(config, agents, sink).expect("valid demo setup");
    let mut runner = SimulationRunner::new(sim);
    runner.start(Some(Duration::from_millis(100))).expect("runner starts");
    thread::sleep(Duration::from_secs(10));
    runner.stop().expect("runner stops");

    println!("Current connections: {}", controller.lock());
}
