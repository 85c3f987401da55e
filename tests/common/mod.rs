#![allow(dead_code)]

use std::time::Duration;

use signal_sim::{
    AgentId, AgentSpec, EventRecorder, LinkEvent, Role, SharedSink, SimConfig, SimTime, Simulation,
};

/// No test run is long enough for this period to elapse.
pub const LONG: Duration = Duration::from_secs(3600);

pub fn emitter(id: &str, x: f64, y: f64) -> AgentSpec {
    AgentSpec::new(id, x, y).with_role_period(LONG)
}

pub fn receiver(id: &str, x: f64, y: f64) -> AgentSpec {
    AgentSpec::new(id, x, y)
        .with_role(Role::Receiving)
        .with_role_period(LONG)
}

pub fn build(config: SimConfig, agents: Vec<AgentSpec>) -> (Simulation, SharedSink<EventRecorder>) {
    let recorder = SharedSink::new(EventRecorder::new());
    let sim = Simulation::new(config, agents, recorder.clone()).unwrap();
    (sim, recorder)
}

pub fn connected(receiver: &str, emitter: &str, at: u64) -> LinkEvent {
    LinkEvent::Connected {
        receiver: AgentId::from(receiver),
        emitter: AgentId::from(emitter),
        at: SimTime::from_millis(at),
    }
}

pub fn disconnected(receiver: &str, at: u64) -> LinkEvent {
    LinkEvent::Disconnected {
        receiver: AgentId::from(receiver),
        at: SimTime::from_millis(at),
    }
}

pub fn count_connected(events: &[LinkEvent], receiver: &str) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, LinkEvent::Connected { .. }) && e.receiver().as_str() == receiver)
        .count()
}
