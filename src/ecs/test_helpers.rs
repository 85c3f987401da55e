use std::io;
use std::time::Duration;

use crate::agent::AgentSpec;
use crate::config::SimConfig;
use crate::ecs::app::Simulation;
use crate::ecs::events::LinkEvent;
use crate::ecs::time::SimTime;
use crate::error::SinkError;
use crate::id::AgentId;
use crate::sink::{EventRecorder, EventSink, SharedSink};

/// A role period long enough that no test run ever flips.
pub const LONG: Duration = Duration::from_secs(3600);

/// Build a simulation with default config except `radius`, reporting into a
/// shared recorder.
pub fn recording_sim(radius: f64, agents: Vec<AgentSpec>) -> (Simulation, SharedSink<EventRecorder>) {
    recording_sim_with(SimConfig::default().with_radius(radius), agents)
}

pub fn recording_sim_with(
    config: SimConfig,
    agents: Vec<AgentSpec>,
) -> (Simulation, SharedSink<EventRecorder>) {
    let recorder = SharedSink::new(EventRecorder::new());
    let sim = Simulation::new(config, agents, recorder.clone()).expect("valid test setup");
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

/// Rejects everything it is given.
pub struct FailingSink;

impl EventSink for FailingSink {
    fn handle(&mut self, _event: &LinkEvent) -> Result<(), SinkError> {
        Err(io::Error::other("sink offline").into())
    }

    fn tick_completed(&mut self, _now: SimTime) -> Result<(), SinkError> {
        Err(io::Error::other("sink offline").into())
    }
}
