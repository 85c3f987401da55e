//! Proximity-linked signal agents.
//!
//! Agents alternate between emitting and receiving. A receiver within range
//! of an emitter connects to it; the connection stays alive while signals keep
//! arriving and lapses after a fixed timeout. Each tick is one pass of a
//! bevy_ecs schedule; connection events go to an [`EventSink`].

pub mod agent;
pub mod config;
pub mod ecs;
pub mod error;
pub mod id;
pub mod proximity;
pub mod runner;
pub mod sink;

pub use agent::{AgentSpec, Connection, Role, SpatialAgent};
pub use config::{HandoverPolicy, SimConfig};
pub use ecs::{LinkEvent, SimTime, Simulation};
pub use error::{ConfigError, RunnerError, SinkError};
pub use id::{AgentId, AgentIdGenerator};
pub use proximity::{Position, is_close};
pub use runner::SimulationRunner;
pub use sink::{ConnectionMap, EventRecorder, EventSink, FanOut, JsonlSink, SharedSink, TracingSink};
