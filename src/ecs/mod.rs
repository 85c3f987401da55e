pub mod app;
pub mod clock;
pub mod events;
pub mod resources;
pub mod schedule;
pub mod systems;
pub mod time;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use app::Simulation;
pub use clock::SimClock;
pub use events::LinkEvent;
pub use resources::{AgentIndex, LinkSettings, SinkSlot};
pub use schedule::{SignalTick, SimPhase, configure_signal_schedule};
pub use time::SimTime;
