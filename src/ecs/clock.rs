use std::time::Duration;

use bevy_ecs::resource::Resource;
use bevy_ecs::system::ResMut;

use super::time::SimTime;

/// Simulation clock resource tracking the current tick time and tick count.
///
/// The caller sets `time` before each pass; `count_tick` runs at the end of
/// the pass (in `SimPhase::Delivery`), so every system sees the same `time`.
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    pub time: SimTime,
    pub tick_count: u64,
    pub interval: Duration,
}

impl SimClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            time: SimTime::ZERO,
            tick_count: 0,
            interval,
        }
    }

    /// Time of the next fixed-cadence step.
    pub fn next_step(&self) -> SimTime {
        self.time + self.interval
    }

    /// Move the clock to `now`.
    ///
    /// # Panics
    ///
    /// If `now` is earlier than the current time.
    pub fn set(&mut self, now: SimTime) {
        assert!(
            now >= self.time,
            "simulation time went backwards: {} -> {}",
            self.time,
            now
        );
        self.time = now;
    }
}

/// Bevy system that records a completed tick.
pub fn count_tick(mut clock: ResMut<SimClock>) {
    clock.tick_count += 1;
}
