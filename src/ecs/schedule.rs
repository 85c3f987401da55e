use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs, Schedule, ScheduleLabel, SystemSet};

use super::clock::count_tick;
use super::systems::{advance_roles, deliver_link_events, expire_links, propagate_signals};

/// Schedule label for one simulation tick.
/// Run via `world.run_schedule(SignalTick)`; `Simulation::tick` does this.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalTick;

/// Ordered phases within each tick.
///
/// Phases run in declaration order: Roles < Signals < Expiry < Delivery.
/// Every role is settled before any proximity check, so no agent is paired
/// against a stale role of another.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimPhase {
    Roles,
    Signals,
    Expiry,
    Delivery,
}

/// Build the `SignalTick` schedule with all engine systems registered.
///
/// Single-threaded: event production order must be reproducible.
pub fn configure_signal_schedule() -> Schedule {
    let mut schedule = Schedule::new(SignalTick);
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.configure_sets(
        (
            SimPhase::Roles,
            SimPhase::Signals,
            SimPhase::Expiry,
            SimPhase::Delivery,
        )
            .chain(),
    );
    schedule.add_systems(advance_roles.in_set(SimPhase::Roles));
    schedule.add_systems(propagate_signals.in_set(SimPhase::Signals));
    schedule.add_systems(expire_links.in_set(SimPhase::Expiry));
    schedule.add_systems((deliver_link_events, count_tick).chain().in_set(SimPhase::Delivery));
    schedule
}
