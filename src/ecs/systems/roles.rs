use bevy_ecs::system::{Query, Res};

use crate::agent::SpatialAgent;
use crate::ecs::clock::SimClock;

/// Flip the role of every agent whose period has elapsed.
///
/// Produces no events; role changes are only visible through later pairing.
pub fn advance_roles(clock: Res<SimClock>, mut agents: Query<&mut SpatialAgent>) {
    let now = clock.time;
    for mut agent in &mut agents {
        if agent.advance_role(now) {
            tracing::debug!(agent = %agent.id(), role = ?agent.role(), now = now.as_millis(), "role flipped");
        }
    }
}
