use bevy_ecs::message::MessageWriter;
use bevy_ecs::system::{Query, Res};

use crate::agent::{Role, SpatialAgent};
use crate::ecs::clock::SimClock;
use crate::ecs::events::LinkEvent;
use crate::ecs::resources::{AgentIndex, LinkSettings};
use crate::id::AgentId;
use crate::proximity::{Position, is_close};

/// Deliver a signal from every emitter to every in-range receiver.
///
/// Pairs are visited emitter-major in construction order, so when several
/// emitters reach one receiver the last of them in that order is the final
/// writer for the tick. A receiver whose deadline passed before this tick
/// reports `Disconnected` ahead of the new `Connected`.
pub fn propagate_signals(
    clock: Res<SimClock>,
    settings: Res<LinkSettings>,
    index: Res<AgentIndex>,
    mut agents: Query<&mut SpatialAgent>,
    mut events: MessageWriter<LinkEvent>,
) {
    let now = clock.time;
    let emitters: Vec<(AgentId, Position)> = index
        .entities()
        .iter()
        .filter_map(|&entity| agents.get(entity).ok())
        .filter(|agent| agent.role() == Role::Emitting)
        .map(|agent| (agent.id().clone(), agent.position()))
        .collect();

    for (emitter, origin) in &emitters {
        for &entity in index.entities() {
            let Ok(mut receiver) = agents.get_mut(entity) else {
                continue;
            };
            if receiver.role() != Role::Receiving
                || receiver.id() == emitter
                || !is_close(*origin, receiver.position(), settings.radius)
            {
                continue;
            }
            if let Some(event) = receiver.lapse_stale_link(now) {
                events.write(event);
            }
            if let Some(event) = receiver.on_signal_received(
                emitter,
                now,
                settings.disconnect_timeout,
                settings.handover,
            ) {
                events.write(event);
            }
        }
    }
}

/// Close every episode whose deadline has been reached.
///
/// Runs after `propagate_signals`, so a receiver refreshed this tick is safe.
/// Applies to agents of either role: an agent that flipped to Emitting still
/// lapses on schedule.
pub fn expire_links(
    clock: Res<SimClock>,
    index: Res<AgentIndex>,
    mut agents: Query<&mut SpatialAgent>,
    mut events: MessageWriter<LinkEvent>,
) {
    let now = clock.time;
    for &entity in index.entities() {
        let Ok(mut agent) = agents.get_mut(entity) else {
            continue;
        };
        if !agent.disconnect_deadline().is_some_and(|deadline| deadline <= now) {
            continue;
        }
        if let Some(event) = agent.expire_link(now) {
            events.write(event);
        }
    }
}
