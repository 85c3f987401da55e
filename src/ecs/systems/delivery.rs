use bevy_ecs::message::Messages;
use bevy_ecs::world::World;

use crate::ecs::clock::SimClock;
use crate::ecs::events::LinkEvent;
use crate::ecs::resources::SinkSlot;

/// Exclusive system that drains this tick's `LinkEvent` messages into the
/// event sink, in production order, then signals the end of the tick.
///
/// Sink failures are logged and skipped. Agent state is never rolled back.
pub fn deliver_link_events(world: &mut World) {
    let events: Vec<LinkEvent> = match world.get_resource_mut::<Messages<LinkEvent>>() {
        Some(mut messages) => messages.drain().collect(),
        None => Vec::new(),
    };
    let clock = world.resource::<SimClock>();
    let (now, tick) = (clock.time, clock.tick_count);

    let Some(mut slot) = world.get_resource_mut::<SinkSlot>() else {
        return;
    };
    let sink = slot.sink_mut();
    for event in &events {
        if let Err(err) = sink.handle(event) {
            tracing::warn!(?event, %err, "event sink rejected event");
        }
    }
    if let Err(err) = sink.tick_completed(now) {
        tracing::warn!(tick, %err, "event sink failed at end of tick");
    }
    tracing::trace!(tick, now = now.as_millis(), delivered = events.len(), "tick delivered");
}
