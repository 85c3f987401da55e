use bevy_ecs::message::Message;
use serde::{Deserialize, Serialize};

use crate::ecs::time::SimTime;
use crate::id::AgentId;

/// Connection lifecycle events reported to the event sink.
///
/// Written by the signal systems during a tick and drained, in production
/// order, by `deliver_link_events` at the end of the same tick.
#[derive(Message, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkEvent {
    /// `receiver` opened an episode with (or, under `Adopt`, switched to) `emitter`.
    Connected {
        receiver: AgentId,
        emitter: AgentId,
        at: SimTime,
    },
    /// `receiver`'s episode lapsed without a refresh.
    Disconnected { receiver: AgentId, at: SimTime },
}

impl LinkEvent {
    pub fn receiver(&self) -> &AgentId {
        match self {
            LinkEvent::Connected { receiver, .. } | LinkEvent::Disconnected { receiver, .. } => {
                receiver
            }
        }
    }

    pub fn at(&self) -> SimTime {
        match self {
            LinkEvent::Connected { at, .. } | LinkEvent::Disconnected { at, .. } => *at,
        }
    }
}
