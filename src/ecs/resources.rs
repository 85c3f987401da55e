use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;

use crate::config::{HandoverPolicy, SimConfig};
use crate::id::AgentId;
use crate::sink::EventSink;

/// Signal propagation rules, copied out of `SimConfig` at construction.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct LinkSettings {
    pub radius: f64,
    pub disconnect_timeout: Duration,
    pub handover: HandoverPolicy,
}

impl From<&SimConfig> for LinkSettings {
    fn from(config: &SimConfig) -> Self {
        Self {
            radius: config.proximity_radius,
            disconnect_timeout: config.disconnect_timeout,
            handover: config.handover,
        }
    }
}

/// Mapping from agent ids to Bevy entities, plus the stable iteration order.
///
/// Systems walk `entities()` instead of raw query order so that pairing and
/// event production follow construction order on every run.
#[derive(Resource, Debug, Clone, Default)]
pub struct AgentIndex {
    by_id: BTreeMap<AgentId, Entity>,
    order: Vec<Entity>,
}

impl AgentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent. Panics if the id is already registered.
    pub fn insert(&mut self, id: AgentId, entity: Entity) {
        assert!(
            !self.by_id.contains_key(&id),
            "duplicate agent id {id} in AgentIndex"
        );
        self.by_id.insert(id, entity);
        self.order.push(entity);
    }

    pub fn get(&self, id: &AgentId) -> Option<Entity> {
        self.by_id.get(id).copied()
    }

    /// Entities in construction order.
    pub fn entities(&self) -> &[Entity] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// The event sink the delivery phase reports to.
#[derive(Resource)]
pub struct SinkSlot(Mutex<Box<dyn EventSink>>);

impl SinkSlot {
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self(Mutex::new(sink))
    }

    pub fn sink_mut(&mut self) -> &mut dyn EventSink {
        let sink = self.0.get_mut().unwrap_or_else(PoisonError::into_inner);
        &mut **sink
    }
}
