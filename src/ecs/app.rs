use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use bevy_ecs::message::MessageRegistry;
use bevy_ecs::world::World;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::clock::SimClock;
use super::events::LinkEvent;
use super::resources::{AgentIndex, LinkSettings, SinkSlot};
use super::schedule::{SignalTick, configure_signal_schedule};
use super::time::SimTime;
use crate::agent::{AgentSpec, SpatialAgent};
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::id::AgentId;
use crate::proximity::Position;
use crate::sink::EventSink;

/// The simulation engine: a headless Bevy world holding every agent, the
/// clock, and the event sink, plus the `SignalTick` schedule that drives them.
///
/// Manual tick control:
/// ```no_run
/// # use signal_sim::{AgentSpec, ConnectionMap, SimConfig, SimTime, Simulation};
/// let agents = vec![AgentSpec::new("A", 0.0, 0.0), AgentSpec::new("B", 5.0, 5.0)];
/// let mut sim = Simulation::new(SimConfig::default(), agents, ConnectionMap::new()).unwrap();
/// for step in 1..=100 {
///     sim.tick(SimTime::from_millis(step * 100));
/// }
/// ```
pub struct Simulation {
    world: World,
    config: SimConfig,
}

impl Simulation {
    /// Validate `config` and `agents`, then build the world.
    ///
    /// Role periods not pinned by an `AgentSpec` are drawn from the configured range
    /// with a `SmallRng` seeded from `config.seed`, in agent order.
    pub fn new(
        config: SimConfig,
        agents: Vec<AgentSpec>,
        sink: impl EventSink + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_agents(&agents)?;

        let mut world = World::new();
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let period_range = config.role_period_range_ms();
        let mut index = AgentIndex::new();

        for spec in agents {
            let period = spec
                .role_period
                .unwrap_or_else(|| Duration::from_millis(rng.random_range(period_range.clone())));
            let id = spec.id.clone();
            let entity = world
                .spawn(SpatialAgent::new(spec.id, spec.position, spec.role, period))
                .id();
            tracing::debug!(agent = %id, period_ms = period.as_millis() as u64, "agent spawned");
            index.insert(id, entity);
        }

        world.insert_resource(SimClock::new(config.tick_interval));
        world.insert_resource(LinkSettings::from(&config));
        world.insert_resource(index);
        world.insert_resource(SinkSlot::new(Box::new(sink)));
        MessageRegistry::register_message::<LinkEvent>(&mut world);
        world.add_schedule(configure_signal_schedule());

        Ok(Self { world, config })
    }

    /// Run one tick at `now`: advance roles, propagate signals, expire stale
    /// links, and deliver the resulting events.
    ///
    /// # Panics
    ///
    /// If `now` is earlier than the previous tick.
    pub fn tick(&mut self, now: SimTime) {
        self.world.resource_mut::<SimClock>().set(now);
        self.world.run_schedule(SignalTick);
    }

    /// Tick one configured interval after the current clock time.
    pub fn step(&mut self) -> SimTime {
        let next = self.world.resource::<SimClock>().next_step();
        self.tick(next);
        next
    }

    pub fn now(&self) -> SimTime {
        self.world.resource::<SimClock>().time
    }

    pub fn tick_count(&self) -> u64 {
        self.world.resource::<SimClock>().tick_count
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn agent(&self, id: &AgentId) -> Option<&SpatialAgent> {
        let entity = self.world.resource::<AgentIndex>().get(id)?;
        self.world.get::<SpatialAgent>(entity)
    }

    /// All agents in construction order.
    pub fn agents(&self) -> Vec<&SpatialAgent> {
        self.world
            .resource::<AgentIndex>()
            .entities()
            .iter()
            .filter_map(|&entity| self.world.get::<SpatialAgent>(entity))
            .collect()
    }

    /// Live links as seen by the agents themselves (receiver -> emitter).
    pub fn connections(&self) -> BTreeMap<AgentId, AgentId> {
        self.agents()
            .into_iter()
            .filter_map(|agent| Some((agent.id().clone(), agent.connected_to()?.clone())))
            .collect()
    }

    /// Move an agent. Returns false for an unknown id.
    pub fn set_position(&mut self, id: &AgentId, position: Position) -> bool {
        let Some(entity) = self.world.resource::<AgentIndex>().get(id) else {
            return false;
        };
        match self.world.get_mut::<SpatialAgent>(entity) {
            Some(mut agent) => {
                agent.set_position(position);
                true
            }
            None => false,
        }
    }
}

fn validate_agents(agents: &[AgentSpec]) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for spec in agents {
        if spec.id.is_empty() {
            return Err(ConfigError::EmptyAgentId);
        }
        if !seen.insert(&spec.id) {
            return Err(ConfigError::DuplicateAgentId(spec.id.clone()));
        }
        if spec.role_period.is_some_and(|p| p.is_zero()) {
            return Err(ConfigError::ZeroRolePeriod(spec.id.clone()));
        }
    }
    Ok(())
}
