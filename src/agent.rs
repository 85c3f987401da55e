//! Per-agent state machine: role cadence crossed with connection tracking.
//!
//! Role and connection are orthogonal. The role flips on a fixed per-agent
//! period; the connection is driven only by signals delivered while
//! Receiving and lapses when its keep-alive deadline passes.

use std::time::Duration;

use bevy_ecs::component::Component;
use serde::{Deserialize, Serialize};

use crate::config::HandoverPolicy;
use crate::ecs::events::LinkEvent;
use crate::ecs::time::SimTime;
use crate::id::AgentId;
use crate::proximity::Position;

/// What an agent is doing this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Emitting,
    Receiving,
}

impl Role {
    pub fn flipped(self) -> Self {
        match self {
            Role::Emitting => Role::Receiving,
            Role::Receiving => Role::Emitting,
        }
    }
}

/// A live inbound connection episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub emitter: AgentId,
    /// When the episode began.
    pub since: SimTime,
    /// The episode lapses once the clock reaches this time without a refresh.
    pub deadline: SimTime,
}

/// How an agent should be created.
///
/// The role period is drawn from the configured range unless pinned with
/// [`AgentSpec::with_role_period`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: AgentId,
    pub position: Position,
    pub role: Role,
    pub role_period: Option<Duration>,
}

impl AgentSpec {
    pub fn new(id: impl Into<AgentId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            position: Position::new(x, y),
            role: Role::Emitting,
            role_period: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_role_period(mut self, period: Duration) -> Self {
        self.role_period = Some(period);
        self
    }
}

/// A spatial agent alternating between emitting and receiving.
#[derive(Component, Debug, Clone, PartialEq, Serialize)]
pub struct SpatialAgent {
    id: AgentId,
    position: Position,
    role: Role,
    role_period: Duration,
    last_role_switch: SimTime,
    connection: Option<Connection>,
}

impl SpatialAgent {
    pub fn new(id: AgentId, position: Position, role: Role, role_period: Duration) -> Self {
        Self::with_last_switch(id, position, role, role_period, SimTime::ZERO)
    }

    pub fn with_last_switch(
        id: AgentId,
        position: Position,
        role: Role,
        role_period: Duration,
        last_role_switch: SimTime,
    ) -> Self {
        Self {
            id,
            position,
            role,
            role_period,
            last_role_switch,
            connection: None,
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn role_period(&self) -> Duration {
        self.role_period
    }

    pub fn last_role_switch(&self) -> SimTime {
        self.last_role_switch
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn connected_to(&self) -> Option<&AgentId> {
        self.connection.as_ref().map(|c| &c.emitter)
    }

    pub fn disconnect_deadline(&self) -> Option<SimTime> {
        self.connection.as_ref().map(|c| c.deadline)
    }

    /// Flip the role once a full period has elapsed since the last flip.
    ///
    /// Returns true if the role changed. Repeated calls within one period are
    /// no-ops because the flip resets `last_role_switch` to `now`.
    pub fn advance_role(&mut self, now: SimTime) -> bool {
        if now.saturating_since(self.last_role_switch) < self.role_period {
            return false;
        }
        self.role = self.role.flipped();
        self.last_role_switch = now;
        true
    }

    /// React to a signal from `emitter` at `now`.
    ///
    /// Opens an episode (and reports `Connected`) if none is live, otherwise
    /// pushes the deadline out to `now + timeout`. A signal from a different
    /// emitter is resolved by `handover`.
    ///
    /// Callers must first close a lapsed episode with [`Self::lapse_stale_link`].
    ///
    /// # Panics
    ///
    /// If this agent is not Receiving, `emitter` is this agent, or the live
    /// episode's deadline is already behind `now`.
    pub fn on_signal_received(
        &mut self,
        emitter: &AgentId,
        now: SimTime,
        timeout: Duration,
        handover: HandoverPolicy,
    ) -> Option<LinkEvent> {
        assert_eq!(
            self.role,
            Role::Receiving,
            "agent {} received a signal while emitting",
            self.id
        );
        assert_ne!(&self.id, emitter, "agent {} signalled itself", self.id);
        assert!(
            !self.disconnect_deadline().is_some_and(|d| d < now),
            "agent {} signalled after its link lapsed",
            self.id
        );

        let deadline = now + timeout;
        match self.connection.as_mut() {
            None => {
                self.connection = Some(Connection {
                    emitter: emitter.clone(),
                    since: now,
                    deadline,
                });
                tracing::debug!(receiver = %self.id, emitter = %emitter, now = now.as_millis(), "connected");
                Some(LinkEvent::Connected {
                    receiver: self.id.clone(),
                    emitter: emitter.clone(),
                    at: now,
                })
            }
            Some(conn) if conn.emitter == *emitter || handover == HandoverPolicy::Retain => {
                conn.deadline = deadline;
                None
            }
            Some(conn) => {
                tracing::debug!(
                    receiver = %self.id,
                    from = %conn.emitter,
                    to = %emitter,
                    now = now.as_millis(),
                    "connection handed over"
                );
                conn.emitter = emitter.clone();
                conn.deadline = deadline;
                Some(LinkEvent::Connected {
                    receiver: self.id.clone(),
                    emitter: emitter.clone(),
                    at: now,
                })
            }
        }
    }

    /// Close an episode whose deadline fell strictly before `now`.
    ///
    /// A deadline can pass between two ticks. A signal arriving on the later
    /// tick starts a new episode instead of stretching the dead one.
    pub fn lapse_stale_link(&mut self, now: SimTime) -> Option<LinkEvent> {
        if !self.disconnect_deadline().is_some_and(|d| d < now) {
            return None;
        }
        self.expire_link(now)
    }

    /// Close the episode if its deadline has been reached.
    pub fn expire_link(&mut self, now: SimTime) -> Option<LinkEvent> {
        let deadline = self.disconnect_deadline()?;
        if now < deadline {
            return None;
        }
        self.connection = None;
        tracing::debug!(receiver = %self.id, now = now.as_millis(), "disconnected");
        Some(LinkEvent::Disconnected {
            receiver: self.id.clone(),
            at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(1000);

    fn receiver(id: &str) -> SpatialAgent {
        SpatialAgent::new(
            AgentId::from(id),
            Position::default(),
            Role::Receiving,
            Duration::from_secs(3600),
        )
    }

    fn at(ms: u64) -> SimTime {
        SimTime::from_millis(ms)
    }

    #[test]
    fn role_flips_exactly_at_period() {
        let t0 = at(200);
        let mut agent = SpatialAgent::with_last_switch(
            AgentId::from("A"),
            Position::default(),
            Role::Emitting,
            Duration::from_millis(700),
            t0,
        );

        assert!(!agent.advance_role(at(200)));
        assert!(!agent.advance_role(at(899)));
        assert_eq!(agent.role(), Role::Emitting);

        assert!(agent.advance_role(at(900)));
        assert_eq!(agent.role(), Role::Receiving);
        assert_eq!(agent.last_role_switch(), at(900));
    }

    #[test]
    fn role_flip_is_idempotent_within_a_period() {
        let mut agent = SpatialAgent::new(
            AgentId::from("A"),
            Position::default(),
            Role::Emitting,
            Duration::from_millis(500),
        );
        assert!(agent.advance_role(at(750)));
        assert!(!agent.advance_role(at(750)));
        assert!(!agent.advance_role(at(1249)));
        assert_eq!(agent.role(), Role::Receiving);
        assert!(agent.advance_role(at(1250)));
        assert_eq!(agent.role(), Role::Emitting);
    }

    #[test]
    fn first_signal_connects_and_sets_deadline() {
        let mut b = receiver("B");
        let event = b.on_signal_received(&AgentId::from("A"), at(100), TIMEOUT, HandoverPolicy::Retain);

        assert_eq!(
            event,
            Some(LinkEvent::Connected {
                receiver: AgentId::from("B"),
                emitter: AgentId::from("A"),
                at: at(100),
            })
        );
        assert!(b.is_connected());
        assert_eq!(b.connected_to(), Some(&AgentId::from("A")));
        assert_eq!(b.disconnect_deadline(), Some(at(1100)));
    }

    #[test]
    fn repeat_signal_refreshes_without_event() {
        let mut b = receiver("B");
        let a = AgentId::from("A");
        b.on_signal_received(&a, at(100), TIMEOUT, HandoverPolicy::Retain);

        for now in [200, 300, 400] {
            assert_eq!(b.on_signal_received(&a, at(now), TIMEOUT, HandoverPolicy::Retain), None);
            assert_eq!(b.disconnect_deadline(), Some(at(now + 1000)));
        }
        assert_eq!(b.connection().map(|c| c.since), Some(at(100)));
    }

    #[test]
    fn retain_keeps_original_emitter() {
        let mut r = receiver("R");
        r.on_signal_received(&AgentId::from("E1"), at(0), TIMEOUT, HandoverPolicy::Retain);
        let event = r.on_signal_received(&AgentId::from("E2"), at(400), TIMEOUT, HandoverPolicy::Retain);

        assert_eq!(event, None);
        assert_eq!(r.connected_to(), Some(&AgentId::from("E1")));
        assert_eq!(r.disconnect_deadline(), Some(at(1400)));
    }

    #[test]
    fn adopt_switches_emitter_and_announces_it() {
        let mut r = receiver("R");
        r.on_signal_received(&AgentId::from("E1"), at(0), TIMEOUT, HandoverPolicy::Adopt);
        let event = r.on_signal_received(&AgentId::from("E2"), at(400), TIMEOUT, HandoverPolicy::Adopt);

        assert_eq!(
            event,
            Some(LinkEvent::Connected {
                receiver: AgentId::from("R"),
                emitter: AgentId::from("E2"),
                at: at(400),
            })
        );
        assert_eq!(r.connected_to(), Some(&AgentId::from("E2")));
        // Same emitter again is a plain refresh.
        assert_eq!(
            r.on_signal_received(&AgentId::from("E2"), at(500), TIMEOUT, HandoverPolicy::Adopt),
            None
        );
    }

    #[test]
    fn expiry_waits_for_deadline() {
        let mut b = receiver("B");
        b.on_signal_received(&AgentId::from("A"), at(100), TIMEOUT, HandoverPolicy::Retain);

        assert_eq!(b.expire_link(at(1099)), None);
        assert!(b.is_connected());

        assert_eq!(
            b.expire_link(at(1100)),
            Some(LinkEvent::Disconnected {
                receiver: AgentId::from("B"),
                at: at(1100),
            })
        );
        assert!(!b.is_connected());
        assert_eq!(b.disconnect_deadline(), None);
        // Exactly once.
        assert_eq!(b.expire_link(at(5000)), None);
    }

    #[test]
    fn late_signal_reports_lapse_then_reconnects() {
        let mut r = receiver("R");
        let e = AgentId::from("E");
        r.on_signal_received(&e, at(100), TIMEOUT, HandoverPolicy::Retain);

        // Deadline 1100 passed between ticks; the next tick lands at 1150.
        assert_eq!(r.lapse_stale_link(at(1100)), None);
        assert_eq!(
            r.lapse_stale_link(at(1150)),
            Some(LinkEvent::Disconnected {
                receiver: AgentId::from("R"),
                at: at(1150),
            })
        );
        assert_eq!(
            r.on_signal_received(&e, at(1150), TIMEOUT, HandoverPolicy::Retain),
            Some(LinkEvent::Connected {
                receiver: AgentId::from("R"),
                emitter: e.clone(),
                at: at(1150),
            })
        );
        assert_eq!(r.connection().map(|c| c.since), Some(at(1150)));
        assert_eq!(r.disconnect_deadline(), Some(at(2150)));
    }

    #[test]
    #[should_panic(expected = "signalled after its link lapsed")]
    fn signal_into_lapsed_link_panics() {
        let mut r = receiver("R");
        let e = AgentId::from("E");
        r.on_signal_received(&e, at(100), TIMEOUT, HandoverPolicy::Retain);
        r.on_signal_received(&e, at(1150), TIMEOUT, HandoverPolicy::Retain);
    }

    #[test]
    fn unconnected_agent_never_expires() {
        let mut b = receiver("B");
        assert_eq!(b.expire_link(at(10_000)), None);
    }

    #[test]
    fn emitting_agent_reports_not_connected() {
        let a = SpatialAgent::new(
            AgentId::from("A"),
            Position::default(),
            Role::Emitting,
            Duration::from_millis(500),
        );
        assert!(!a.is_connected());
        assert_eq!(a.connected_to(), None);
    }

    #[test]
    #[should_panic(expected = "received a signal while emitting")]
    fn signal_to_emitter_panics() {
        let mut a = SpatialAgent::new(
            AgentId::from("A"),
            Position::default(),
            Role::Emitting,
            Duration::from_millis(500),
        );
        a.on_signal_received(&AgentId::from("B"), at(0), TIMEOUT, HandoverPolicy::Retain);
    }

    #[test]
    #[should_panic(expected = "signalled itself")]
    fn self_signal_panics() {
        let mut b = receiver("B");
        b.on_signal_received(&AgentId::from("B"), at(0), TIMEOUT, HandoverPolicy::Retain);
    }

    #[test]
    fn spec_builder_defaults_to_emitting() {
        let spec = AgentSpec::new("A", 1.0, 2.0);
        assert_eq!(spec.role, Role::Emitting);
        assert_eq!(spec.position, Position::new(1.0, 2.0));
        assert_eq!(spec.role_period, None);

        let pinned = spec
            .with_role(Role::Receiving)
            .with_role_period(Duration::from_millis(800));
        assert_eq!(pinned.role, Role::Receiving);
        assert_eq!(pinned.role_period, Some(Duration::from_millis(800)));
    }
}
