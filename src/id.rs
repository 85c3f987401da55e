use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable, immutable identifier of a spatial agent.
///
/// String-backed so callers can use labels (`"A"`, `"relay-3"`) or numbers.
/// Ordering is lexicographic and only used for deterministic map iteration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AgentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for AgentId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Monotonic generator for numeric agent ids.
/// Every id it hands out is unique within one generator.
#[derive(Debug)]
pub struct AgentIdGenerator {
    next: u64,
}

impl AgentIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_from(start: u64) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> AgentId {
        let id = self.next;
        self.next += 1;
        AgentId::from(id)
    }
}

impl Default for AgentIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
