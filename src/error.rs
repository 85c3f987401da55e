use thiserror::Error;

use crate::id::AgentId;

/// Rejected simulation setup. Raised by construction, never at tick time.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("proximity radius must be a positive finite number, got {0}")]
    InvalidRadius(f64),
    #[error("tick interval must be positive")]
    ZeroTickInterval,
    #[error("disconnect timeout must be positive")]
    ZeroDisconnectTimeout,
    #[error("role period range {min_ms}..={max_ms}ms is empty or starts at zero")]
    InvalidRolePeriodRange { min_ms: u64, max_ms: u64 },
    #[error("agent {0} has a zero role period")]
    ZeroRolePeriod(AgentId),
    #[error("agent id must not be empty")]
    EmptyAgentId,
    #[error("duplicate agent id {0}")]
    DuplicateAgentId(AgentId),
}

/// Misuse of the real-time runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("simulation is already running")]
    AlreadyRunning,
    #[error("tick interval override must be positive")]
    ZeroInterval,
    #[error("tick worker panicked; the simulation state is lost")]
    WorkerPanicked,
}

/// Failure inside an event sink. Logged by the engine, never propagated.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("event serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
