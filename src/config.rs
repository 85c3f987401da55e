use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What a connected receiver does with a signal from a second emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverPolicy {
    /// Refresh the deadline, keep the original emitter, emit nothing.
    #[default]
    Retain,
    /// Switch to the newer emitter and emit a fresh `Connected`.
    Adopt,
}

/// Simulation configuration. Durations serialize as whole milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Maximum emitter-to-receiver distance, inclusive.
    pub proximity_radius: f64,
    #[serde(rename = "tick_interval_ms", with = "millis")]
    pub tick_interval: Duration,
    /// Keep-alive window after the last received signal.
    #[serde(rename = "disconnect_timeout_ms", with = "millis")]
    pub disconnect_timeout: Duration,
    #[serde(rename = "role_period_min_ms", with = "millis")]
    pub role_period_min: Duration,
    #[serde(rename = "role_period_max_ms", with = "millis")]
    pub role_period_max: Duration,
    /// Seed for drawing per-agent role periods.
    pub seed: u64,
    pub handover: HandoverPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            proximity_radius: 10.0,
            tick_interval: Duration::from_millis(100),
            disconnect_timeout: Duration::from_millis(1000),
            role_period_min: Duration::from_millis(500),
            role_period_max: Duration::from_millis(1500),
            seed: 42,
            handover: HandoverPolicy::Retain,
        }
    }
}

impl SimConfig {
    /// Parse a JSON config; missing keys take their defaults. Not validated.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.proximity_radius = radius;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_handover(mut self, handover: HandoverPolicy) -> Self {
        self.handover = handover;
        self
    }

    /// Role period range in whole milliseconds.
    pub fn role_period_range_ms(&self) -> RangeInclusive<u64> {
        millis::of(self.role_period_min)..=millis::of(self.role_period_max)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = self.proximity_radius;
        if !r.is_finite() || r <= 0.0 {
            return Err(ConfigError::InvalidRadius(r));
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.disconnect_timeout.is_zero() {
            return Err(ConfigError::ZeroDisconnectTimeout);
        }
        let range = self.role_period_range_ms();
        if *range.start() == 0 || range.is_empty() {
            return Err(ConfigError::InvalidRolePeriodRange {
                min_ms: *range.start(),
                max_ms: *range.end(),
            });
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn of(d: Duration) -> u64 {
        crate::ecs::time::duration_millis(d)
    }

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(of(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_radius() {
        for r in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = SimConfig::default().with_radius(r).validate().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidRadius(_)), "radius {r}");
        }
    }

    #[test]
    fn rejects_zero_durations() {
        let cfg = SimConfig::default().with_tick_interval(Duration::ZERO);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTickInterval));

        let cfg = SimConfig {
            disconnect_timeout: Duration::ZERO,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDisconnectTimeout));
    }

    #[test]
    fn rejects_inverted_role_range() {
        let cfg = SimConfig {
            role_period_min: Duration::from_millis(900),
            role_period_max: Duration::from_millis(800),
            ..SimConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidRolePeriodRange {
                min_ms: 900,
                max_ms: 800
            })
        );
    }

    #[test]
    fn json_uses_millisecond_keys_and_defaults() {
        let cfg = SimConfig::from_json_str(
            r#"{"proximity_radius": 25.5, "tick_interval_ms": 50, "handover": "adopt"}"#,
        )
        .unwrap();
        assert_eq!(cfg.proximity_radius, 25.5);
        assert_eq!(cfg.tick_interval, Duration::from_millis(50));
        assert_eq!(cfg.handover, HandoverPolicy::Adopt);
        assert_eq!(cfg.disconnect_timeout, Duration::from_millis(1000));

        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["disconnect_timeout_ms"], 1000);
        assert_eq!(json["role_period_max_ms"], 1500);
    }
}
