// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Minimum disk-size floor used in bloat ratios, so a nearly-empty disk
/// doesn't make a tiny absolute gain look like a huge relative one.
pub const MIN_DISK_FLOOR: u64 = 100_000_000;

/// Tunable thresholds for the flush policy. Every field is required and
/// must be positive; `PolicyConfig::new` (and `FlushStrategy::new`, which
/// calls it) validates this once at construction time, matching the
/// "configuration out of range rejected at policy construction" contract.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Per-target memory trigger threshold, in bytes.
    #[serde(default = "default_max_memory_gain")]
    pub max_memory_gain: u64,
    /// Aggregate memory trigger threshold, in bytes.
    #[serde(default = "default_global_max_memory")]
    pub global_max_memory: u64,
    /// Ratio threshold for aggregate disk bloat.
    #[serde(default = "default_total_disk_bloat_factor")]
    pub total_disk_bloat_factor: f64,
    /// Aggregate per-handler TLS byte threshold.
    #[serde(default = "default_max_global_tls_size")]
    pub max_global_tls_size: u64,
    /// Ratio threshold for per-target disk bloat.
    #[serde(default = "default_disk_bloat_factor")]
    pub disk_bloat_factor: f64,
    /// Age threshold past which a target is considered stale enough to
    /// warrant a MAXAGE flush.
    #[serde(default = "default_max_time_gain", with = "duration_millis")]
    pub max_time_gain: Duration,
    /// Reference "now" for age evaluation, pinned in tests and in
    /// deterministic replays. When absent, the injected `Clock` is used.
    #[serde(default)]
    pub start: Option<u64>,
}

fn default_max_memory_gain() -> u64 {
    512 * 1024 * 1024
}

fn default_global_max_memory() -> u64 {
    2 * 1024 * 1024 * 1024
}

fn default_total_disk_bloat_factor() -> f64 {
    0.4
}

fn default_max_global_tls_size() -> u64 {
    4 * 1024 * 1024 * 1024
}

fn default_disk_bloat_factor() -> f64 {
    0.5
}

fn default_max_time_gain() -> Duration {
    Duration::from_secs(30 * 60)
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            max_memory_gain: default_max_memory_gain(),
            global_max_memory: default_global_max_memory(),
            total_disk_bloat_factor: default_total_disk_bloat_factor(),
            max_global_tls_size: default_max_global_tls_size(),
            disk_bloat_factor: default_disk_bloat_factor(),
            max_time_gain: default_max_time_gain(),
            start: None,
        }
    }
}

impl PolicyConfig {
    /// Validates the config and returns it, or an `Error::InvalidConfig`
    /// naming the offending field. Called once at `FlushStrategy`
    /// construction; never re-validated per `select` call.
    pub fn validate(self) -> Result<Self> {
        check_positive_finite("total_disk_bloat_factor", self.total_disk_bloat_factor)?;
        check_positive_finite("disk_bloat_factor", self.disk_bloat_factor)?;
        if self.max_memory_gain == 0 {
            return Err(Error::InvalidConfig {
                field: "max_memory_gain",
                reason: "must be positive".to_string(),
            });
        }
        if self.global_max_memory == 0 {
            return Err(Error::InvalidConfig {
                field: "global_max_memory",
                reason: "must be positive".to_string(),
            });
        }
        if self.max_global_tls_size == 0 {
            return Err(Error::InvalidConfig {
                field: "max_global_tls_size",
                reason: "must be positive".to_string(),
            });
        }
        if self.max_time_gain.is_zero() {
            return Err(Error::InvalidConfig {
                field: "max_time_gain",
                reason: "must be positive".to_string(),
            });
        }
        Ok(self)
    }

    pub(crate) fn max_time_gain_millis(&self) -> u64 {
        self.max_time_gain.as_millis() as u64
    }
}

fn check_positive_finite(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::InvalidConfig {
            field,
            reason: "must be finite".to_string(),
        });
    }
    if value <= 0.0 {
        return Err(Error::InvalidConfig {
            field,
            reason: "must be positive".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PolicyConfig::default().validate().is_ok());
    }

    #[test]
    fn nan_factor_is_rejected() {
        let mut cfg = PolicyConfig::default();
        cfg.disk_bloat_factor = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let mut cfg = PolicyConfig::default();
        cfg.max_memory_gain = 0;
        assert!(cfg.validate().is_err());
    }
}
