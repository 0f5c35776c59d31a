// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

//! Trigger evaluators: independent predicates, one per order-type, each
//! classifying whether a candidate set warrants flushing under that
//! signal. Each evaluator only reads; none of them mutate or rank.

use std::collections::HashSet;

use crate::{
    config::{PolicyConfig, MIN_DISK_FLOOR},
    stats::{Age, FlushContext, TlsStatsMap},
};

/// The dominant signal the arbiter can choose, in precedence order as
/// listed in spec §4.1. The *effective* precedence applied by the arbiter
/// promotes MEMORY above DISKBLOAT when both fire simultaneously; see
/// `arbiter::arbitrate` and DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Urgent,
    MaxAge,
    DiskBloat,
    Memory,
}

impl OrderType {
    pub fn label(self) -> &'static str {
        match self {
            OrderType::Urgent => "urgent",
            OrderType::MaxAge => "maxage",
            OrderType::DiskBloat => "diskbloat",
            OrderType::Memory => "memory",
        }
    }
}

/// Any candidate flagged urgent.
pub fn urgent_triggered(candidates: &[FlushContext<'_>]) -> bool {
    candidates.iter().any(|c| c.target.urgent)
}

/// At least one candidate's age meets or exceeds `max_time_gain`.
pub fn maxage_triggered(candidates: &[FlushContext<'_>], now: u64, cfg: &PolicyConfig) -> bool {
    let threshold = cfg.max_time_gain_millis();
    candidates.iter().any(|c| match c.target.age_millis(now) {
        Age::Never => true,
        Age::Millis(m) => m >= threshold,
    })
}

/// Per-target disk bloat: `gain / max(before, MIN_DISK_FLOOR) > factor`.
pub fn diskbloat_per_target_triggered(candidates: &[FlushContext<'_>], cfg: &PolicyConfig) -> bool {
    candidates.iter().any(|c| {
        let dg = c.target.disk_gain;
        let floor = dg.before.max(MIN_DISK_FLOOR) as f64;
        (dg.gain() as f64 / floor) > cfg.disk_bloat_factor
    })
}

/// Aggregate disk bloat: `sum(gain) / max(sum(before), N * MIN_DISK_FLOOR) >
/// total_factor`.
pub fn diskbloat_aggregate_triggered(candidates: &[FlushContext<'_>], cfg: &PolicyConfig) -> bool {
    if candidates.is_empty() {
        return false;
    }
    let sum_gain: i64 = candidates.iter().map(|c| c.target.disk_gain.gain()).sum();
    let sum_before: u64 = candidates.iter().map(|c| c.target.disk_gain.before).sum();
    let n = candidates.len() as u64;
    let floor = sum_before.max(n * MIN_DISK_FLOOR) as f64;
    (sum_gain as f64 / floor) > cfg.total_disk_bloat_factor
}

pub fn diskbloat_triggered(candidates: &[FlushContext<'_>], cfg: &PolicyConfig) -> bool {
    diskbloat_per_target_triggered(candidates, cfg) || diskbloat_aggregate_triggered(candidates, cfg)
}

/// The outcome of evaluating the MEMORY trigger, including *which* branch
/// fired — the arbiter needs this to pick the memory-gain comparator versus
/// the TLS-size sub-order (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryTrigger {
    pub triggered: bool,
    /// True only when neither the per-target nor the aggregate memory-gain
    /// branch fired, and the trigger is due solely to aggregate TLS size.
    pub via_tls_only: bool,
}

fn memory_gain_triggered(candidates: &[FlushContext<'_>], cfg: &PolicyConfig) -> bool {
    let per_target = candidates
        .iter()
        .any(|c| c.target.memory_gain.clamped_gain() >= cfg.max_memory_gain);
    if per_target {
        return true;
    }
    let aggregate: i64 = candidates.iter().map(|c| c.target.memory_gain.gain()).sum();
    aggregate >= cfg.global_max_memory as i64
}

/// Aggregate TLS size across every handler referenced by `candidates`,
/// deduplicated by handler name — a handler with several targets counts
/// its TLS bytes once.
pub fn referenced_tls_bytes(candidates: &[FlushContext<'_>], tls_stats: &TlsStatsMap) -> u64 {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|c| seen.insert(c.handler.name.as_str()))
        .map(|c| tls_stats.get_or_default(&c.handler.name).bytes)
        .sum()
}

pub fn memory_triggered(
    candidates: &[FlushContext<'_>],
    tls_stats: &TlsStatsMap,
    cfg: &PolicyConfig,
) -> MemoryTrigger {
    let via_gain = memory_gain_triggered(candidates, cfg);
    let via_tls = referenced_tls_bytes(candidates, tls_stats) > cfg.max_global_tls_size;
    MemoryTrigger {
        triggered: via_gain || via_tls,
        via_tls_only: via_tls && !via_gain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{DiskGain, FlushHandler, FlushTarget, MemoryGain, TlsStats};

    fn ctx<'a>(handler: &'a FlushHandler, target: &'a FlushTarget) -> FlushContext<'a> {
        FlushContext::new(handler, target, 0)
    }

    #[test]
    fn urgent_requires_at_least_one_flag() {
        let h = FlushHandler::new("h1");
        let t1 = FlushTarget::new("t1");
        let t2 = FlushTarget::new("t2").with_urgent(true);
        assert!(!urgent_triggered(&[ctx(&h, &t1)]));
        assert!(urgent_triggered(&[ctx(&h, &t1), ctx(&h, &t2)]));
    }

    #[test]
    fn maxage_respects_threshold() {
        let cfg = PolicyConfig {
            max_time_gain: std::time::Duration::from_secs(2),
            ..PolicyConfig::default()
        };
        let h = FlushHandler::new("h1");
        let fresh = FlushTarget::new("t1").with_last_flush_time(9_000);
        let stale = FlushTarget::new("t2").with_last_flush_time(1_000);
        let now = 10_000;
        assert!(!maxage_triggered(&[ctx(&h, &fresh)], now, &cfg));
        assert!(maxage_triggered(&[ctx(&h, &stale)], now, &cfg));
    }

    #[test]
    fn diskbloat_per_target_uses_floor() {
        let cfg = PolicyConfig {
            disk_bloat_factor: 5.4e-7,
            ..PolicyConfig::default()
        };
        let h = FlushHandler::new("h1");
        // 55 bytes of gain against a disk far below the 100MB floor.
        let t = FlushTarget::new("t1").with_disk_gain(DiskGain::new(1_000, 945));
        assert!(diskbloat_per_target_triggered(&[ctx(&h, &t)], &cfg));
    }

    #[test]
    fn memory_trigger_distinguishes_tls_only_path() {
        let cfg = PolicyConfig {
            max_memory_gain: 1_000_000,
            global_max_memory: 1_000_000,
            max_global_tls_size: 10,
            ..PolicyConfig::default()
        };
        let h = FlushHandler::new("h1");
        let t = FlushTarget::new("t1").with_memory_gain(MemoryGain::new(5, 0));
        let mut tls = TlsStatsMap::new();
        tls.insert("h1", TlsStats::new(20, 0, 100));
        let result = memory_triggered(&[ctx(&h, &t)], &tls, &cfg);
        assert!(result.triggered);
        assert!(result.via_tls_only);
    }
}
