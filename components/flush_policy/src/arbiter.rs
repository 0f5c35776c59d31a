// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

//! Order-type arbiter: chooses the single dominant order-type for a
//! candidate set.
//!
//! Nominal precedence is URGENT > MAXAGE > DISKBLOAT > MEMORY (spec §4.1).
//! Observed behavior (spec §7(b) / §9) promotes MEMORY above DISKBLOAT
//! whenever both fire on the same candidate set: MEMORY is evaluated
//! before DISKBLOAT below, so it wins the "first satisfied" scan whenever
//! both are satisfied, while DISKBLOAT alone (MEMORY not satisfied) still
//! wins on its own. See DESIGN.md for this resolution.

use crate::{
    config::PolicyConfig,
    stats::{FlushContext, TlsStatsMap},
    triggers::{self, OrderType},
};

/// The arbiter's verdict: which order-type dominates, and — for MEMORY —
/// whether it fired solely through the aggregate TLS-size branch, which
/// determines which comparator the selector uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub order_type: OrderType,
    pub memory_via_tls_only: bool,
}

pub fn arbitrate(
    candidates: &[FlushContext<'_>],
    tls_stats: &TlsStatsMap,
    now: u64,
    cfg: &PolicyConfig,
) -> Option<Decision> {
    if candidates.is_empty() {
        return None;
    }
    if triggers::urgent_triggered(candidates) {
        return Some(Decision {
            order_type: OrderType::Urgent,
            memory_via_tls_only: false,
        });
    }
    if triggers::maxage_triggered(candidates, now, cfg) {
        return Some(Decision {
            order_type: OrderType::MaxAge,
            memory_via_tls_only: false,
        });
    }
    let memory = triggers::memory_triggered(candidates, tls_stats, cfg);
    if memory.triggered {
        return Some(Decision {
            order_type: OrderType::Memory,
            memory_via_tls_only: memory.via_tls_only,
        });
    }
    if triggers::diskbloat_triggered(candidates, cfg) {
        return Some(Decision {
            order_type: OrderType::DiskBloat,
            memory_via_tls_only: false,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{DiskGain, FlushHandler, FlushTarget, MemoryGain};

    #[test]
    fn urgent_dominates_everything_else() {
        let cfg = PolicyConfig::default();
        let h = FlushHandler::new("h1");
        let urgent = FlushTarget::new("t1").with_urgent(true);
        let huge_mem = FlushTarget::new("t2")
            .with_memory_gain(MemoryGain::new(u64::MAX, 0));
        let candidates = vec![
            FlushContext::new(&h, &urgent, 0),
            FlushContext::new(&h, &huge_mem, 0),
        ];
        let tls = TlsStatsMap::new();
        let decision = arbitrate(&candidates, &tls, 0, &cfg).unwrap();
        assert_eq!(decision.order_type, OrderType::Urgent);
    }

    #[test]
    fn memory_wins_over_diskbloat_when_both_fire() {
        let cfg = PolicyConfig {
            max_memory_gain: 10,
            disk_bloat_factor: 0.1,
            ..PolicyConfig::default()
        };
        let h = FlushHandler::new("h1");
        let mem_target = FlushTarget::new("t1")
            .with_memory_gain(MemoryGain::new(100, 0))
            .with_last_flush_time(1);
        let disk_target = FlushTarget::new("t2")
            .with_disk_gain(DiskGain::new(1_000_000_000, 0))
            .with_last_flush_time(1);
        let candidates = vec![
            FlushContext::new(&h, &mem_target, 0),
            FlushContext::new(&h, &disk_target, 0),
        ];
        let tls = TlsStatsMap::new();
        let decision = arbitrate(&candidates, &tls, 0, &cfg).unwrap();
        assert_eq!(decision.order_type, OrderType::Memory);
    }

    #[test]
    fn diskbloat_wins_alone_when_memory_does_not_fire() {
        let cfg = PolicyConfig {
            disk_bloat_factor: 0.1,
            ..PolicyConfig::default()
        };
        let h = FlushHandler::new("h1");
        let disk_target = FlushTarget::new("t1")
            .with_disk_gain(DiskGain::new(1_000_000_000, 0))
            .with_last_flush_time(1);
        let candidates = vec![FlushContext::new(&h, &disk_target, 0)];
        let tls = TlsStatsMap::new();
        let decision = arbitrate(&candidates, &tls, 0, &cfg).unwrap();
        assert_eq!(decision.order_type, OrderType::DiskBloat);
    }

    #[test]
    fn no_trigger_yields_none() {
        let cfg = PolicyConfig::default();
        let h = FlushHandler::new("h1");
        let t = FlushTarget::new("t1").with_last_flush_time(1);
        let candidates = vec![FlushContext::new(&h, &t, 0)];
        let tls = TlsStatsMap::new();
        assert!(arbitrate(&candidates, &tls, 0, &cfg).is_none());
    }
}
