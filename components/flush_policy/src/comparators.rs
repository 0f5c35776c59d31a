// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

//! Priority comparators: one strictly-ordered comparator per order-type,
//! plus the TLS-size sub-order used when MEMORY triggers solely through
//! the aggregate TLS-size branch. Each comparator is a plain value handed
//! once to a stable sort, never a trait object re-dispatched per
//! comparison (spec §9).

use std::cmp::Ordering;

use crate::stats::{FlushContext, TlsStatsMap};

/// A comparator imposes a descending priority: the "most deserving" target
/// sorts first. Every variant falls back to ascending name order on ties,
/// which is what makes the overall sort a strict total order.
#[derive(Clone, Copy)]
pub enum Comparator<'a> {
    Urgent,
    MaxAge { now: u64 },
    DiskBloat,
    Memory,
    TlsSize { tls_stats: &'a TlsStatsMap },
}

impl<'a> Comparator<'a> {
    pub fn compare(&self, a: &FlushContext<'_>, b: &FlushContext<'_>) -> Ordering {
        let primary = match *self {
            Comparator::Urgent => b.target.urgent.cmp(&a.target.urgent),
            Comparator::MaxAge { now } => b
                .target
                .age_millis(now)
                .cmp(&a.target.age_millis(now)),
            Comparator::DiskBloat => b
                .target
                .disk_gain
                .clamped_gain()
                .cmp(&a.target.disk_gain.clamped_gain()),
            Comparator::Memory => b
                .target
                .memory_gain
                .clamped_gain()
                .cmp(&a.target.memory_gain.clamped_gain()),
            Comparator::TlsSize { tls_stats } => {
                let tls_a = tls_stats.get_or_default(&a.handler.name);
                let tls_b = tls_stats.get_or_default(&b.handler.name);
                b.tls_gap(&tls_b).cmp(&a.tls_gap(&tls_a))
            }
        };
        primary.then_with(|| a.name().cmp(b.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{DiskGain, FlushHandler, FlushTarget, MemoryGain, TlsStats};

    fn target(name: &str) -> FlushTarget {
        FlushTarget::new(name)
    }

    #[test]
    fn memory_comparator_orders_descending_then_by_name() {
        let h = FlushHandler::new("h1");
        let t_low = target("a").with_memory_gain(MemoryGain::new(10, 5));
        let t_high = target("b").with_memory_gain(MemoryGain::new(10, 0));
        let ctx_low = FlushContext::new(&h, &t_low, 0);
        let ctx_high = FlushContext::new(&h, &t_high, 0);
        assert_eq!(
            Comparator::Memory.compare(&ctx_high, &ctx_low),
            Ordering::Less
        );
    }

    #[test]
    fn ties_break_on_name_ascending() {
        let h = FlushHandler::new("h1");
        let t1 = target("t1");
        let t2 = target("t2");
        let c1 = FlushContext::new(&h, &t1, 0);
        let c2 = FlushContext::new(&h, &t2, 0);
        assert_eq!(Comparator::Memory.compare(&c1, &c2), Ordering::Less);
        assert_eq!(Comparator::Memory.compare(&c2, &c1), Ordering::Greater);
    }

    #[test]
    fn tls_size_ranks_by_unreplayed_gap() {
        let h1 = FlushHandler::new("h1");
        let t1 = target("t1").with_flushed_serial(1900);
        let t2 = target("t2").with_flushed_serial(1000);
        let mut tls = TlsStatsMap::new();
        tls.insert("h1", TlsStats::new(0, 0, 2000));
        let cmp = Comparator::TlsSize { tls_stats: &tls };
        let c1 = FlushContext::new(&h1, &t1, 2000);
        let c2 = FlushContext::new(&h1, &t2, 2000);
        // t2's gap (1000) is larger than t1's gap (100), so t2 ranks first.
        assert_eq!(cmp.compare(&c2, &c1), Ordering::Less);
    }

    #[test]
    fn diskbloat_uses_absolute_bytes_not_ratio() {
        let h = FlushHandler::new("h1");
        let small_disk_big_gain = target("a").with_disk_gain(DiskGain::new(200, 50));
        let big_disk_small_gain = target("b").with_disk_gain(DiskGain::new(1_000_000, 999_900));
        let c1 = FlushContext::new(&h, &small_disk_big_gain, 0);
        let c2 = FlushContext::new(&h, &big_disk_small_gain, 0);
        assert_eq!(
            Comparator::DiskBloat.compare(&c1, &c2),
            Ordering::Less
        );
    }
}
