// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

//! Selector: assembles the final ranked list once the arbiter has chosen a
//! dominant order-type. The chosen comparator sorts every candidate —
//! nothing is filtered out, since even non-contributing candidates may be
//! consumed opportunistically by the flush engine (spec §4.3); they simply
//! sort to the back because they lose every comparison.

use crate::{
    arbiter::{self, Decision},
    comparators::Comparator,
    config::PolicyConfig,
    stats::{FlushContext, TlsStatsMap},
    triggers::OrderType,
};

fn comparator_for<'a>(decision: Decision, now: u64, tls_stats: &'a TlsStatsMap) -> Comparator<'a> {
    match decision.order_type {
        OrderType::Urgent => Comparator::Urgent,
        OrderType::MaxAge => Comparator::MaxAge { now },
        OrderType::DiskBloat => Comparator::DiskBloat,
        OrderType::Memory if decision.memory_via_tls_only => Comparator::TlsSize { tls_stats },
        OrderType::Memory => Comparator::Memory,
    }
}

/// Runs the full pipeline: evaluate triggers in precedence order, bail out
/// to an empty list if none fired, otherwise sort every candidate by the
/// comparator the chosen order-type implies.
pub fn select<'a>(
    candidates: &[FlushContext<'a>],
    tls_stats: &TlsStatsMap,
    now: u64,
    cfg: &PolicyConfig,
) -> (Vec<FlushContext<'a>>, Option<OrderType>) {
    let decision = match arbiter::arbitrate(candidates, tls_stats, now, cfg) {
        Some(d) => d,
        None => return (Vec::new(), None),
    };
    let comparator = comparator_for(decision, now, tls_stats);
    let mut ranked: Vec<_> = candidates.to_vec();
    ranked.sort_by(|a, b| comparator.compare(a, b));
    (ranked, Some(decision.order_type))
}
