// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

use lazy_static::lazy_static;
use prometheus::*;

lazy_static! {
    pub static ref FLUSH_SELECT_DURATION: Histogram = register_histogram!(
        "flush_policy_select_duration_seconds",
        "Bucketed histogram of FlushStrategy::select wall time",
        exponential_buckets(1e-6, 2.0, 20).unwrap()
    )
    .unwrap();
    pub static ref FLUSH_SELECT_TOTAL: IntCounterVec = register_int_counter_vec!(
        "flush_policy_select_total",
        "Number of select() calls, by the order-type they resolved to",
        &["order_type"]
    )
    .unwrap();
    pub static ref FLUSH_SELECTED_TARGETS: IntCounter = register_int_counter!(
        "flush_policy_selected_targets_total",
        "Running total of flush targets returned by non-empty selections"
    )
    .unwrap();
}
