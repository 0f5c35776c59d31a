// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

//! Flush target selection and prioritization for an indexing node.
//!
//! An indexing node keeps in-memory write buffers and transaction logs for
//! one or more document sub-databases ("handlers"). Each handler exposes a
//! set of flush targets, components that can persist some portion of
//! in-memory state to disk. This crate answers, given the current
//! candidate targets and transaction-log statistics: which targets should
//! be flushed, and in what order?
//!
//! The entry point is [`FlushStrategy::select`]. It is a pure, single-
//! threaded, non-suspending computation with no I/O: every call is
//! computed entirely from its inputs, and identical inputs always produce
//! a byte-identical output.

pub mod arbiter;
pub mod clock;
pub mod comparators;
pub mod config;
pub mod error;
pub mod metrics;
pub mod selector;
pub mod stats;
pub mod strategy;
pub mod triggers;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{PolicyConfig, MIN_DISK_FLOOR};
pub use error::{Error, Result};
pub use stats::{
    Age, DiskGain, FlushContext, FlushHandler, FlushTarget, MemoryGain, TlsStats, TlsStatsMap,
};
pub use strategy::FlushStrategy;
pub use triggers::OrderType;
