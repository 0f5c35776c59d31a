// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

//! Statistics adapters: thin value types describing what flushing a target
//! would reclaim. The policy is opaque to everything about a target except
//! these fields — a flat record, not a tagged variant, since every real
//! target supplies all four signals and the "unused" ones just carry zero.

use std::collections::HashMap;

/// Heap bytes a target would free by flushing, expressed as a before/after
/// pair rather than a precomputed delta so the reported gain can be
/// inspected without losing the inputs that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryGain {
    pub before: u64,
    pub after: u64,
}

impl MemoryGain {
    pub fn new(before: u64, after: u64) -> Self {
        MemoryGain { before, after }
    }

    /// The raw, possibly-negative gain. Reported as-is: a target whose
    /// memory footprint grew since the last observation is not an error,
    /// just a target that currently contributes nothing to the MEMORY
    /// signal.
    pub fn gain(&self) -> i64 {
        self.before as i64 - self.after as i64
    }

    /// The gain used by comparators and trigger thresholds: negative gains
    /// are treated as zero so a growing target never outranks a shrinking
    /// one, without clamping the value `gain()` reports.
    pub fn clamped_gain(&self) -> u64 {
        self.gain().max(0) as u64
    }
}

/// Disk bytes reclaimable by flushing a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskGain {
    pub before: u64,
    pub after: u64,
}

impl DiskGain {
    pub fn new(before: u64, after: u64) -> Self {
        DiskGain { before, after }
    }

    pub fn gain(&self) -> i64 {
        self.before as i64 - self.after as i64
    }

    pub fn clamped_gain(&self) -> u64 {
        self.gain().max(0) as u64
    }
}

/// A flush target: opaque to the policy aside from the statistics below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushTarget {
    pub name: String,
    pub memory_gain: MemoryGain,
    pub disk_gain: DiskGain,
    pub flushed_serial: u64,
    /// Milliseconds since the Unix epoch; `0` means "never flushed" and
    /// must be treated as infinitely old.
    pub last_flush_time: u64,
    pub urgent: bool,
}

impl FlushTarget {
    pub fn new(name: impl Into<String>) -> Self {
        FlushTarget {
            name: name.into(),
            memory_gain: MemoryGain::default(),
            disk_gain: DiskGain::default(),
            flushed_serial: 0,
            last_flush_time: 0,
            urgent: false,
        }
    }

    pub fn with_memory_gain(mut self, gain: MemoryGain) -> Self {
        self.memory_gain = gain;
        self
    }

    pub fn with_disk_gain(mut self, gain: DiskGain) -> Self {
        self.disk_gain = gain;
        self
    }

    pub fn with_flushed_serial(mut self, serial: u64) -> Self {
        self.flushed_serial = serial;
        self
    }

    pub fn with_last_flush_time(mut self, millis: u64) -> Self {
        self.last_flush_time = millis;
        self
    }

    pub fn with_urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    /// `age = max(0, now - last_flush_time)`; a target that has never been
    /// flushed is infinitely old.
    pub fn age_millis(&self, now: u64) -> Age {
        if self.last_flush_time == 0 {
            Age::Never
        } else {
            Age::Millis(now.saturating_sub(self.last_flush_time))
        }
    }
}

/// The age of a target, with "never flushed" kept distinct from any finite
/// duration so it can rank above all finite ages without picking an
/// arbitrary sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Age {
    Millis(u64),
    Never,
}

/// Owner of a transaction-log stream and a set of flush targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushHandler {
    pub name: String,
}

impl FlushHandler {
    pub fn new(name: impl Into<String>) -> Self {
        FlushHandler { name: name.into() }
    }
}

/// The per-invocation pairing the policy ranks: a target, the handler that
/// owns it, and the last serial visible to that handler at the time the
/// snapshot was taken.
#[derive(Debug, Clone, Copy)]
pub struct FlushContext<'a> {
    pub handler: &'a FlushHandler,
    pub target: &'a FlushTarget,
    pub last_serial: u64,
}

impl<'a> FlushContext<'a> {
    pub fn new(handler: &'a FlushHandler, target: &'a FlushTarget, last_serial: u64) -> Self {
        FlushContext {
            handler,
            target,
            last_serial,
        }
    }

    pub fn name(&self) -> &str {
        &self.target.name
    }

    /// Unreplayed log entries this target's flush would retire:
    /// `tls.last_serial - flushed_serial`, saturating because a target may
    /// be queried before its handler's TLS stats catch up.
    pub fn tls_gap(&self, tls: &TlsStats) -> u64 {
        tls.last_serial.saturating_sub(self.target.flushed_serial)
    }
}

/// Per-handler transaction-log state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TlsStats {
    pub bytes: u64,
    pub first_serial: u64,
    pub last_serial: u64,
}

impl TlsStats {
    pub fn new(bytes: u64, first_serial: u64, last_serial: u64) -> Self {
        TlsStats {
            bytes,
            first_serial,
            last_serial,
        }
    }
}

/// Mapping from handler name to its TLS statistics. Insertion order is
/// irrelevant; keys are unique by construction (`HashMap`).
#[derive(Debug, Clone, Default)]
pub struct TlsStatsMap(HashMap<String, TlsStats>);

impl TlsStatsMap {
    pub fn new() -> Self {
        TlsStatsMap(HashMap::new())
    }

    pub fn insert(&mut self, handler: impl Into<String>, stats: TlsStats) {
        self.0.insert(handler.into(), stats);
    }

    /// A handler absent from the map defaults to `{bytes:0, first_serial:0,
    /// last_serial:0}` rather than signalling an error — the public
    /// `select` contract guarantees this substitution (see spec §6).
    pub fn get_or_default(&self, handler: &str) -> TlsStats {
        self.0.get(handler).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TlsStats)> {
        self.0.iter()
    }
}

impl FromIterator<(String, TlsStats)> for TlsStatsMap {
    fn from_iter<T: IntoIterator<Item = (String, TlsStats)>>(iter: T) -> Self {
        TlsStatsMap(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_is_reported_signed_but_clamped_for_ranking() {
        let g = MemoryGain::new(10, 20);
        assert_eq!(g.gain(), -10);
        assert_eq!(g.clamped_gain(), 0);
    }

    #[test]
    fn never_flushed_is_infinitely_old() {
        let t = FlushTarget::new("t1");
        assert_eq!(t.age_millis(1_000_000), Age::Never);
    }

    #[test]
    fn age_orders_never_above_any_finite_age() {
        assert!(Age::Never > Age::Millis(u64::MAX));
    }

    #[test]
    fn missing_handler_defaults_to_zero_stats() {
        let map = TlsStatsMap::new();
        assert_eq!(map.get_or_default("missing"), TlsStats::default());
    }
}
