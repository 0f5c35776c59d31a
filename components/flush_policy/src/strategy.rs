// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

use slog_global::debug;

use crate::{
    clock::{Clock, SystemClock},
    config::PolicyConfig,
    error::Result,
    metrics,
    selector,
    stats::{FlushContext, TlsStatsMap},
};

/// The flush policy core: a pure, deterministic function over target
/// statistics. `FlushStrategy` holds only immutable configuration and a
/// clock, so once constructed it is safely shareable by multiple
/// concurrent callers (spec §5) — it never locks, and never retains the
/// `candidates`/`tls_stats` passed to `select` past that call.
pub struct FlushStrategy<C: Clock = SystemClock> {
    config: PolicyConfig,
    clock: C,
}

impl FlushStrategy<SystemClock> {
    /// Builds a strategy backed by the system wall clock. Rejects an
    /// out-of-range config immediately, per spec §7.
    pub fn new(config: PolicyConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> FlushStrategy<C> {
    pub fn with_clock(config: PolicyConfig, clock: C) -> Result<Self> {
        Ok(FlushStrategy {
            config: config.validate()?,
            clock,
        })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Given the current candidate set and TLS statistics, returns the
    /// targets that should be flushed, in priority order. Returns an empty
    /// list if no trigger condition holds. `now` is `config.start` when
    /// present, otherwise the injected clock's current time.
    pub fn select<'a>(
        &self,
        candidates: &[FlushContext<'a>],
        tls_stats: &TlsStatsMap,
    ) -> Vec<FlushContext<'a>> {
        let now = self.config.start.unwrap_or_else(|| self.clock.now_millis());
        let timer = metrics::FLUSH_SELECT_DURATION.start_timer();
        let (ranked, order_type) = selector::select(candidates, tls_stats, now, &self.config);
        timer.observe_duration();

        let label = order_type.map(|o| o.label()).unwrap_or("none");
        metrics::FLUSH_SELECT_TOTAL.with_label_values(&[label]).inc();
        if !ranked.is_empty() {
            metrics::FLUSH_SELECTED_TARGETS.inc_by(ranked.len() as u64);
            debug!("flush policy selected targets"; "order_type" => label, "count" => ranked.len());
        }
        ranked
    }
}
