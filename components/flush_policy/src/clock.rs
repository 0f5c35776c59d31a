// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

//! Time is an input to the policy, never an ambient dependency: every call
//! to `FlushStrategy::select` takes an explicit `now`, either supplied by
//! the caller directly or produced by a `Clock`. Tests pin the clock by
//! implementing it with a fixed value instead of reading the wall clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current time, expressed as milliseconds since the Unix
/// epoch, matching the granularity `last_flush_time` and `now` are compared
/// at throughout the policy.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// The default clock, backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_millis() as u64
    }
}

/// A clock pinned to a fixed instant, used by tests and by
/// `PolicyConfig::start`.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_never_advances() {
        let clock = FixedClock(42);
        assert_eq!(clock.now_millis(), 42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn system_clock_is_monotonic_enough_for_ordering() {
        let clock = SystemClock;
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }
}
