// Copyright 2024 Flush Policy Authors. Licensed under Apache-2.0.

use thiserror::Error;

/// Errors raised by the flush policy core.
///
/// Every variant here is a caller contract violation, not a runtime
/// condition: a policy that finds no trigger simply returns an empty list,
/// it never returns `Err`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("policy config field `{field}` is out of range: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
