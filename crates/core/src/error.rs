// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy.
//!
//! Error handling follows the propagation policy in the design notes: store
//! failures always bubble up, and the only in-process recoveries are the
//! window-create race guard and the scheduler's transient-error retry.

use thiserror::Error;

/// Errors that can occur anywhere below the service boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("store error: {0}")]
    Store(String),

    #[error("project {0} is not active")]
    ProjectNotActive(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("cannot delete running job")]
    CannotDeleteRunningJob,

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("system initializing")]
    Initializing,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Connection-failure catalogue the scheduler retries against (§4.H).
///
/// Matching is substring-based against the lowercased error text, mirroring
/// how the source text-matches driver error strings rather than typed error
/// variants.
pub const TRANSIENT_ERROR_CATALOGUE: &[&str] = &[
    "database is locked",
    "connection refused",
    "broken pipe",
    "bad connection",
    "sql: database is closed",
    "no such host",
    "connection reset",
];

/// True if `message` looks like one of the known transient store failures.
pub fn is_transient_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_ERROR_CATALOGUE.iter().any(|needle| lower.contains(needle))
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
