// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error-kind taxonomy surfaced by every core component.
//!
//! Every fallible operation in the Control Plane and the Runtime Agent resolves
//! to one of these kinds. HTTP front ends translate a kind to a status code via
//! [`CoreError::status_code`]; the duplex stream front end never lets one of
//! these escape as a transport error (see `hatch-wire`) and instead folds it
//! into a response frame's `error` field.

use thiserror::Error;

/// Which backend a [`CoreError::BackendError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Storage,
    Orchestrator,
    SessionStore,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Backend::Storage => "storage",
            Backend::Orchestrator => "orchestrator",
            Backend::SessionStore => "sessionstore",
        })
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("quota exceeded")]
    QuotaExceeded,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("runtime not ready")]
    NotReady,

    #[error("{backend} backend failed: {detail}")]
    BackendError { backend: Backend, detail: String },

    #[error("transient failure, retry advised: {0}")]
    Transient(String),

    #[error("stream closed")]
    ClosedChannel,

    #[error("backpressure: outbound queue full")]
    Backpressure,

    /// A Session Store record failed its own invariant (e.g. missing owner).
    /// Maps to a `BackendError{sessionstore}` at the HTTP boundary but is kept
    /// distinct internally since it indicates corrupted state rather than a
    /// transport failure.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl CoreError {
    pub fn backend(backend: Backend, detail: impl Into<String>) -> Self {
        CoreError::BackendError { backend, detail: detail.into() }
    }

    /// Standard HTTP status for this error kind (§7).
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::Unauthenticated => 401,
            CoreError::Forbidden => 403,
            CoreError::NotFound => 404,
            CoreError::Conflict(_) => 409,
            CoreError::InvalidInput(_) => 400,
            CoreError::NotReady => 503,
            CoreError::QuotaExceeded
            | CoreError::BackendError { .. }
            | CoreError::Corrupt(_)
            | CoreError::ClosedChannel
            | CoreError::Backpressure => 500,
            CoreError::Transient(_) => 429,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
