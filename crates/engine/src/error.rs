// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps each adapter's error taxonomy onto the shared `CoreError` kinds
//! (§7), tagging `BackendError` with which backend failed so control-plane
//! logs carry enough detail to diagnose.

use hatch_adapters::{ObjectStorageError, OrchestratorError, SessionStoreError};
use hatch_core::{Backend, CoreError};

pub fn from_session_store(err: SessionStoreError) -> CoreError {
    match err {
        SessionStoreError::NotFound => CoreError::NotFound,
        SessionStoreError::Corrupt(detail) => CoreError::Corrupt(detail),
        SessionStoreError::Unreachable(detail) => CoreError::backend(Backend::SessionStore, detail),
    }
}

pub fn from_object_storage(err: ObjectStorageError) -> CoreError {
    match err {
        ObjectStorageError::Transient(detail) => CoreError::Transient(detail),
        ObjectStorageError::Permanent(detail) => CoreError::backend(Backend::Storage, detail),
    }
}

pub fn from_orchestrator(err: OrchestratorError) -> CoreError {
    match err {
        OrchestratorError::Unreachable(detail) => CoreError::backend(Backend::Orchestrator, detail),
        OrchestratorError::ProvisionFailed(detail) => CoreError::backend(Backend::Orchestrator, detail),
        OrchestratorError::DeprovisionFailed(detail) => CoreError::backend(Backend::Orchestrator, detail),
    }
}
