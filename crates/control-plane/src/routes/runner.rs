// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/runner` (§4.5, §6): the Runtime Agent's reclaim callback. Carries no
//! end-user auth — the caller is infrastructure, not a browser session.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::delete;
use hatch_adapters::{ObjectStorageAdapter, OrchestratorAdapter, SessionStore};
use hatch_core::WorkspaceId;
use hatch_engine::ReadinessProber;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes<Store, Storage, Orch, Prober>() -> Router<AppState<Store, Storage, Orch, Prober>>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    Router::new().route("/api/runner/:id", delete(reclaim::<Store, Storage, Orch, Prober>))
}

async fn reclaim<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    state.workspaces.end_session(&WorkspaceId::from_string(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
