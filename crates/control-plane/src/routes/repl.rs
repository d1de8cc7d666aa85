// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/repl` (§4.5, §6): create, list, activate, deactivate, and delete
//! workspaces on behalf of the authenticated owner.

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use hatch_adapters::{ObjectStorageAdapter, OrchestratorAdapter, SessionStore};
use hatch_core::{Workspace, WorkspaceId};
use hatch_engine::ReadinessProber;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes<Store, Storage, Orch, Prober>() -> Router<AppState<Store, Storage, Orch, Prober>>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    Router::new()
        .route("/api/repl/new", post(create::<Store, Storage, Orch, Prober>))
        .route("/api/repl", get(list::<Store, Storage, Orch, Prober>))
        .route(
            "/api/repl/session/:id",
            get(activate::<Store, Storage, Orch, Prober>).delete(deactivate::<Store, Storage, Orch, Prober>),
        )
        .route("/api/repl/:id", delete(destroy::<Store, Storage, Orch, Prober>))
}

#[derive(Debug, Deserialize)]
struct CreateRequest {
    template: String,
    #[serde(rename = "replName")]
    repl_name: String,
}

async fn create<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    axum::Extension(token): axum::Extension<hatch_core::SessionToken>,
    Json(request): Json<CreateRequest>,
) -> Result<Json<Workspace>, ApiError>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    let workspace = state.workspaces.create(token.login(), &request.repl_name, &request.template).await?;
    Ok(Json(workspace))
}

async fn list<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    axum::Extension(token): axum::Extension<hatch_core::SessionToken>,
) -> Result<Json<Vec<Workspace>>, ApiError>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    let workspaces = state.workspaces.list(token.login()).await?;
    Ok(Json(workspaces))
}

#[derive(Debug, Serialize)]
struct ActivateResponse {
    #[serde(rename = "replId")]
    repl_id: String,
    #[serde(rename = "replName")]
    repl_name: String,
}

async fn activate<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    axum::Extension(token): axum::Extension<hatch_core::SessionToken>,
    Path(id): Path<String>,
) -> Result<Json<ActivateResponse>, ApiError>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    let outcome = state.workspaces.activate(token.login(), &WorkspaceId::from_string(id.clone())).await?;
    Ok(Json(ActivateResponse { repl_id: id, repl_name: outcome.name }))
}

async fn deactivate<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    axum::Extension(token): axum::Extension<hatch_core::SessionToken>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    state.workspaces.deactivate(token.login(), &WorkspaceId::from_string(id)).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn destroy<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    axum::Extension(token): axum::Extension<hatch_core::SessionToken>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    state.workspaces.delete(token.login(), &WorkspaceId::from_string(id)).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "repl_tests.rs"]
mod tests;
