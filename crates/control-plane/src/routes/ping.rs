// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /ping` (§6): health JSON with per-dependency status.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use hatch_adapters::{ObjectStorageAdapter, OrchestratorAdapter, SessionStore};
use hatch_engine::ReadinessProber;

use crate::state::AppState;

pub fn routes<Store, Storage, Orch, Prober>() -> Router<AppState<Store, Storage, Orch, Prober>>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    Router::new().route("/ping", get(ping::<Store, Storage, Orch, Prober>))
}

async fn ping<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
) -> (StatusCode, Json<hatch_engine::HealthReport>)
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    let report = state.workspaces.health().await;
    let status = if report.all_ok() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(report))
}

#[cfg(test)]
#[path = "ping_tests.rs"]
mod tests;
