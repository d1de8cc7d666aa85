// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles the full HTTP surface (§6): `/ping`, the public and
//! session-gated halves of the Auth Service, `/api/repl`, and `/api/runner`.

use axum::Router;
use axum::middleware::from_fn_with_state;
use hatch_adapters::{ObjectStorageAdapter, OrchestratorAdapter, SessionStore};
use hatch_engine::ReadinessProber;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::auth::require_session;
use crate::routes::{auth, ping, repl, runner};
use crate::state::AppState;

pub fn build<Store, Storage, Orch, Prober>(state: AppState<Store, Storage, Orch, Prober>) -> Router
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    let auth_state = state.auth_state();

    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(repl::routes())
        .route_layer(from_fn_with_state(auth_state, require_session));

    Router::new()
        .merge(ping::routes())
        .merge(auth::public_routes())
        .merge(protected)
        .merge(runner::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
