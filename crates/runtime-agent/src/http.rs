// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Runtime Agent's HTTP surface (§4.6, §6): `GET /ping`, the `/user-app/*`
//! reverse proxy, and the `/api/v1/repl/ws` duplex stream upgrade.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use hatch_wire::{Emitter, Frame};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::fs::FilesystemOperator;
use crate::inactivity::InactivityManager;
use crate::pty::PtyMultiplexer;
use crate::stream::{build_registry, AgentContext};

#[derive(Clone)]
pub struct AppState {
    pub fs: Arc<FilesystemOperator>,
    pub pty: Arc<PtyMultiplexer>,
    pub inactivity: Arc<InactivityManager>,
    pub http_client: reqwest::Client,
    pub user_app_port: u16,
    /// Resolved lazily from `REPL_ID`, or the first connection's `Host`
    /// header when the orchestrator doesn't inject it (§6). Shared with the
    /// reclaim callback so C10 knows which workspace to end.
    pub workspace_id: Arc<OnceLock<String>>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/user-app/*path", any(proxy_user_app))
        .route("/api/v1/repl/ws", get(ws_upgrade))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn ping() -> &'static str {
    "pong"
}

async fn proxy_user_app(State(state): State<AppState>, Path(path): Path<String>, req: axum::http::Request<Body>) -> Response {
    let query = req.uri().query().map(|q| format!("?{q}")).unwrap_or_default();
    let target = match format!("http://127.0.0.1:{}/{}{}", state.user_app_port, path, query).parse::<Uri>() {
        Ok(uri) => uri,
        Err(_) => return StatusCode::BAD_GATEWAY.into_response(),
    };

    let method = req.method().clone();
    let headers = req.headers().clone();
    let body = match axum::body::to_bytes(req.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::BAD_GATEWAY.into_response(),
    };

    let mut upstream = state.http_client.request(method, target.to_string()).body(body.to_vec());
    for (name, value) in headers.iter() {
        if name == axum::http::header::HOST {
            continue;
        }
        upstream = upstream.header(name, value);
    }

    match upstream.send().await {
        Ok(resp) => {
            let status = resp.status();
            let bytes = resp.bytes().await.unwrap_or_default();
            (status, bytes).into_response()
        }
        Err(_) => StatusCode::BAD_GATEWAY.into_response(),
    }
}

async fn ws_upgrade(State(state): State<AppState>, headers: HeaderMap, ws: WebSocketUpgrade) -> Response {
    if state.workspace_id.get().is_none() {
        let host = headers.get(axum::http::header::HOST).and_then(|v| v.to_str().ok());
        if let Some(id) = crate::env::resolve_workspace_id(host) {
            let _ = state.workspace_id.set(id);
        }
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    state.inactivity.on_connection_established().await;

    let agent_id = rand::random::<u64>();
    let (emitter, mut outbound_rx) = Emitter::channel();
    let ctx = AgentContext {
        agent: agent_id,
        fs: state.fs.clone(),
        pty: state.pty.clone(),
        inactivity: state.inactivity.clone(),
        emitter,
    };
    let registry = build_registry(ctx);

    let (mut sink, mut stream) = socket.split();
    let cancellation = state.inactivity.cancellation();

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let Ok(text) = frame.to_text() else { continue };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            _ = cancellation.cancelled() => break,
            message = stream.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => dispatch_text(&registry, &text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    writer.abort();
    state.inactivity.on_connection_closed().await;
}

fn dispatch_text(registry: &hatch_wire::HandlerRegistry, text: &str) {
    match Frame::from_text(text) {
        Ok(frame) => {
            if !registry.dispatch(&frame.event, frame.data) {
                tracing::warn!(event = %frame.event, "dropping frame with no registered handler");
            }
        }
        Err(err) => tracing::warn!(error = %err, "dropping malformed frame"),
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
