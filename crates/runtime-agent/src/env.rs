// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the runtime agent binary (§6).

use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for environment variable {0}: {1}")]
    Invalid(&'static str, String),
}

fn required(name: &'static str) -> Result<String, EnvError> {
    std::env::var(name).map_err(|_| EnvError::Missing(name))
}

/// TCP address the HTTP surface (`/ping`, `/user-app/*`, the duplex stream)
/// binds to. Default `0.0.0.0:8080`.
pub fn http_bind_addr() -> Result<SocketAddr, EnvError> {
    let raw = std::env::var("HATCH_AGENT_HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    raw.parse().map_err(|_| EnvError::Invalid("HATCH_AGENT_HTTP_ADDR", raw))
}

/// TCP address the `FetchContent` RPC surface binds to. Default port 50051
/// per §6.
pub fn rpc_bind_addr() -> Result<SocketAddr, EnvError> {
    let raw = std::env::var("HATCH_AGENT_RPC_ADDR").unwrap_or_else(|_| "0.0.0.0:50051".to_string());
    raw.parse().map_err(|_| EnvError::Invalid("HATCH_AGENT_RPC_ADDR", raw))
}

/// Root every Filesystem Operator path resolves relative to (§4.7).
pub fn workspace_root() -> std::path::PathBuf {
    std::env::var("HATCH_WORKSPACE_ROOT").map(std::path::PathBuf::from).unwrap_or_else(|_| "/workspaces".into())
}

/// Inactivity period before the shutdown manager fires its reclaim callback
/// (§4.10). Default 4 minutes.
pub fn inactivity_period() -> Duration {
    std::env::var("HATCH_INACTIVITY_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(4 * 60))
}

/// Base URL of the Control Plane's `/api/runner` callback (§4.10, §6).
pub fn runner_callback_url() -> Result<String, EnvError> {
    required("HATCH_CONTROL_PLANE_URL")
}

/// Local port the user's in-workspace HTTP server listens on, reverse-proxied
/// at `/user-app/*`. Default 3000.
pub fn user_app_port() -> u16 {
    std::env::var("HATCH_USER_APP_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(3000)
}

/// The workspace id this agent instance is serving.
///
/// `REPL_ID` is authoritative when set. Otherwise the id is derived from the
/// first label of the request `Host` header at call sites that have one
/// (`<workspaceId>.<base_domain>`); this function only covers the
/// environment-variable path, since the header fallback needs a live
/// request and can't be resolved at startup.
pub fn repl_id_from_env() -> Option<String> {
    std::env::var("REPL_ID").ok().filter(|s| !s.is_empty())
}

/// Derives a workspace id from a request `Host` header when `REPL_ID` isn't
/// set, by taking the label before the first `.`. Logs which source won.
pub fn resolve_workspace_id(host_header: Option<&str>) -> Option<String> {
    if let Some(id) = repl_id_from_env() {
        tracing::debug!(workspace_id = %id, source = "REPL_ID", "resolved workspace id");
        return Some(id);
    }
    let id = host_header?.split('.').next()?.to_string();
    if id.is_empty() {
        return None;
    }
    tracing::debug!(workspace_id = %id, source = "host_header", "resolved workspace id");
    Some(id)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
