// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hatch-agent: the Runtime Agent binary.

use std::sync::{Arc, OnceLock};

use hatch_runtime_agent::fs::FilesystemOperator;
use hatch_runtime_agent::http::{self, AppState};
use hatch_runtime_agent::inactivity::InactivityManager;
use hatch_runtime_agent::pty::PtyMultiplexer;
use hatch_runtime_agent::rpc::ContentServiceImpl;
use hatch_runtime_agent::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging();

    let fs = Arc::new(FilesystemOperator::new(env::workspace_root()));
    let pty = Arc::new(PtyMultiplexer::new());

    let workspace_id: Arc<OnceLock<String>> = Arc::new(OnceLock::new());
    if let Some(id) = env::repl_id_from_env() {
        let _ = workspace_id.set(id);
    }

    let reclaim_client = reqwest::Client::new();
    let reclaim_base = env::runner_callback_url()?;
    let reclaim_workspace_id = workspace_id.clone();
    let inactivity = InactivityManager::new(env::inactivity_period(), move || {
        let client = reclaim_client.clone();
        let base = reclaim_base.clone();
        let workspace_id = reclaim_workspace_id.clone();
        Box::pin(async move {
            let Some(id) = workspace_id.get() else {
                tracing::warn!("inactivity timer fired before a workspace id was resolved, skipping reclaim");
                return;
            };
            let url = format!("{base}/api/runner/{id}");
            match client.delete(&url).send().await {
                Ok(resp) if resp.status().is_success() => tracing::info!(%id, "workspace reclaimed"),
                Ok(resp) => tracing::warn!(%id, status = %resp.status(), "reclaim callback rejected"),
                Err(err) => tracing::warn!(%id, error = %err, "reclaim callback failed"),
            }
        })
    });

    let http_state = AppState {
        fs: fs.clone(),
        pty: pty.clone(),
        inactivity,
        http_client: reqwest::Client::new(),
        user_app_port: env::user_app_port(),
        workspace_id,
    };

    let http_addr = env::http_bind_addr()?;
    let rpc_addr = env::rpc_bind_addr()?;

    let http_listener = tokio::net::TcpListener::bind(http_addr).await?;
    tracing::info!(addr = %http_addr, "hatch-agent http surface listening");
    let http_server = axum::serve(http_listener, http::routes(http_state));

    tracing::info!(addr = %rpc_addr, "hatch-agent rpc surface listening");
    let rpc_server = tonic::transport::Server::builder()
        .add_service(ContentServiceImpl::server(fs))
        .serve(rpc_addr);

    tokio::try_join!(async { http_server.await.map_err(Into::into) }, async { rpc_server.await.map_err(Into::into) })
        .map(|((), ())| ())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}
