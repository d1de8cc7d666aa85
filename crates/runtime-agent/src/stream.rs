// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Event Stream Handler (§4.9): registers the full event catalogue
//! against `hatch-wire`'s `HandlerRegistry`, backed by the Filesystem
//! Operator and PTY Multiplexer for this connection.

use std::sync::Arc;

use hatch_wire::{on_typed, Emitter, HandlerRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fs::{DirEntryInfo, FilesystemOperator, FsError};
use crate::inactivity::InactivityManager;
use crate::pty::{PtyConfig, PtyMultiplexer};

/// Everything one duplex connection's handlers close over. `agent` namespaces
/// the Filesystem Operator's clipboard (§4.7) to this connection.
#[derive(Clone)]
pub struct AgentContext {
    pub agent: u64,
    pub fs: Arc<FilesystemOperator>,
    pub pty: Arc<PtyMultiplexer>,
    pub inactivity: Arc<InactivityManager>,
    pub emitter: Emitter,
}

fn fs_error_string(err: &FsError) -> String {
    err.to_string()
}

pub fn build_registry(ctx: AgentContext) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    registry.register("connection", on_typed({
        let ctx = ctx.clone();
        move |_req: Value| {
            let ctx = ctx.clone();
            async move {
                let root_contents = ctx.fs.fetch_dir(".").await.unwrap_or_default();
                let _ = ctx.emitter.emit("Loaded", LoadedResponse { root_contents });
            }
        }
    }));

    registry.register("fetchDir", on_typed({
        let ctx = ctx.clone();
        move |req: FetchDirRequest| {
            let ctx = ctx.clone();
            async move {
                let response = match ctx.fs.fetch_dir(&req.dir).await {
                    Ok(contents) => FetchDirResponse { success: true, contents: Some(contents), error: None, path: req.dir },
                    Err(err) => FetchDirResponse { success: false, contents: None, error: Some(fs_error_string(&err)), path: req.dir },
                };
                let _ = ctx.emitter.emit("fetchDirResponse", response);
            }
        }
    }));

    registry.register("fetchContent", on_typed({
        let ctx = ctx.clone();
        move |req: PathRequest| {
            let ctx = ctx.clone();
            async move {
                let response = match ctx.fs.fetch_content(&req.path).await {
                    Ok(content) => FetchContentResponse { success: true, content: Some(content), error: None, path: req.path },
                    Err(err) => FetchContentResponse { success: false, content: None, error: Some(fs_error_string(&err)), path: req.path },
                };
                let _ = ctx.emitter.emit("fetchContentResponse", response);
            }
        }
    }));

    registry.register("updateContent", on_typed({
        let ctx = ctx.clone();
        move |req: UpdateContentRequest| {
            let ctx = ctx.clone();
            async move {
                let result = ctx.fs.save_file_diffs(&req.path, &req.patch).await;
                emit_success(&ctx.emitter, "updateContentResponse", result);
            }
        }
    }));

    registry.register("createFile", on_typed({
        let ctx = ctx.clone();
        move |req: PathRequest| {
            let ctx = ctx.clone();
            async move {
                let result = ctx.fs.create_file(&req.path).await;
                emit_path_success(&ctx.emitter, "createFileResponse", req.path, result);
            }
        }
    }));

    registry.register("createFolder", on_typed({
        let ctx = ctx.clone();
        move |req: PathRequest| {
            let ctx = ctx.clone();
            async move {
                let result = ctx.fs.create_folder(&req.path).await;
                emit_path_success(&ctx.emitter, "createFolderResponse", req.path, result);
            }
        }
    }));

    registry.register("delete", on_typed({
        let ctx = ctx.clone();
        move |req: PathRequest| {
            let ctx = ctx.clone();
            async move {
                let result = ctx.fs.delete(&req.path).await;
                emit_path_success(&ctx.emitter, "deleteResponse", req.path, result);
            }
        }
    }));

    registry.register("rename", on_typed({
        let ctx = ctx.clone();
        move |req: RenameRequest| {
            let ctx = ctx.clone();
            async move {
                let result = ctx.fs.rename(&req.old_path, &req.new_path).await;
                emit_success(&ctx.emitter, "renameResponse", result);
            }
        }
    }));

    registry.register("copy", on_typed({
        let ctx = ctx.clone();
        move |req: CopyRequest| {
            let ctx = ctx.clone();
            async move {
                let result = ctx.fs.copy(&req.source_path, &req.target_path).await;
                emit_success(&ctx.emitter, "copyResponse", result);
            }
        }
    }));

    registry.register("cut", on_typed({
        let ctx = ctx.clone();
        move |req: CutRequest| {
            let ctx = ctx.clone();
            async move {
                let result = ctx.fs.cut(ctx.agent, &req.source_path);
                emit_success(&ctx.emitter, "cutResponse", result);
            }
        }
    }));

    registry.register("paste", on_typed({
        let ctx = ctx.clone();
        move |req: PasteRequest| {
            let ctx = ctx.clone();
            async move {
                let result = ctx.fs.paste(ctx.agent, &req.target_path).await;
                emit_success(&ctx.emitter, "pasteResponse", result);
            }
        }
    }));

    registry.register("requestTerminal", on_typed({
        let ctx = ctx.clone();
        move |_req: Value| {
            let ctx = ctx.clone();
            async move { request_terminal(ctx).await }
        }
    }));

    registry.register("terminalInput", on_typed({
        let ctx = ctx.clone();
        move |req: TerminalInputRequest| {
            let ctx = ctx.clone();
            async move {
                if let Some(session) = ctx.pty.get(&req.session_id) {
                    let _ = session.write_input(req.data.as_bytes()).await;
                }
            }
        }
    }));

    registry.register("terminalResize", on_typed({
        let ctx = ctx.clone();
        move |req: TerminalResizeRequest| {
            let ctx = ctx.clone();
            async move {
                if let Some(session) = ctx.pty.get(&req.session_id) {
                    let _ = session.resize(req.cols, req.rows).await;
                }
            }
        }
    }));

    registry.register("closeTerminal", on_typed({
        let ctx = ctx.clone();
        move |req: TerminalIdRequest| {
            let ctx = ctx.clone();
            async move {
                let _ = ctx.pty.remove(&req.session_id).await;
            }
        }
    }));

    registry
}

async fn request_terminal(ctx: AgentContext) {
    let session_id = uuid::Uuid::new_v4().to_string();
    let session = match ctx.pty.create(&session_id, &PtyConfig::default()) {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(error = %err, "failed to create pty session");
            return;
        }
    };

    let emitter = ctx.emitter.clone();
    let data_session_id = session_id.clone();
    session
        .set_on_data(move |bytes| {
            let _ = emitter.emit(
                "terminalResponse",
                TerminalResponse { session_id: data_session_id.clone(), data: String::from_utf8_lossy(&bytes).into_owned() },
            );
        })
        .await;

    let emitter = ctx.emitter.clone();
    let close_session_id = session_id.clone();
    session
        .set_on_close(move || {
            let _ = emitter.emit_empty("terminalClosed");
            tracing::debug!(session_id = %close_session_id, "terminal session closed");
        })
        .await;

    let _ = ctx.emitter.emit("terminalConnected", TerminalConnected { session_id });
}

fn emit_success(emitter: &Emitter, event: &str, result: Result<(), FsError>) {
    let response = match result {
        Ok(()) => SuccessResponse { success: true, error: None },
        Err(err) => SuccessResponse { success: false, error: Some(fs_error_string(&err)) },
    };
    let _ = emitter.emit(event, response);
}

fn emit_path_success(emitter: &Emitter, event: &str, path: String, result: Result<(), FsError>) {
    let response = match result {
        Ok(()) => PathSuccessResponse { success: true, path, error: None },
        Err(err) => PathSuccessResponse { success: false, path, error: Some(fs_error_string(&err)) },
    };
    let _ = emitter.emit(event, response);
}

#[derive(Debug, Serialize)]
struct LoadedResponse {
    #[serde(rename = "rootContents")]
    root_contents: Vec<DirEntryInfo>,
}

#[derive(Debug, Deserialize)]
struct FetchDirRequest {
    dir: String,
}

#[derive(Debug, Serialize)]
struct FetchDirResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    contents: Option<Vec<DirEntryInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    path: String,
}

#[derive(Debug, Deserialize)]
struct PathRequest {
    path: String,
}

#[derive(Debug, Serialize)]
struct FetchContentResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    path: String,
}

#[derive(Debug, Deserialize)]
struct UpdateContentRequest {
    path: String,
    patch: String,
}

#[derive(Debug, Deserialize)]
struct RenameRequest {
    #[serde(rename = "oldPath")]
    old_path: String,
    #[serde(rename = "newPath")]
    new_path: String,
}

#[derive(Debug, Deserialize)]
struct CopyRequest {
    #[serde(rename = "sourcePath")]
    source_path: String,
    #[serde(rename = "targetPath")]
    target_path: String,
}

#[derive(Debug, Deserialize)]
struct CutRequest {
    #[serde(rename = "sourcePath")]
    source_path: String,
}

#[derive(Debug, Deserialize)]
struct PasteRequest {
    #[serde(rename = "targetPath")]
    target_path: String,
}

#[derive(Debug, Serialize)]
struct SuccessResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct PathSuccessResponse {
    success: bool,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TerminalInputRequest {
    #[serde(rename = "sessionId")]
    session_id: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct TerminalResizeRequest {
    #[serde(rename = "sessionId")]
    session_id: String,
    cols: u16,
    rows: u16,
}

#[derive(Debug, Deserialize)]
struct TerminalIdRequest {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Debug, Serialize)]
struct TerminalConnected {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Debug, Serialize)]
struct TerminalResponse {
    #[serde(rename = "sessionId")]
    session_id: String,
    data: String,
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
