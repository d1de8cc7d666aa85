use std::time::Duration;

use hatch_wire::{Emitter, Frame};
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;

use super::*;
use crate::inactivity::InactivityManager;

fn context() -> (TempDir, AgentContext, mpsc::Receiver<Frame>) {
    let dir = TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    let (emitter, rx) = Emitter::channel();
    let ctx = AgentContext {
        agent: 1,
        fs: Arc::new(FilesystemOperator::new(dir.path())),
        pty: Arc::new(PtyMultiplexer::new()),
        inactivity: InactivityManager::new(Duration::from_secs(60), || Box::pin(async {})),
        emitter,
    };
    (dir, ctx, rx)
}

async fn next_frame(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap_or_else(|_| panic!("timed out waiting for frame")).unwrap_or_else(|| panic!("channel closed"))
}

#[tokio::test]
async fn create_file_then_fetch_content_round_trips_through_the_registry() {
    let (_dir, ctx, mut rx) = context();
    let registry = build_registry(ctx);

    assert!(registry.dispatch("createFile", json!({"path": "a.txt"})));
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame.event, "createFileResponse");
    assert_eq!(frame.data["success"], true);

    assert!(registry.dispatch("fetchContent", json!({"path": "a.txt"})));
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame.event, "fetchContentResponse");
    assert_eq!(frame.data["content"], "");
}

#[tokio::test]
async fn fetch_content_of_a_missing_file_reports_an_error_not_a_stream_failure() {
    let (_dir, ctx, mut rx) = context();
    let registry = build_registry(ctx);

    assert!(registry.dispatch("fetchContent", json!({"path": "missing.txt"})));
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame.data["success"], false);
    assert!(frame.data["error"].is_string());
}

#[tokio::test]
async fn connection_emits_loaded_with_root_contents() {
    let (_dir, ctx, mut rx) = context();
    let registry = build_registry(ctx);

    assert!(registry.dispatch("connection", Value::Null));
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame.event, "Loaded");
    assert!(frame.data["rootContents"].is_array());
}

#[tokio::test]
async fn request_terminal_emits_terminal_connected() {
    let (_dir, ctx, mut rx) = context();
    let registry = build_registry(ctx);

    assert!(registry.dispatch("requestTerminal", json!({})));
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame.event, "terminalConnected");
    assert!(frame.data["sessionId"].is_string());
}

#[tokio::test]
async fn an_unregistered_event_is_not_dispatched() {
    let (_dir, ctx, _rx) = context();
    let registry = build_registry(ctx);

    assert!(!registry.dispatch("notARealEvent", Value::Null));
}

#[tokio::test]
async fn cut_without_a_matching_paste_reports_on_the_cut_response() {
    let (_dir, ctx, mut rx) = context();
    let registry = build_registry(ctx.clone());
    registry.dispatch("createFile", json!({"path": "a.txt"}));
    next_frame(&mut rx).await;

    assert!(registry.dispatch("cut", json!({"sourcePath": "a.txt"})));
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame.event, "cutResponse");
    assert_eq!(frame.data["success"], true);

    assert!(registry.dispatch("paste", json!({"targetPath": "b.txt"})));
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame.event, "pasteResponse");
    assert_eq!(frame.data["success"], true);
}
