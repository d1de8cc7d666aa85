use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tempfile::TempDir;

use super::*;

fn echo_config(cwd: &str) -> PtyConfig {
    PtyConfig { shell: "/bin/sh".to_string(), working_dir: cwd.to_string(), cols: 80, rows: 24, ..PtyConfig::default() }
}

#[tokio::test]
async fn create_then_get_returns_the_same_session() {
    let dir = TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    let mux = PtyMultiplexer::new();
    let created = mux.create("sess-1", &echo_config(&dir.path().to_string_lossy())).unwrap_or_else(|e| panic!("{e}"));

    let fetched = mux.get("sess-1").unwrap_or_else(|| panic!("session missing"));
    assert_eq!(created.id(), fetched.id());

    mux.remove("sess-1").await.unwrap_or_else(|e| panic!("{e}"));
}

#[tokio::test]
async fn create_with_a_duplicate_id_fails() {
    let dir = TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    let mux = PtyMultiplexer::new();
    mux.create("sess-1", &echo_config(&dir.path().to_string_lossy())).unwrap_or_else(|e| panic!("{e}"));

    let err = mux.create("sess-1", &echo_config(&dir.path().to_string_lossy())).unwrap_err();
    assert!(matches!(err, PtyError::Duplicate(_)));

    mux.remove("sess-1").await.unwrap_or_else(|e| panic!("{e}"));
}

#[tokio::test]
async fn write_input_delivers_output_to_on_data() {
    let dir = TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    let mux = PtyMultiplexer::new();
    let session = mux.create("sess-1", &echo_config(&dir.path().to_string_lossy())).unwrap_or_else(|e| panic!("{e}"));

    let received = Arc::new(AtomicBool::new(false));
    let flag = received.clone();
    session.set_on_data(move |_bytes| flag.store(true, Ordering::SeqCst)).await;

    session.write_input(b"echo hi\n").await.unwrap_or_else(|e| panic!("{e}"));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(received.load(Ordering::SeqCst));

    mux.remove("sess-1").await.unwrap_or_else(|e| panic!("{e}"));
}

#[tokio::test]
async fn a_process_that_exits_on_its_own_is_pruned_from_the_table() {
    let dir = TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    let mux = PtyMultiplexer::new();
    let config = PtyConfig { shell: "/bin/true".to_string(), working_dir: dir.path().to_string_lossy().into_owned(), ..PtyConfig::default() };
    let session = mux.create("sess-exit", &config).unwrap_or_else(|e| panic!("{e}"));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline && !session.is_closed() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(session.is_closed());
    assert!(mux.get("sess-exit").is_none());
    assert!(!mux.list().contains(&"sess-exit".to_string()));

    let recreated = mux.create("sess-exit", &config);
    assert!(recreated.is_ok(), "id should be reusable once the dead session is pruned");
    mux.remove("sess-exit").await.unwrap_or_else(|e| panic!("{e}"));
}

#[tokio::test]
async fn remove_on_an_unknown_session_is_not_found() {
    let mux = PtyMultiplexer::new();
    let err = mux.remove("missing").await.unwrap_err();
    assert!(matches!(err, PtyError::NotFound(_)));
}

#[tokio::test]
async fn close_is_idempotent() {
    let dir = TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    let mux = PtyMultiplexer::new();
    let session = mux.create("sess-1", &echo_config(&dir.path().to_string_lossy())).unwrap_or_else(|e| panic!("{e}"));

    session.close().await;
    session.close().await;
    assert!(session.is_closed());

    mux.remove("sess-1").await.unwrap_or_else(|e| panic!("{e}"));
}

#[tokio::test]
async fn cleanup_closes_and_drops_every_session() {
    let dir = TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    let mux = PtyMultiplexer::new();
    mux.create("sess-1", &echo_config(&dir.path().to_string_lossy())).unwrap_or_else(|e| panic!("{e}"));
    mux.create("sess-2", &echo_config(&dir.path().to_string_lossy())).unwrap_or_else(|e| panic!("{e}"));

    mux.cleanup().await;

    assert!(mux.list().is_empty());
}
