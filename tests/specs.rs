//! End-to-end scenarios spanning the Control Plane and the Runtime Agent,
//! exercised through their public library surfaces rather than a live
//! cluster (§8: S1-S6).

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum_extra::extract::cookie::PrivateCookieJar;
use hatch_control_plane::state::test_support::fake_state;
use hatch_core::{Login, SessionToken, User};
use hatch_engine::FakeProber;
use tower::ServiceExt;

fn session_cookie_header(key: &hatch_auth::CookieKey) -> String {
    let jar = PrivateCookieJar::new(key.inner().clone());
    let token = SessionToken::MagicLink { login: Login::new("s1-user"), expires_at_epoch_ms: u64::MAX };
    let jar = hatch_auth::session::write_session(jar, &token, 0);
    let cookie = jar.get(hatch_auth::session::SESSION_COOKIE).unwrap_or_else(|| panic!("cookie"));
    format!("{}={}", cookie.name(), cookie.value())
}

fn github_user() -> User {
    User::new(Login::new("s1-user"), "S1 User", None, 0)
}

/// S1: creating workspaces up to `PER_USER_CAP` succeeds; the next create
/// past the cap is rejected with `QuotaExceeded`.
#[tokio::test]
async fn s1_create_is_rejected_once_the_per_user_cap_is_reached() {
    let state = fake_state(FakeProber::ready_after(0), github_user());
    let cookie = session_cookie_header(&state.cookie_key.clone());
    let router = hatch_control_plane::router::build(state);

    let make_request = |name: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/repl/new")
            .header(header::COOKIE, cookie.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&serde_json::json!({ "template": "blank", "replName": name })).unwrap_or_default()))
            .unwrap_or_else(|_| panic!("request"))
    };

    for n in 0..hatch_core::workspace::PER_USER_CAP {
        let response = router.clone().oneshot(make_request(&format!("ws-{n}"))).await.unwrap_or_else(|_| panic!("response"));
        assert_eq!(response.status(), StatusCode::OK, "create #{n} should succeed under the cap");
    }

    let response = router.clone().oneshot(make_request("one-too-many")).await.unwrap_or_else(|_| panic!("response"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

/// S2: `activate` polls the readiness prober and returns the workspace's
/// id and name once it reports ready.
#[tokio::test]
async fn s2_activate_returns_a_url_once_the_workspace_is_ready() {
    let state = fake_state(FakeProber::ready_after(1), github_user());
    let cookie = session_cookie_header(&state.cookie_key.clone());
    let router = hatch_control_plane::router::build(state);

    let create = Request::builder()
        .method("POST")
        .uri("/api/repl/new")
        .header(header::COOKIE, cookie.clone())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&serde_json::json!({ "template": "blank", "replName": "s2" })).unwrap_or_default()))
        .unwrap_or_else(|_| panic!("request"));
    let created = router.clone().oneshot(create).await.unwrap_or_else(|_| panic!("response"));
    assert_eq!(created.status(), StatusCode::OK);
    let body = to_bytes(created.into_body(), usize::MAX).await.unwrap_or_else(|_| panic!("body"));
    let workspace: serde_json::Value = serde_json::from_slice(&body).unwrap_or_else(|_| panic!("json"));
    let id = workspace["id"].as_str().unwrap_or_else(|| panic!("id")).to_string();

    let activate = Request::builder()
        .uri(format!("/api/repl/session/{id}"))
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap_or_else(|_| panic!("request"));
    let response = router.oneshot(activate).await.unwrap_or_else(|_| panic!("response"));
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap_or_else(|_| panic!("body"));
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap_or_else(|_| panic!("json"));
    assert_eq!(parsed["replId"].as_str().unwrap_or_default(), id);
    assert_eq!(parsed["replName"].as_str().unwrap_or_default(), "s2");
}

/// S3: a workspace with no connection for the inactivity period is reclaimed
/// exactly once.
#[tokio::test]
async fn s3_an_idle_workspace_is_reclaimed_after_the_inactivity_period() {
    let reclaimed = Arc::new(tokio::sync::Notify::new());
    let signal = reclaimed.clone();
    let manager = hatch_runtime_agent::inactivity::InactivityManager::new(Duration::from_millis(20), move || {
        let signal = signal.clone();
        Box::pin(async move { signal.notify_one() })
    });

    tokio::time::timeout(Duration::from_millis(500), reclaimed.notified()).await.unwrap_or_else(|_| panic!("reclaim never fired"));
    assert!(manager.shutdown_done());
}

/// S4: a connection established before the inactivity period elapses cancels
/// the pending reclaim; the workspace stays alive.
#[tokio::test]
async fn s4_a_reconnect_before_the_deadline_cancels_the_pending_reclaim() {
    let manager = hatch_runtime_agent::inactivity::InactivityManager::new(Duration::from_millis(30), || Box::pin(async {}));

    tokio::time::sleep(Duration::from_millis(10)).await;
    manager.on_connection_established().await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(!manager.shutdown_done(), "an established connection must cancel the pending timer");
}

/// S5: a file written through `save_file_diffs`' patch path round-trips
/// through `fetch_content`.
#[tokio::test]
async fn s5_a_saved_file_diff_round_trips_through_fetch_content() {
    let dir = tempfile::TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    let fs = hatch_runtime_agent::fs::FilesystemOperator::new(dir.path());

    fs.create_file("notes.txt").await.unwrap_or_else(|_| panic!("create"));
    let patch = "@@ -0,0 +1,1 @@\n+hello world\n";
    fs.save_file_diffs("notes.txt", patch).await.unwrap_or_else(|_| panic!("patch"));

    let content = fs.fetch_content("notes.txt").await.unwrap_or_else(|_| panic!("fetch"));
    assert_eq!(content, "hello world");
}

/// S6: input written to a PTY session is echoed back through the session's
/// `on_data` callback.
#[tokio::test]
async fn s6_terminal_input_is_echoed_back_through_on_data() {
    let dir = tempfile::TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    let mux = hatch_runtime_agent::pty::PtyMultiplexer::new();
    let config = hatch_runtime_agent::pty::PtyConfig {
        shell: "/bin/sh".to_string(),
        working_dir: dir.path().to_string_lossy().into_owned(),
        ..Default::default()
    };

    let session = mux.create("s6", &config).unwrap_or_else(|_| panic!("spawn"));

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    session.set_on_data(move |bytes| {
        let _ = tx.send(bytes);
    }).await;

    session.write_input(b"echo hatch-echo\n").await.unwrap_or_else(|_| panic!("write"));

    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if let Ok(Some(chunk)) = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await {
            seen.extend(chunk);
            if String::from_utf8_lossy(&seen).contains("hatch-echo") {
                break;
            }
        }
    }

    assert!(String::from_utf8_lossy(&seen).contains("hatch-echo"));
    mux.remove("s6").await.unwrap_or_else(|_| panic!("remove"));
}
