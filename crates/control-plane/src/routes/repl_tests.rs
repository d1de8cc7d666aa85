use super::*;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use hatch_core::{Login, User};
use hatch_engine::FakeProber;
use tower::ServiceExt;

use crate::state::test_support::fake_state;

fn logged_in_as(login: &str) -> hatch_core::SessionToken {
    hatch_core::SessionToken::MagicLink { login: Login::new(login), expires_at_epoch_ms: u64::MAX }
}

fn request(method: &str, uri: &str, body: Body, token: hatch_core::SessionToken) -> Request<Body> {
    let mut req = Request::builder().method(method).uri(uri).body(body).unwrap();
    req.extensions_mut().insert(token);
    req
}

#[tokio::test]
async fn create_then_list_round_trips_through_the_workspace_service() {
    let state = fake_state(FakeProber::ready_after(1), User::new(Login::new("octocat"), "Octocat", None, 0));
    let router = routes().with_state(state);

    let create_response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/repl/new",
            Body::from(r#"{"template":"python","replName":"my-repl"}"#),
            logged_in_as("octocat"),
        ))
        .await
        .unwrap();
    assert_eq!(create_response.status(), StatusCode::OK);
    let body = to_bytes(create_response.into_body(), usize::MAX).await.unwrap();
    let created: Workspace = serde_json::from_slice(&body).unwrap();
    assert_eq!(created.name, "my-repl");
    assert_eq!(created.template, "python");

    let list_response =
        router.oneshot(request("GET", "/api/repl", Body::empty(), logged_in_as("octocat"))).await.unwrap();
    assert_eq!(list_response.status(), StatusCode::OK);
    let body = to_bytes(list_response.into_body(), usize::MAX).await.unwrap();
    let listed: Vec<Workspace> = serde_json::from_slice(&body).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
}

#[tokio::test]
async fn activate_on_someone_elses_workspace_is_forbidden() {
    let state = fake_state(FakeProber::ready_after(1), User::new(Login::new("octocat"), "Octocat", None, 0));
    let router = routes().with_state(state);

    let create_response = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/repl/new",
            Body::from(r#"{"template":"python","replName":"my-repl"}"#),
            logged_in_as("octocat"),
        ))
        .await
        .unwrap();
    let body = to_bytes(create_response.into_body(), usize::MAX).await.unwrap();
    let created: Workspace = serde_json::from_slice(&body).unwrap();

    let response = router
        .oneshot(request("GET", &format!("/api/repl/session/{}", created.id), Body::empty(), logged_in_as("mallory")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_an_unknown_workspace_is_not_found() {
    let state = fake_state(FakeProber::ready_after(1), User::new(Login::new("octocat"), "Octocat", None, 0));
    let router = routes().with_state(state);

    let response = router
        .oneshot(request("DELETE", "/api/repl/workspace-does-not-exist", Body::empty(), logged_in_as("octocat")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
