use super::*;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use hatch_core::Login;
use hatch_engine::FakeProber;
use tower::ServiceExt;

use crate::state::test_support::fake_state;

fn github_user() -> User {
    User::new(Login::new("octocat"), "The Octocat", None, 0)
}

#[tokio::test]
async fn begin_github_redirects_and_sets_a_csrf_state_cookie() {
    let state = fake_state(FakeProber::ready_after(1), github_user());
    let router = public_routes().with_state(state);

    let response =
        router.oneshot(Request::builder().uri("/auth/github").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
    let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    assert!(location.starts_with("https://github.com/login/oauth/authorize"));
}

#[tokio::test]
async fn callback_without_a_state_cookie_redirects_with_invalid_state() {
    let state = fake_state(FakeProber::ready_after(1), github_user());
    let router = public_routes().with_state(state);

    let response = router
        .oneshot(Request::builder().uri("/auth/github/callback?code=abc&state=xyz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    assert!(location.contains("error=invalid_state"));
}

#[tokio::test]
async fn magic_link_request_always_reports_ok() {
    let state = fake_state(FakeProber::ready_after(1), github_user());
    let router = public_routes().with_state(state);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/magiclink/request")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"person@example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, r#"{"ok":true}"#);
}

#[tokio::test]
async fn magic_link_verify_with_a_bogus_token_redirects_with_invalid_token() {
    let state = fake_state(FakeProber::ready_after(1), github_user());
    let router = public_routes().with_state(state);

    let response = router
        .oneshot(Request::builder().uri("/auth/magiclink/verify?token=not-a-real-token").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    assert!(location.contains("error=invalid_token"));
}

#[tokio::test]
async fn magic_link_round_trip_issues_a_verifiable_session() {
    let state = fake_state(FakeProber::ready_after(1), github_user());
    let token = state.magic_link.issue("person@example.com", 0).unwrap();
    let router = public_routes().with_state(state);

    let response = router
        .oneshot(Request::builder().uri(format!("/auth/magiclink/verify?token={token}")).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
    let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    assert_eq!(location, "https://app.test");
}

#[tokio::test]
async fn status_reports_false_for_an_anonymous_caller() {
    let state = fake_state(FakeProber::ready_after(1), github_user());
    let router = public_routes().with_state(state);

    let response =
        router.oneshot(Request::builder().uri("/auth/status").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, r#"{"authenticated":false}"#);
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let state = fake_state(FakeProber::ready_after(1), github_user());
    let router = public_routes().with_state(state);

    let response =
        router.oneshot(Request::builder().method("POST").uri("/auth/logout").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
}
