use super::*;
use axum::body::to_bytes;
use yare::parameterized;

#[parameterized(
    not_found = { CoreError::NotFound, 404 },
    forbidden = { CoreError::Forbidden, 403 },
    unauthenticated = { CoreError::Unauthenticated, 401 },
    quota_exceeded = { CoreError::QuotaExceeded, 500 },
    not_ready = { CoreError::NotReady, 503 },
    transient = { CoreError::Transient("retry".to_string()), 429 },
)]
fn api_error_maps_to_expected_status(err: CoreError, expected: u16) {
    let response = ApiError(err).into_response();
    assert_eq!(response.status().as_u16(), expected);
}

#[tokio::test]
async fn api_error_body_carries_the_message() {
    let response = ApiError(CoreError::NotFound).into_response();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["error"], "not found");
}

#[parameterized(
    unauthenticated = { AuthError::Unauthenticated, 401 },
    malformed_cookie = { AuthError::MalformedCookie, 401 },
    rate_limited = { AuthError::RateLimited, 429 },
    invalid_state = { AuthError::InvalidState, 400 },
    invalid_token = { AuthError::InvalidToken, 400 },
    exchange_failed = { AuthError::ExchangeFailed("boom".to_string()), 502 },
)]
fn auth_api_error_maps_to_expected_status(err: AuthError, expected: u16) {
    let response = AuthApiError(err).into_response();
    assert_eq!(response.status().as_u16(), expected);
}

#[test]
fn auth_redirect_error_points_at_the_frontend_with_the_slug() {
    let response = AuthRedirectError { frontend_url: "https://app.example".to_string(), err: AuthError::InvalidState }
        .into_response();
    assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
    let location = response.headers().get("location").unwrap().to_str().unwrap();
    assert_eq!(location, "https://app.example?error=invalid_state");
}
