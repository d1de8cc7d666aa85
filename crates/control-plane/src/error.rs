// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps `CoreError` and `AuthError` to HTTP responses (§7).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use hatch_core::CoreError;
use hatch_auth::AuthError;
use serde_json::json;

pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Auth failures that happen before a session exists (e.g. the OAuth
/// callback) redirect to the frontend with `error=<slug>` rather than
/// returning a bare JSON error (§4.4).
pub struct AuthRedirectError {
    pub frontend_url: String,
    pub err: AuthError,
}

impl IntoResponse for AuthRedirectError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.err, slug = self.err.redirect_slug(), "auth flow failed, redirecting");
        Redirect::to(&format!("{}?error={}", self.frontend_url, self.err.redirect_slug())).into_response()
    }
}

/// Auth failures on already-established API routes (`me`, `status`, logout)
/// return plain JSON instead of a redirect.
pub struct AuthApiError(pub AuthError);

impl From<AuthError> for AuthApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AuthError::Unauthenticated | AuthError::MalformedCookie => StatusCode::UNAUTHORIZED,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InvalidState | AuthError::InvalidToken => StatusCode::BAD_REQUEST,
            AuthError::ExchangeFailed(_) | AuthError::UserFetchFailed(_) | AuthError::SessionSaveFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
