// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Auth Service surface (§4.4): begin-OAuth, OAuth callback, magic-link
//! request/verify, logout, `me`, `status`.

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum_extra::extract::cookie::PrivateCookieJar;
use hatch_adapters::{ObjectStorageAdapter, OrchestratorAdapter, SessionStore};
use hatch_auth::session;
use hatch_core::session_token::lifetimes::MAGIC_LINK_SESSION_MS;
use hatch_core::{Login, SessionToken, User};
use hatch_engine::ReadinessProber;
use serde::{Deserialize, Serialize};

use crate::error::{AuthApiError, AuthRedirectError};
use crate::state::AppState;

pub fn public_routes<Store, Storage, Orch, Prober>() -> Router<AppState<Store, Storage, Orch, Prober>>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    Router::new()
        .route("/auth/github", get(begin_github::<Store, Storage, Orch, Prober>))
        .route("/auth/github/callback", get(github_callback::<Store, Storage, Orch, Prober>))
        .route("/auth/magiclink/request", post(magic_link_request::<Store, Storage, Orch, Prober>))
        .route("/auth/magiclink/verify", get(magic_link_verify::<Store, Storage, Orch, Prober>))
        .route("/auth/logout", post(logout::<Store, Storage, Orch, Prober>))
        .route("/auth/status", get(status::<Store, Storage, Orch, Prober>))
}

/// Routes gated by the session middleware; wired separately in `router.rs` so
/// they can carry the `require_session` layer while the routes above don't.
pub fn protected_routes<Store, Storage, Orch, Prober>() -> Router<AppState<Store, Storage, Orch, Prober>>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    Router::new().route("/auth/me", get(me::<Store, Storage, Orch, Prober>))
}

async fn begin_github<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    jar: PrivateCookieJar,
) -> impl IntoResponse {
    let begin = state.oauth.begin();
    let jar = session::write_oauth_state(jar, &begin.csrf_state);
    (jar, Redirect::to(&begin.authorize_url))
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: String,
    state: String,
}

async fn github_callback<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    jar: PrivateCookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response
where
    Store: SessionStore,
{
    let now = crate::now_epoch_ms();

    let Some(expected_state) = session::read_oauth_state(&jar) else {
        return (jar, AuthRedirectError { frontend_url: (*state.frontend_url).clone(), err: hatch_auth::AuthError::InvalidState })
            .into_response();
    };
    let jar = session::clear_oauth_state(jar);

    if let Err(err) = hatch_auth::GitHubOAuthConfig::verify_state(&expected_state, &query.state) {
        return (jar, AuthRedirectError { frontend_url: (*state.frontend_url).clone(), err }).into_response();
    }

    let exchanged = match state.oauth.exchange_code(query.code, now).await {
        Ok(exchanged) => exchanged,
        Err(err) => return (jar, AuthRedirectError { frontend_url: (*state.frontend_url).clone(), err }).into_response(),
    };

    let user = match state.github.fetch_user(&exchanged.access_token, now).await {
        Ok(user) => user,
        Err(err) => return (jar, AuthRedirectError { frontend_url: (*state.frontend_url).clone(), err }).into_response(),
    };

    let token = SessionToken::OAuth {
        login: user.login,
        access_token: exchanged.access_token,
        refresh_token: exchanged.refresh_token,
        expires_at_epoch_ms: exchanged.expires_at_epoch_ms,
    };
    let jar = session::write_session(jar, &token, now);

    (jar, Redirect::to(&state.frontend_url)).into_response()
}

#[derive(Debug, Deserialize)]
struct MagicLinkRequest {
    email: String,
}

#[derive(Debug, Serialize)]
struct MagicLinkRequestResponse {
    ok: bool,
}

/// Always responds `{"ok": true}` regardless of whether the address is
/// rate-limited, so a caller can't use the response to enumerate which
/// emails are registered (§4.4).
async fn magic_link_request<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    Json(request): Json<MagicLinkRequest>,
) -> Json<MagicLinkRequestResponse> {
    let now = crate::now_epoch_ms();

    if state.rate_limiter.check_and_record(&request.email, now) {
        match state.magic_link.issue(&request.email, now) {
            Ok(token) => {
                // Email delivery is a separate external collaborator; this
                // control plane only mints the token.
                tracing::info!(email = %request.email, link = format!("{}/auth/magiclink/verify?token={token}", state.frontend_url), "magic link issued");
            }
            Err(err) => tracing::warn!(email = %request.email, error = %err, "failed to issue magic link token"),
        }
    } else {
        tracing::warn!(email = %request.email, "magic link request rate-limited");
    }

    Json(MagicLinkRequestResponse { ok: true })
}

#[derive(Debug, Deserialize)]
struct VerifyQuery {
    token: String,
}

async fn magic_link_verify<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    jar: PrivateCookieJar,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let now = crate::now_epoch_ms();

    let email = match state.magic_link.verify(&query.token) {
        Ok(email) => email,
        Err(err) => return (jar, AuthRedirectError { frontend_url: (*state.frontend_url).clone(), err }).into_response(),
    };

    let token =
        SessionToken::MagicLink { login: Login::new(&email), expires_at_epoch_ms: now + MAGIC_LINK_SESSION_MS };
    let jar = session::write_session(jar, &token, now);

    (jar, Redirect::to(&state.frontend_url)).into_response()
}

async fn logout<Store, Storage, Orch, Prober>(jar: PrivateCookieJar) -> impl IntoResponse {
    let jar = session::clear_session(jar);
    (jar, Json(MagicLinkRequestResponse { ok: true }))
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    authenticated: bool,
}

/// Unlike every other protected route, `status` never fails closed: an
/// anonymous caller gets `{"authenticated": false}` rather than 401, since
/// frontends poll this to decide whether to show a login prompt at all.
async fn status<Store, Storage, Orch, Prober>(jar: PrivateCookieJar) -> Json<StatusResponse> {
    let now = crate::now_epoch_ms();
    let authenticated = session::read_session(&jar).map(|token| !token.is_expired(now)).unwrap_or(false);
    Json(StatusResponse { authenticated })
}

async fn me<Store, Storage, Orch, Prober>(
    State(state): State<AppState<Store, Storage, Orch, Prober>>,
    axum::Extension(token): axum::Extension<SessionToken>,
) -> Result<Json<User>, AuthApiError> {
    let now = crate::now_epoch_ms();
    let user = match &token {
        SessionToken::OAuth { access_token, .. } => state.github.fetch_user(access_token, now).await?,
        // No OAuth access token to re-fetch a profile with: reconstruct a
        // minimal `User` from the verified email claim.
        SessionToken::MagicLink { login, .. } => User::new(login.clone(), login.as_str(), None, now),
    };
    Ok(Json(user))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
