// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authentication middleware (§4.4): recover the session cookie, transparently
//! refresh an expired-but-refreshable one, and inject the recovered
//! `SessionToken` into the request for handlers to read via `Extension`.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::PrivateCookieJar;

use crate::state::AuthState;

pub async fn require_session(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let now = crate::now_epoch_ms();
    match hatch_auth::recover_session(jar, state.oauth.as_ref(), now).await {
        Ok(recovered) => {
            request.extensions_mut().insert(recovered.token.clone());
            let response = next.run(request).await;
            (recovered.jar, response).into_response()
        }
        Err((_, jar)) => (jar, StatusCode::UNAUTHORIZED).into_response(),
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
