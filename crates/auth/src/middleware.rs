// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The authentication middleware contract (§4.4): recover the session from
//! its cookie; if expired and a refresh token is present, transparently
//! refresh and persist; otherwise clear the cookie and fail `Unauthenticated`.

use axum_extra::extract::cookie::PrivateCookieJar;
use hatch_core::SessionToken;

use crate::error::AuthError;
use crate::oauth::TokenRefresher;
use crate::session;

/// Outcome of `recover_session`: the live token plus the jar to send back
/// (unchanged, refreshed, or cleared).
pub struct Recovered {
    pub token: SessionToken,
    pub jar: PrivateCookieJar,
}

pub async fn recover_session(
    jar: PrivateCookieJar,
    refresher: &impl TokenRefresher,
    now_epoch_ms: u64,
) -> Result<Recovered, (AuthError, PrivateCookieJar)> {
    let Some(token) = session::read_session(&jar) else {
        return Err((AuthError::Unauthenticated, jar));
    };

    if !token.is_expired(now_epoch_ms) {
        return Ok(Recovered { token, jar });
    }

    if !token.refreshable() {
        let jar = session::clear_session(jar);
        return Err((AuthError::Unauthenticated, jar));
    }

    let SessionToken::OAuth { login, refresh_token: Some(refresh_token), .. } = &token else {
        let jar = session::clear_session(jar);
        return Err((AuthError::Unauthenticated, jar));
    };

    match refresher.refresh(refresh_token, now_epoch_ms).await {
        Ok(exchanged) => {
            let refreshed = SessionToken::OAuth {
                login: login.clone(),
                access_token: exchanged.access_token,
                refresh_token: exchanged.refresh_token.or_else(|| Some(refresh_token.clone())),
                expires_at_epoch_ms: exchanged.expires_at_epoch_ms,
            };
            let jar = session::write_session(jar, &refreshed, now_epoch_ms);
            Ok(Recovered { token: refreshed, jar })
        }
        Err(_) => {
            let jar = session::clear_session(jar);
            Err((AuthError::Unauthenticated, jar))
        }
    }
}

#[cfg(test)]
#[path = "middleware_tests.rs"]
mod tests;
