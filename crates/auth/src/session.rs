// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session cookie lifecycle (§4.4): the main session is an opaque, encrypted
//! cookie carrying a serialized `SessionToken`; the OAuth CSRF state is a
//! short-lived companion cookie. Both ride on `axum-extra`'s private
//! (encrypted-and-authenticated) cookie jar.

use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use cookie::time::Duration;
use hatch_core::SessionToken;
use hatch_core::session_token::lifetimes::OAUTH_STATE_COOKIE_MS;

pub const SESSION_COOKIE: &str = "hatch_session";
pub const OAUTH_STATE_COOKIE: &str = "hatch_oauth_state";

/// Wraps the signing/encryption key for the private cookie jar. A thin
/// newtype so callers don't reach into `axum_extra::extract::cookie::Key`
/// directly.
#[derive(Clone)]
pub struct CookieKey(Key);

impl CookieKey {
    pub fn from_master_secret(secret: &[u8]) -> Self {
        Self(Key::derive_from(secret))
    }

    pub fn inner(&self) -> &Key {
        &self.0
    }
}

fn build_cookie(name: &'static str, value: String, max_age_ms: u64) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::milliseconds(max_age_ms as i64))
        .build()
}

/// `SessionToken` is a plain struct of strings and integers: serializing it
/// cannot fail, so this has no error case.
pub fn write_session(jar: PrivateCookieJar, token: &SessionToken, now_epoch_ms: u64) -> PrivateCookieJar {
    let payload = serde_json::to_string(token).unwrap_or_default();
    let ttl_ms = token.expires_at_epoch_ms().saturating_sub(now_epoch_ms).max(1);
    jar.add(build_cookie(SESSION_COOKIE, payload, ttl_ms))
}

pub fn read_session(jar: &PrivateCookieJar) -> Option<SessionToken> {
    jar.get(SESSION_COOKIE).and_then(|c| serde_json::from_str(c.value()).ok())
}

pub fn clear_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::from(SESSION_COOKIE))
}

pub fn write_oauth_state(jar: PrivateCookieJar, state: &str) -> PrivateCookieJar {
    jar.add(build_cookie(OAUTH_STATE_COOKIE, state.to_string(), OAUTH_STATE_COOKIE_MS))
}

pub fn read_oauth_state(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string())
}

pub fn clear_oauth_state(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::from(OAUTH_STATE_COOKIE))
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
