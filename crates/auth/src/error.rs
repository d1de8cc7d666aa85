// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("oauth state mismatch")]
    InvalidState,

    #[error("oauth code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("fetching user info failed: {0}")]
    UserFetchFailed(String),

    #[error("session could not be saved: {0}")]
    SessionSaveFailed(String),

    #[error("magic link token invalid or expired")]
    InvalidToken,

    #[error("too many requests, try again later")]
    RateLimited,

    #[error("cookie could not be decoded")]
    MalformedCookie,
}

impl AuthError {
    /// The `error=<slug>` query parameter the control plane appends when
    /// redirecting back to the frontend on failure (§4.4).
    pub fn redirect_slug(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "session_error",
            AuthError::InvalidState => "invalid_state",
            AuthError::ExchangeFailed(_) => "exchange_failed",
            AuthError::UserFetchFailed(_) => "user_fetch_failed",
            AuthError::SessionSaveFailed(_) => "session_save_failed",
            AuthError::InvalidToken => "invalid_token",
            AuthError::RateLimited => "rate_limited",
            AuthError::MalformedCookie => "session_error",
        }
    }
}
