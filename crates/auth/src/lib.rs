// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hatch-auth: the Auth Service (C4) — session cookie lifecycle, GitHub
//! OAuth, magic-link issue/verify, and the authentication middleware
//! contract.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod error;
pub mod magic_link;
pub mod middleware;
pub mod oauth;
pub mod rate_limit;
pub mod session;

pub use error::AuthError;
pub use magic_link::MagicLinkIssuer;
pub use middleware::{Recovered, recover_session};
pub use oauth::{BeginResult, ExchangedToken, GitHubClient, GitHubOAuthConfig, HttpGitHubClient, TokenRefresher};
pub use rate_limit::RateLimiter;
pub use session::CookieKey;

#[cfg(any(test, feature = "test-support"))]
pub use oauth::fake::{AlwaysRefreshes, FakeGitHubClient, NeverRefreshes};
