// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub OAuth (C4): begin-OAuth redirect, CSRF-state verification, code
//! exchange, and user-info fetch. The opaque state cookie is verified by the
//! caller (see `session::OAUTH_STATE_COOKIE`); this module only generates and
//! checks the state value itself.

use async_trait::async_trait;
use hatch_core::{Login, User};
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope, TokenUrl};
use serde::Deserialize;

use crate::error::AuthError;

pub struct GitHubOAuthConfig {
    client: BasicClient,
}

pub struct BeginResult {
    pub authorize_url: String,
    pub csrf_state: String,
}

#[derive(Debug, Clone)]
pub struct ExchangedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at_epoch_ms: u64,
}

/// The refresh half of the middleware contract (§4.4), split out as a trait
/// so it can be exercised without reaching GitHub.
#[async_trait]
pub trait TokenRefresher: Send + Sync + 'static {
    async fn refresh(&self, refresh_token: &str, now_epoch_ms: u64) -> Result<ExchangedToken, AuthError>;
}

#[async_trait]
impl TokenRefresher for GitHubOAuthConfig {
    async fn refresh(&self, refresh_token: &str, now_epoch_ms: u64) -> Result<ExchangedToken, AuthError> {
        use oauth2::reqwest::async_http_client;
        use oauth2::RefreshToken;

        let token = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        Ok(Self::to_exchanged(&token, now_epoch_ms))
    }
}

impl GitHubOAuthConfig {
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Result<Self, AuthError> {
        let client = BasicClient::new(
            ClientId::new(client_id),
            Some(ClientSecret::new(client_secret)),
            AuthUrl::new("https://github.com/login/oauth/authorize".to_string())
                .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?,
            Some(
                TokenUrl::new("https://github.com/login/oauth/access_token".to_string())
                    .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?,
            ),
        )
        .set_redirect_uri(RedirectUrl::new(redirect_url).map_err(|e| AuthError::ExchangeFailed(e.to_string()))?);
        Ok(Self { client })
    }

    /// Generates the authorize URL and the CSRF state to be stashed in the
    /// 10-minute state cookie.
    pub fn begin(&self) -> BeginResult {
        let (authorize_url, csrf_token) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("read:user".to_string()))
            .add_scope(Scope::new("user:email".to_string()))
            .url();
        BeginResult { authorize_url: authorize_url.to_string(), csrf_state: csrf_token.secret().clone() }
    }

    pub fn verify_state(expected: &str, received: &str) -> Result<(), AuthError> {
        if expected == received {
            Ok(())
        } else {
            Err(AuthError::InvalidState)
        }
    }

    pub async fn exchange_code(&self, code: String, now_epoch_ms: u64) -> Result<ExchangedToken, AuthError> {
        use oauth2::reqwest::async_http_client;
        use oauth2::{ExchangeCode, TokenResponse};

        let token = self
            .client
            .exchange_code(ExchangeCode::new(code))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        Ok(Self::to_exchanged(&token, now_epoch_ms))
    }

    fn to_exchanged(token: &oauth2::basic::BasicTokenResponse, now_epoch_ms: u64) -> ExchangedToken {
        use oauth2::TokenResponse;
        let expires_in_ms = token.expires_in().map(|d| d.as_millis() as u64).unwrap_or(3_600_000);
        ExchangedToken {
            access_token: token.access_token().secret().clone(),
            refresh_token: token.refresh_token().map(|t| t.secret().clone()),
            expires_at_epoch_ms: now_epoch_ms + expires_in_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubUserPayload {
    login: String,
    name: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmailPayload {
    email: String,
    primary: bool,
}

/// Fetches the authenticated user's profile from the provider. Split out as
/// a trait so the callback flow can be exercised without reaching GitHub.
#[async_trait]
pub trait GitHubClient: Send + Sync + 'static {
    async fn fetch_user(&self, access_token: &str, now_epoch_ms: u64) -> Result<User, AuthError>;
}

pub struct HttpGitHubClient {
    http: reqwest::Client,
}

impl Default for HttpGitHubClient {
    fn default() -> Self {
        Self { http: reqwest::Client::new() }
    }
}

#[async_trait]
impl GitHubClient for HttpGitHubClient {
    async fn fetch_user(&self, access_token: &str, now_epoch_ms: u64) -> Result<User, AuthError> {
        let profile: GitHubUserPayload = self
            .http
            .get("https://api.github.com/user")
            .bearer_auth(access_token)
            .header("User-Agent", "hatch-auth")
            .send()
            .await
            .map_err(|e| AuthError::UserFetchFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::UserFetchFailed(e.to_string()))?;

        // Email fetch failure is non-fatal: the Go original logs and proceeds
        // without a primary email rather than failing the whole login.
        let emails: Vec<GitHubEmailPayload> = match self
            .http
            .get("https://api.github.com/user/emails")
            .bearer_auth(access_token)
            .header("User-Agent", "hatch-auth")
            .send()
            .await
        {
            Ok(resp) => resp.json().await.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "fetch github user emails failed");
                Vec::new()
            }
        };
        let _primary_email = emails.into_iter().find(|e| e.primary).map(|e| e.email);

        let login = Login::new(&profile.login);
        let display_name = profile.name.unwrap_or_else(|| profile.login.clone());
        Ok(User::new(login, display_name, profile.avatar_url, now_epoch_ms))
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;

    pub struct FakeGitHubClient {
        pub user: User,
    }

    #[async_trait]
    impl GitHubClient for FakeGitHubClient {
        async fn fetch_user(&self, _access_token: &str, _now_epoch_ms: u64) -> Result<User, AuthError> {
            Ok(self.user.clone())
        }
    }

    /// A refresher that always succeeds with a fresh, far-future expiry.
    pub struct AlwaysRefreshes;

    #[async_trait]
    impl TokenRefresher for AlwaysRefreshes {
        async fn refresh(&self, refresh_token: &str, now_epoch_ms: u64) -> Result<ExchangedToken, AuthError> {
            Ok(ExchangedToken {
                access_token: format!("refreshed-{refresh_token}"),
                refresh_token: Some(refresh_token.to_string()),
                expires_at_epoch_ms: now_epoch_ms + 3_600_000,
            })
        }
    }

    /// A refresher that always fails, e.g. a revoked grant.
    pub struct NeverRefreshes;

    #[async_trait]
    impl TokenRefresher for NeverRefreshes {
        async fn refresh(&self, _refresh_token: &str, _now_epoch_ms: u64) -> Result<ExchangedToken, AuthError> {
            Err(AuthError::ExchangeFailed("refresh token revoked".to_string()))
        }
    }
}

#[cfg(test)]
#[path = "oauth_tests.rs"]
mod tests;
