// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared application state (§4.5, §4.4): the Workspace Service generic over
//! its adapter traits (so route handlers monomorphize over fakes in tests,
//! exactly as `hatch-engine`'s own tests do), plus the Auth Service's
//! collaborators.

use std::sync::Arc;

use hatch_adapters::{KubernetesOrchestrator, RedisSessionStore, S3ObjectStorageAdapter};
use hatch_auth::{CookieKey, GitHubClient, GitHubOAuthConfig, HttpGitHubClient, MagicLinkIssuer, RateLimiter};
use hatch_engine::{HttpReadinessProber, WorkspaceService};

use crate::env;

pub struct AppState<Store, Storage, Orch, Prober> {
    pub workspaces: Arc<WorkspaceService<Store, Storage, Orch, Prober>>,
    pub oauth: Arc<GitHubOAuthConfig>,
    pub github: Arc<dyn GitHubClient>,
    pub magic_link: Arc<MagicLinkIssuer>,
    pub rate_limiter: Arc<RateLimiter>,
    pub cookie_key: CookieKey,
    pub frontend_url: Arc<String>,
}

// Derived `Clone` would require `Store: Clone` etc at the struct definition
// itself; every field is an `Arc`, which is `Clone` regardless, so a manual
// impl avoids imposing that bound on callers.
impl<Store, Storage, Orch, Prober> Clone for AppState<Store, Storage, Orch, Prober> {
    fn clone(&self) -> Self {
        Self {
            workspaces: self.workspaces.clone(),
            oauth: self.oauth.clone(),
            github: self.github.clone(),
            magic_link: self.magic_link.clone(),
            rate_limiter: self.rate_limiter.clone(),
            cookie_key: self.cookie_key.clone(),
            frontend_url: self.frontend_url.clone(),
        }
    }
}

pub type ProdAppState = AppState<RedisSessionStore, S3ObjectStorageAdapter, KubernetesOrchestrator, HttpReadinessProber>;

impl ProdAppState {
    pub async fn build() -> anyhow::Result<Self> {
        let store = RedisSessionStore::connect(&env::redis_url()?).await?;
        let s3 = env::s3_config()?;
        let storage = S3ObjectStorageAdapter::new(&s3.bucket, &s3.region, s3.endpoint.as_deref())?;
        let orchestrator = KubernetesOrchestrator::new().await?;
        let prober = HttpReadinessProber::default();
        let base_domain = env::base_domain();

        let workspaces = WorkspaceService::new(store, storage, orchestrator, prober, base_domain);

        let oauth_env = env::github_oauth_env()?;
        let oauth = GitHubOAuthConfig::new(oauth_env.client_id, oauth_env.client_secret, oauth_env.redirect_url)?;

        Ok(Self {
            workspaces: Arc::new(workspaces),
            oauth: Arc::new(oauth),
            github: Arc::new(HttpGitHubClient::default()),
            magic_link: Arc::new(MagicLinkIssuer::new(&env::magic_link_secret()?)),
            rate_limiter: Arc::new(RateLimiter::new()),
            cookie_key: CookieKey::from_master_secret(&env::cookie_master_secret()?),
            frontend_url: Arc::new(env::frontend_url()?),
        })
    }
}

impl<Store, Storage, Orch, Prober> axum::extract::FromRef<AppState<Store, Storage, Orch, Prober>>
    for axum_extra::extract::cookie::Key
{
    fn from_ref(state: &AppState<Store, Storage, Orch, Prober>) -> Self {
        state.cookie_key.inner().clone()
    }
}

/// The narrow slice of `AppState` the session middleware needs, so it can be
/// layered with `middleware::from_fn_with_state` independently of the
/// workspace/storage adapters the rest of the router depends on.
#[derive(Clone)]
pub struct AuthState {
    pub oauth: Arc<GitHubOAuthConfig>,
    pub cookie_key: CookieKey,
}

impl<Store, Storage, Orch, Prober> AppState<Store, Storage, Orch, Prober> {
    pub fn auth_state(&self) -> AuthState {
        AuthState { oauth: self.oauth.clone(), cookie_key: self.cookie_key.clone() }
    }
}

impl axum::extract::FromRef<AuthState> for axum_extra::extract::cookie::Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.inner().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use hatch_adapters::{FakeObjectStorageAdapter, FakeOrchestrator, FakeSessionStore};
    use hatch_auth::FakeGitHubClient;
    use hatch_core::User;
    use hatch_engine::FakeProber;

    pub type TestAppState = AppState<FakeSessionStore, FakeObjectStorageAdapter, FakeOrchestrator, FakeProber>;

    /// Builds an `AppState` wired entirely to in-memory fakes, for exercising
    /// the HTTP layer without a live Redis/S3/Kubernetes/GitHub dependency.
    pub fn fake_state(prober: FakeProber, github_user: User) -> TestAppState {
        let workspaces =
            WorkspaceService::new(FakeSessionStore::new(), FakeObjectStorageAdapter::new(), FakeOrchestrator::new(), prober, "repl.test");

        AppState {
            workspaces: Arc::new(workspaces),
            oauth: Arc::new(
                GitHubOAuthConfig::new(
                    "client-id".to_string(),
                    "client-secret".to_string(),
                    "https://cp.test/auth/github/callback".to_string(),
                )
                .expect("oauth config with static test params always constructs"),
            ),
            github: Arc::new(FakeGitHubClient { user: github_user }),
            magic_link: Arc::new(MagicLinkIssuer::new(b"test-magic-link-signing-secret")),
            rate_limiter: Arc::new(RateLimiter::new()),
            cookie_key: CookieKey::from_master_secret(b"a very long test master secret that is at least sixty four bytes long!!!"),
            frontend_url: Arc::new("https://app.test".to_string()),
        }
    }
}
