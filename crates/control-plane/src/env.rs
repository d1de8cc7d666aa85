// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the control-plane binary (§6).

use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for environment variable {0}: {1}")]
    Invalid(&'static str, String),
}

fn required(name: &'static str) -> Result<String, EnvError> {
    std::env::var(name).map_err(|_| EnvError::Missing(name))
}

/// TCP address the HTTP server binds to. Default `0.0.0.0:8000`.
pub fn bind_addr() -> Result<SocketAddr, EnvError> {
    let raw = std::env::var("HATCH_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    raw.parse().map_err(|_| EnvError::Invalid("HATCH_BIND_ADDR", raw))
}

pub fn redis_url() -> Result<String, EnvError> {
    required("REDIS_URL")
}

pub fn frontend_url() -> Result<String, EnvError> {
    required("FRONTEND_URL")
}

/// Hostname suffix for runtime ingress routes: `<workspaceId>.<base_domain>`.
pub fn base_domain() -> String {
    std::env::var("HATCH_BASE_DOMAIN").unwrap_or_else(|_| "repl.local".to_string())
}

pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
}

pub fn s3_config() -> Result<S3Config, EnvError> {
    Ok(S3Config {
        bucket: required("HATCH_S3_BUCKET")?,
        region: std::env::var("HATCH_S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        endpoint: std::env::var("HATCH_S3_ENDPOINT").ok(),
    })
}

pub struct GitHubOAuthEnv {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

pub fn github_oauth_env() -> Result<GitHubOAuthEnv, EnvError> {
    Ok(GitHubOAuthEnv {
        client_id: required("GITHUB_CLIENT_ID")?,
        client_secret: required("GITHUB_CLIENT_SECRET")?,
        redirect_url: required("GITHUB_REDIRECT_URL")?,
    })
}

/// HMAC signing secret for magic-link tokens. Must be kept stable across
/// restarts or all outstanding links invalidate early.
pub fn magic_link_secret() -> Result<Vec<u8>, EnvError> {
    required("HATCH_MAGIC_LINK_SECRET").map(String::into_bytes)
}

/// Master secret `axum-extra`'s private cookie jar derives its encryption and
/// signing keys from. Must be at least 64 bytes of real entropy.
///
/// Rotation is a known open question (§9): the control plane currently reads
/// one secret at startup, so rotating it invalidates every outstanding
/// session cookie rather than accepting both an old and a new key.
pub fn cookie_master_secret() -> Result<Vec<u8>, EnvError> {
    required("HATCH_COOKIE_SECRET").map(String::into_bytes)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
