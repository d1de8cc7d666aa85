// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum_extra::extract::cookie::PrivateCookieJar;
use hatch_core::Login;

use super::*;
use crate::oauth::fake::{AlwaysRefreshes, NeverRefreshes};
use crate::session::{self, CookieKey};

fn jar() -> PrivateCookieJar {
    let key = CookieKey::from_master_secret(b"a very long test master secret that is at least sixty four bytes long!!!");
    PrivateCookieJar::new(key.inner().clone())
}

#[tokio::test]
async fn missing_cookie_is_unauthenticated() {
    let result = recover_session(jar(), &AlwaysRefreshes, 1_000).await;
    assert!(matches!(result, Err((AuthError::Unauthenticated, _))));
}

#[tokio::test]
async fn unexpired_session_passes_through_unchanged() {
    let token = SessionToken::MagicLink { login: Login::new("alice"), expires_at_epoch_ms: 10_000 };
    let jar = session::write_session(jar(), &token, 1_000);

    let recovered = recover_session(jar, &AlwaysRefreshes, 5_000).await.unwrap();
    assert_eq!(recovered.token, token);
}

#[tokio::test]
async fn expired_magic_link_session_is_cleared_not_refreshed() {
    let token = SessionToken::MagicLink { login: Login::new("alice"), expires_at_epoch_ms: 1_000 };
    let jar = session::write_session(jar(), &token, 500);

    let (err, jar) = recover_session(jar, &AlwaysRefreshes, 5_000).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated));
    assert!(session::read_session(&jar).is_none());
}

#[tokio::test]
async fn expired_oauth_session_with_refresh_token_is_transparently_refreshed() {
    let token = SessionToken::OAuth {
        login: Login::new("alice"),
        access_token: "stale".to_string(),
        refresh_token: Some("refresh-xyz".to_string()),
        expires_at_epoch_ms: 1_000,
    };
    let jar = session::write_session(jar(), &token, 500);

    let recovered = recover_session(jar, &AlwaysRefreshes, 5_000).await.unwrap();
    match recovered.token {
        SessionToken::OAuth { access_token, .. } => assert_eq!(access_token, "refreshed-refresh-xyz"),
        _ => panic!("expected an OAuth session"),
    }
    assert!(session::read_session(&recovered.jar).is_some());
}

#[tokio::test]
async fn failed_refresh_clears_the_session() {
    let token = SessionToken::OAuth {
        login: Login::new("alice"),
        access_token: "stale".to_string(),
        refresh_token: Some("refresh-xyz".to_string()),
        expires_at_epoch_ms: 1_000,
    };
    let jar = session::write_session(jar(), &token, 500);

    let (err, jar) = recover_session(jar, &NeverRefreshes, 5_000).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated));
    assert!(session::read_session(&jar).is_none());
}

#[tokio::test]
async fn expired_oauth_session_without_refresh_token_is_cleared() {
    let token = SessionToken::OAuth {
        login: Login::new("alice"),
        access_token: "stale".to_string(),
        refresh_token: None,
        expires_at_epoch_ms: 1_000,
    };
    let jar = session::write_session(jar(), &token, 500);

    let (err, jar) = recover_session(jar, &AlwaysRefreshes, 5_000).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated));
    assert!(session::read_session(&jar).is_none());
}
