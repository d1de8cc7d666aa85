// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::{SystemTime, UNIX_EPOCH};

use super::*;

fn now_epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as u64
}

#[test]
fn issued_token_verifies_to_the_same_email() {
    let issuer = MagicLinkIssuer::new(b"test-signing-secret");
    let token = issuer.issue("alice@example.com", now_epoch_ms()).unwrap();

    let email = issuer.verify(&token).unwrap();
    assert_eq!(email, "alice@example.com");
}

#[test]
fn expired_token_fails_verification() {
    let issuer = MagicLinkIssuer::new(b"test-signing-secret");
    // Issue a token whose expiry is already in the past.
    let token = issuer.issue("alice@example.com", now_epoch_ms() - (MAGIC_LINK_TOKEN_MS * 2)).unwrap();

    assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken)));
}

#[test]
fn token_signed_with_a_different_secret_fails_verification() {
    let issuer_a = MagicLinkIssuer::new(b"secret-a");
    let issuer_b = MagicLinkIssuer::new(b"secret-b");
    let token = issuer_a.issue("alice@example.com", now_epoch_ms()).unwrap();

    assert!(matches!(issuer_b.verify(&token), Err(AuthError::InvalidToken)));
}
