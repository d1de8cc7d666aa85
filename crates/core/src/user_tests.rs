// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn placeholder_avatar_is_stable_for_same_login() {
    let login = Login::new("alice");
    assert_eq!(placeholder_avatar(&login), placeholder_avatar(&login));
}

#[test]
fn user_without_avatar_gets_a_placeholder() {
    let user = User::new(Login::new("bob"), "Bob", None, 0);
    assert!(user.avatar_url.starts_with("/avatars/"));
}

#[test]
fn user_with_avatar_keeps_it() {
    let user = User::new(Login::new("bob"), "Bob", Some("https://example.com/a.png".into()), 0);
    assert_eq!(user.avatar_url, "https://example.com/a.png");
}
