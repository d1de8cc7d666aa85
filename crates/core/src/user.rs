// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The User entity. Created on first successful authentication; the core
//! never deletes one.

use serde::{Deserialize, Serialize};

use crate::ids::Login;

/// A fixed pool of placeholder avatars assigned deterministically to a user
/// who authenticates without a provider-supplied avatar.
const PLACEHOLDER_AVATARS: &[&str] = &[
    "/avatars/fox.svg",
    "/avatars/owl.svg",
    "/avatars/otter.svg",
    "/avatars/lynx.svg",
    "/avatars/heron.svg",
    "/avatars/badger.svg",
    "/avatars/crane.svg",
    "/avatars/wren.svg",
];

/// Pick a stable placeholder avatar for a login that has none, so the same
/// user always gets the same placeholder across logins.
pub fn placeholder_avatar(login: &Login) -> &'static str {
    let hash = login.as_str().bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    PLACEHOLDER_AVATARS[(hash as usize) % PLACEHOLDER_AVATARS.len()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: Login,
    pub display_name: String,
    pub avatar_url: String,
    pub created_at_epoch_ms: u64,
}

impl User {
    pub fn new(login: Login, display_name: impl Into<String>, avatar_url: Option<String>, created_at_epoch_ms: u64) -> Self {
        let avatar_url = avatar_url.unwrap_or_else(|| placeholder_avatar(&login).to_string());
        Self { login, display_name: display_name.into(), avatar_url, created_at_epoch_ms }
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
