// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn generated_workspace_id_has_expected_prefix() {
    let id = WorkspaceId::generate();
    assert!(id.as_str().starts_with("workspace-"));
    assert_eq!(id.as_str().len(), "workspace-".len() + 36);
}

#[test]
fn workspace_ids_are_unique() {
    let a = WorkspaceId::generate();
    let b = WorkspaceId::generate();
    assert_ne!(a, b);
}

#[parameterized(
    mixed_case = { "Alice", "alice" },
    already_lower = { "bob", "bob" },
    shouting = { "CARO", "caro" },
)]
fn login_canonicalizes_to_lowercase(input: &str, expected: &str) {
    assert_eq!(Login::new(input).as_str(), expected);
}

#[test]
fn pty_session_id_is_32_hex_chars() {
    let id = PtySessionId::generate();
    assert_eq!(id.as_str().len(), 32);
    assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn pty_session_ids_are_unique() {
    let a = PtySessionId::generate();
    let b = PtySessionId::generate();
    assert_ne!(a, b);
}
