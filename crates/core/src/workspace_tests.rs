// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_workspace_starts_inactive() {
    let ws = Workspace::new(WorkspaceId::generate(), "w1", Login::new("alice"), "node");
    assert!(!ws.active);
    assert_eq!(ws.owner.as_str(), "alice");
    assert_eq!(ws.template, "node");
}
