// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::fake::FakeProber;
use super::*;

#[tokio::test]
async fn becomes_ready_after_the_configured_call_count() {
    let prober = FakeProber::ready_after(3);
    assert!(!prober.is_ready("https://example.test/ping").await);
    assert!(!prober.is_ready("https://example.test/ping").await);
    assert!(prober.is_ready("https://example.test/ping").await);
    assert_eq!(prober.call_count(), 3);
}

#[tokio::test]
async fn never_ready_stays_false() {
    let prober = FakeProber::never_ready();
    for _ in 0..5 {
        assert!(!prober.is_ready("https://example.test/ping").await);
    }
}
