// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn allows_up_to_max_attempts_within_the_window() {
    let limiter = RateLimiter::new();
    assert!(limiter.check_and_record("a@example.com", 0));
    assert!(limiter.check_and_record("a@example.com", 1_000));
    assert!(limiter.check_and_record("a@example.com", 2_000));
    assert!(!limiter.check_and_record("a@example.com", 3_000));
}

#[test]
fn resets_after_the_window_elapses() {
    let limiter = RateLimiter::new();
    for i in 0..MAX_ATTEMPTS {
        assert!(limiter.check_and_record("a@example.com", i as u64));
    }
    assert!(!limiter.check_and_record("a@example.com", 1_000));
    assert!(limiter.check_and_record("a@example.com", RATE_LIMIT_WINDOW_MS + 1_000));
}

#[test]
fn tracks_each_email_independently() {
    let limiter = RateLimiter::new();
    for _ in 0..MAX_ATTEMPTS {
        assert!(limiter.check_and_record("a@example.com", 0));
    }
    assert!(!limiter.check_and_record("a@example.com", 0));
    assert!(limiter.check_and_record("b@example.com", 0));
}
