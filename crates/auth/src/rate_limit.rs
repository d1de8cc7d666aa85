// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-email rate limiting for magic-link requests (§4.4): at most
//! `MAX_ATTEMPTS` within `RATE_LIMIT_WINDOW_MS`, sliding by reset-on-expiry
//! rather than a true sliding window — matches the simple fixed-window
//! counter the reference implementation uses.

use std::collections::HashMap;

use hatch_core::session_token::lifetimes::{MAX_ATTEMPTS, RATE_LIMIT_WINDOW_MS};
use parking_lot::Mutex;

struct Window {
    count: u32,
    window_start_epoch_ms: u64,
}

#[derive(Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attempt for `email` at `now_epoch_ms`. Returns `false` if
    /// the caller has exceeded `MAX_ATTEMPTS` within the current window.
    pub fn check_and_record(&self, email: &str, now_epoch_ms: u64) -> bool {
        let mut windows = self.windows.lock();
        let entry = windows.entry(email.to_string()).or_insert(Window { count: 0, window_start_epoch_ms: now_epoch_ms });

        if now_epoch_ms.saturating_sub(entry.window_start_epoch_ms) >= RATE_LIMIT_WINDOW_MS {
            entry.count = 0;
            entry.window_start_epoch_ms = now_epoch_ms;
        }

        if entry.count >= MAX_ATTEMPTS {
            return false;
        }
        entry.count += 1;
        true
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
