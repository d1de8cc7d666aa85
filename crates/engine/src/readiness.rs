// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The readiness probe used by `Activate` (§4.5): poll
//! `https://<runner-ingress>/<id>/ping` until the literal body `"pong"` is
//! observed, or the deadline elapses.

use async_trait::async_trait;

/// Split out as a trait so `Activate`'s polling loop can be exercised
/// without a real HTTP round trip.
#[async_trait]
pub trait ReadinessProber: Send + Sync + 'static {
    async fn is_ready(&self, url: &str) -> bool;
}

pub struct HttpReadinessProber {
    client: reqwest::Client,
}

impl Default for HttpReadinessProber {
    /// Per-workspace ingress certificates are self-signed, so the probe
    /// can't validate against a CA chain; it's a liveness check, not an
    /// auth boundary, so relaxed verification here doesn't weaken anything
    /// a caller depends on.
    fn default() -> Self {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl ReadinessProber for HttpReadinessProber {
    async fn is_ready(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(resp) => resp.text().await.map(|body| body == "pong").unwrap_or(false),
            Err(_) => false,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Becomes ready after `ready_after` calls.
    pub struct FakeProber {
        calls: AtomicU32,
        ready_after: u32,
    }

    impl FakeProber {
        pub fn ready_after(ready_after: u32) -> Self {
            Self { calls: AtomicU32::new(0), ready_after }
        }

        pub fn never_ready() -> Self {
            Self { calls: AtomicU32::new(0), ready_after: u32::MAX }
        }

        pub fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadinessProber for FakeProber {
        async fn is_ready(&self, _url: &str) -> bool {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            n >= self.ready_after
        }
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
