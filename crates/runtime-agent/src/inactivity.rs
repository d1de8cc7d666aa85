// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Inactivity Shutdown Manager (§4.10): arms a one-shot timer whenever
//! no stream connection is present, and reclaims the workspace at most once
//! if it fires.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

type ReclaimFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type ReclaimCallback = Arc<dyn Fn() -> ReclaimFuture + Send + Sync>;

struct State {
    connection_present: AtomicBool,
    shutdown_done: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// Cancelling [`InactivityManager::cancellation`] is the second axis of
/// cancellation described in §5: the Event Stream Handler and PTY
/// Multiplexer select on it to abort in-flight work once reclaim fires.
pub struct InactivityManager {
    state: Arc<State>,
    cancellation: CancellationToken,
    period: Duration,
    reclaim: ReclaimCallback,
}

impl InactivityManager {
    pub fn new(
        period: Duration,
        reclaim: impl Fn() -> ReclaimFuture + Send + Sync + 'static,
    ) -> Arc<Self> {
        let manager = Arc::new(Self {
            state: Arc::new(State {
                connection_present: AtomicBool::new(false),
                shutdown_done: AtomicBool::new(false),
                timer: Mutex::new(None),
            }),
            cancellation: CancellationToken::new(),
            period,
            reclaim: Arc::new(reclaim),
        });
        // Initial: no connection yet, so the timer starts armed.
        let armed = manager.clone();
        tokio::spawn(async move { armed.arm().await });
        manager
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn connection_present(&self) -> bool {
        self.state.connection_present.load(Ordering::SeqCst)
    }

    pub fn shutdown_done(&self) -> bool {
        self.state.shutdown_done.load(Ordering::SeqCst)
    }

    pub async fn on_connection_established(self: &Arc<Self>) {
        if self.shutdown_done() {
            return;
        }
        self.state.connection_present.store(true, Ordering::SeqCst);
        self.cancel_timer().await;
    }

    pub async fn on_connection_closed(self: &Arc<Self>) {
        if self.shutdown_done() {
            return;
        }
        self.state.connection_present.store(false, Ordering::SeqCst);
        self.arm().await;
    }

    async fn arm(self: &Arc<Self>) {
        self.cancel_timer().await;
        let manager = self.clone();
        let period = self.period;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(period).await;
            manager.fire().await;
        });
        *self.state.timer.lock().await = Some(handle);
    }

    async fn cancel_timer(&self) {
        if let Some(handle) = self.state.timer.lock().await.take() {
            handle.abort();
        }
    }

    async fn fire(&self) {
        if self.state.shutdown_done.swap(true, Ordering::SeqCst) {
            return;
        }
        (self.reclaim)().await;
        self.cancellation.cancel();
    }

    /// Explicit shutdown (e.g. the agent process is exiting). Idempotent
    /// alongside a naturally-firing timer.
    pub async fn close(&self) {
        self.cancel_timer().await;
        self.state.shutdown_done.store(true, Ordering::SeqCst);
        self.cancellation.cancel();
    }
}

#[cfg(test)]
#[path = "inactivity_tests.rs"]
mod tests;
