// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The PTY Multiplexer (§4.8): one interactive shell process per session id,
//! each wired through `portable-pty` with a dedicated reader thread bridging
//! blocking PTY reads into an async channel.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use parking_lot::RwLock;
use portable_pty::{CommandBuilder, MasterPty, NativePtySystem, PtySize, PtySystem};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

const CLOSE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum PtyError {
    #[error("session {0} already exists")]
    Duplicate(String),
    #[error("session {0} not found")]
    NotFound(String),
    #[error("pty error: {0}")]
    Pty(String),
}

#[derive(Debug, Clone)]
pub struct PtyConfig {
    pub shell: String,
    pub working_dir: String,
    pub env: Vec<(String, String)>,
    pub cols: u16,
    pub rows: u16,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            shell: "/bin/bash".to_string(),
            working_dir: "/workspaces".to_string(),
            env: vec![("TERM".to_string(), "xterm-256color".to_string())],
            cols: 80,
            rows: 24,
        }
    }
}

/// One shell process attached to a pseudo-terminal. `on_data`/`on_close` are
/// serialized by `callbacks` so two inbound chunks can't interleave into a
/// single subscriber; `closed` lets `write_input`/`resize` short-circuit
/// without taking that lock once the session is torn down.
pub struct PtySession {
    id: String,
    master: AsyncMutex<Box<dyn MasterPty + Send>>,
    writer: AsyncMutex<Box<dyn Write + Send>>,
    child_pid: Option<i32>,
    closed: AtomicBool,
    callbacks: AsyncMutex<Callbacks>,
}

#[derive(Default)]
struct Callbacks {
    on_data: Option<Box<dyn Fn(Vec<u8>) + Send + Sync>>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl PtySession {
    fn spawn(id: String, config: &PtyConfig) -> Result<(Arc<Self>, mpsc::Receiver<Vec<u8>>), PtyError> {
        let pty_system = NativePtySystem::default();
        let pair = pty_system
            .openpty(PtySize { rows: config.rows, cols: config.cols, pixel_width: 0, pixel_height: 0 })
            .map_err(|err| PtyError::Pty(err.to_string()))?;

        let mut cmd = CommandBuilder::new(&config.shell);
        cmd.cwd(&config.working_dir);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        let child = pair.slave.spawn_command(cmd).map_err(|err| PtyError::Pty(err.to_string()))?;
        let child_pid = child.process_id().map(|pid| pid as i32);

        let mut reader = pair.master.try_clone_reader().map_err(|err| PtyError::Pty(err.to_string()))?;
        let writer = pair.master.take_writer().map_err(|err| PtyError::Pty(err.to_string()))?;

        let (tx, rx) = mpsc::channel(256);
        std::thread::spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match std::io::Read::read(&mut reader, &mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.blocking_send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        let session = Arc::new(Self {
            id,
            master: AsyncMutex::new(pair.master),
            writer: AsyncMutex::new(writer),
            child_pid,
            closed: AtomicBool::new(false),
            callbacks: AsyncMutex::new(Callbacks::default()),
        });

        Ok((session, rx))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn write_input(&self, bytes: &[u8]) -> Result<(), PtyError> {
        if self.is_closed() {
            return Ok(());
        }
        self.writer.lock().await.write_all(bytes).map_err(|err| PtyError::Pty(err.to_string()))
    }

    pub async fn resize(&self, cols: u16, rows: u16) -> Result<(), PtyError> {
        if self.is_closed() {
            return Ok(());
        }
        self.master
            .lock()
            .await
            .resize(PtySize { cols, rows, pixel_width: 0, pixel_height: 0 })
            .map_err(|err| PtyError::Pty(err.to_string()))
    }

    pub async fn set_on_data(&self, callback: impl Fn(Vec<u8>) + Send + Sync + 'static) {
        self.callbacks.lock().await.on_data = Some(Box::new(callback));
    }

    pub async fn set_on_close(&self, callback: impl FnOnce() + Send + 'static) {
        self.callbacks.lock().await.on_close = Some(Box::new(callback));
    }

    async fn deliver_data(&self, bytes: Vec<u8>) {
        let callbacks = self.callbacks.lock().await;
        if let Some(on_data) = &callbacks.on_data {
            on_data(bytes);
        }
    }

    async fn deliver_close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut callbacks = self.callbacks.lock().await;
        if let Some(on_close) = callbacks.on_close.take() {
            on_close();
        }
    }

    /// Idempotent: `SIGTERM`, wait up to 2s, then `SIGKILL`.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(pid) = self.child_pid {
            let target = Pid::from_raw(pid);
            let _ = signal::kill(target, Signal::SIGTERM);
            let deadline = tokio::time::sleep(CLOSE_GRACE);
            tokio::pin!(deadline);
            tokio::select! {
                _ = &mut deadline => {
                    let _ = signal::kill(target, Signal::SIGKILL);
                }
            }
        }
        let mut callbacks = self.callbacks.lock().await;
        if let Some(on_close) = callbacks.on_close.take() {
            on_close();
        }
    }
}

/// Maps session id to session. Readers (`get`/`list`) use the shared side of
/// the lock; `create`/`remove`/`cleanup` take it exclusively. The map itself
/// is reference-counted so the reader task spawned by `create` can prune its
/// own entry on EOF without needing an `Arc<PtyMultiplexer>`.
pub struct PtyMultiplexer {
    sessions: Arc<RwLock<HashMap<String, Arc<PtySession>>>>,
}

impl Default for PtyMultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl PtyMultiplexer {
    pub fn new() -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn create(&self, id: &str, config: &PtyConfig) -> Result<Arc<PtySession>, PtyError> {
        if self.sessions.read().contains_key(id) {
            return Err(PtyError::Duplicate(id.to_string()));
        }

        let (session, mut rx) = PtySession::spawn(id.to_string(), config)?;
        self.sessions.write().insert(id.to_string(), session.clone());

        let reader_session = session.clone();
        let sessions = self.sessions.clone();
        let reader_id = id.to_string();
        tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                reader_session.deliver_data(chunk).await;
            }
            reader_session.deliver_close().await;
            sessions.write().remove(&reader_id);
        });

        Ok(session)
    }

    pub fn get(&self, id: &str) -> Option<Arc<PtySession>> {
        self.sessions.read().get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> Result<(), PtyError> {
        let session = self.sessions.write().remove(id).ok_or_else(|| PtyError::NotFound(id.to_string()))?;
        session.close().await;
        Ok(())
    }

    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }

    pub async fn cleanup(&self) {
        let sessions: Vec<_> = self.sessions.write().drain().map(|(_, session)| session).collect();
        for session in sessions {
            session.close().await;
        }
    }
}

#[cfg(test)]
#[path = "pty_tests.rs"]
mod tests;
