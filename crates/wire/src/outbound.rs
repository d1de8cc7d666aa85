// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bounded outbound queue each stream writer drains from (§5: capacity
//! 256, full queue yields `Backpressure` rather than blocking the caller).

use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::WireError;
use crate::frame::Frame;

pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Producer handle for a stream's outbound queue. Cheap to clone; every
/// in-flight handler task gets its own clone so it can `emit` without holding
/// a lock on the stream.
#[derive(Clone)]
pub struct Emitter {
    tx: mpsc::Sender<Frame>,
}

impl Emitter {
    pub fn new(tx: mpsc::Sender<Frame>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        (Self::new(tx), rx)
    }

    /// Enqueue a frame without blocking. Non-blocking by construction: a full
    /// queue returns `Backpressure`, a torn-down receiver returns
    /// `ClosedChannel`. Never awaits.
    pub fn emit(&self, event: impl Into<String>, data: impl Serialize) -> Result<(), WireError> {
        let frame = Frame::new(event, data);
        self.try_send(frame)
    }

    pub fn emit_empty(&self, event: impl Into<String>) -> Result<(), WireError> {
        self.try_send(Frame::empty(event))
    }

    fn try_send(&self, frame: Frame) -> Result<(), WireError> {
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(WireError::Backpressure),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(WireError::ClosedChannel),
        }
    }
}

#[cfg(test)]
#[path = "outbound_tests.rs"]
mod tests;
