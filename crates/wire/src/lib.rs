// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The duplex stream wire format between a browser and the Runtime Agent
//! (§6): JSON text frames of shape `{"event": <string>, "data": <any>}`, a
//! bounded outbound queue, and a typed per-event handler registry.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod frame;
pub mod handler;
pub mod outbound;

pub use error::WireError;
pub use frame::Frame;
pub use handler::{on_typed, Handler, HandlerRegistry};
pub use outbound::{Emitter, OUTBOUND_QUEUE_CAPACITY};
