// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The duplex stream frame format (§6): one JSON text frame per WebSocket
//! message, always an object of shape `{"event": <string>, "data": <any>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: impl Serialize) -> Self {
        Self { event: event.into(), data: serde_json::to_value(data).unwrap_or(Value::Null) }
    }

    /// A frame carrying no payload, for events like `terminalClosed`.
    pub fn empty(event: impl Into<String>) -> Self {
        Self { event: event.into(), data: Value::Null }
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
