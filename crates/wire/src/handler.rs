// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-event handler dispatch. Each inbound frame is handed to its
//! registered handler on a separate task so a slow handler can't block the
//! reader (§4.9); an unknown event is logged and the stream continues (§8
//! invariant 7).

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
pub type Handler = Arc<dyn Fn(Value) -> BoxFuture + Send + Sync>;

/// Wrap a handler that expects a concrete `T` so it can be registered
/// alongside raw `Value` handlers. The inbound `data` payload is re-encoded
/// and decoded into `T`; a malformed payload is logged and dropped rather
/// than propagated as a stream error.
pub fn on_typed<T, F, Fut>(f: F) -> Handler
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |data: Value| {
        let f = f.clone();
        Box::pin(async move {
            match serde_json::from_value::<T>(data) {
                Ok(typed) => f(typed).await,
                Err(err) => {
                    tracing::warn!(error = %err, "dropping malformed event payload");
                }
            }
        })
    })
}

/// A registry mapping event names to handlers, dispatched on independent
/// tasks.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, event: impl Into<String>, handler: Handler) {
        self.handlers.insert(event.into(), handler);
    }

    /// Look up the handler for `event`, spawning it on its own task if
    /// found. Returns `false` if no handler was registered, so the caller
    /// can log the unknown-event case itself.
    pub fn dispatch(&self, event: &str, data: Value) -> bool {
        match self.handlers.get(event) {
            Some(handler) => {
                let fut = handler(data);
                tokio::spawn(fut);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
