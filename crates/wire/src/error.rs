// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("stream closed")]
    ClosedChannel,

    #[error("backpressure: outbound queue full")]
    Backpressure,
}
