// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded-time execution of external calls.
//!
//! On timeout the inner future is dropped, which cancels it at its next
//! await point (and kills child processes spawned with `kill_on_drop`).

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} timed out after {}ms", timeout.as_millis())]
pub struct TimeoutError {
    pub operation: String,
    pub timeout: Duration,
}

/// Await `future` for at most `timeout`
pub async fn run_with_timeout<F: Future>(
    future: F,
    timeout: Duration,
    operation: &str,
) -> Result<F::Output, TimeoutError> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| TimeoutError {
            operation: operation.to_string(),
            timeout,
        })
}

#[cfg(test)]
#[path = "timeout_tests.rs"]
mod tests;
