// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster coordinator boundary.
//!
//! The coordinator observes the launcher's running flag and relays
//! [`ClusterMessage`]s to the application's cluster-side members.

mod local;

pub use local::LocalCoordinator;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeCoordinator;

use async_trait::async_trait;
use ferry_core::ClusterMessage;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;

/// Errors from coordinator operations
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("coordinator is closed")]
    Closed,
    #[error("send failed: {0}")]
    SendFailed(String),
}

#[async_trait]
pub trait ClusterCoordinator: Send + Sync + 'static {
    /// Shared flag, true while the application is alive and owned by this launcher
    fn running_flag(&self) -> Arc<AtomicBool>;

    async fn send_message(&self, message: ClusterMessage) -> Result<(), CoordinatorError>;

    async fn close(&self) -> Result<(), CoordinatorError>;
}
