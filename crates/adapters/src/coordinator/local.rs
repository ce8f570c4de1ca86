// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process coordinator for clusters without an external coordination service

use super::{ClusterCoordinator, CoordinatorError};
use async_trait::async_trait;
use ferry_core::ClusterMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Coordinator that fans messages out to in-process subscribers
#[derive(Clone)]
pub struct LocalCoordinator {
    cluster: String,
    running: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    tx: broadcast::Sender<ClusterMessage>,
}

impl LocalCoordinator {
    pub fn new(cluster: impl Into<String>) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            cluster: cluster.into(),
            running: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClusterMessage> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl ClusterCoordinator for LocalCoordinator {
    fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    async fn send_message(&self, message: ClusterMessage) -> Result<(), CoordinatorError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Closed);
        }
        // No subscribers is not an error
        let receivers = self.tx.send(message).unwrap_or(0);
        tracing::info!(cluster = %self.cluster, ?message, receivers, "cluster message sent");
        Ok(())
    }

    async fn close(&self) -> Result<(), CoordinatorError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
