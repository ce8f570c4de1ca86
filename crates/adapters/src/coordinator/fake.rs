// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake coordinator for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ClusterCoordinator, CoordinatorError};
use async_trait::async_trait;
use ferry_core::ClusterMessage;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct FakeCoordinatorState {
    /// Each message with the running flag's value when it was sent
    messages: Vec<(ClusterMessage, bool)>,
    closes: usize,
}

/// Fake coordinator for testing
#[derive(Clone, Default)]
pub struct FakeCoordinator {
    running: Arc<AtomicBool>,
    inner: Arc<Mutex<FakeCoordinatorState>>,
}

impl FakeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<(ClusterMessage, bool)> {
        self.inner.lock().messages.clone()
    }

    pub fn closes(&self) -> usize {
        self.inner.lock().closes
    }
}

#[async_trait]
impl ClusterCoordinator for FakeCoordinator {
    fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    async fn send_message(&self, message: ClusterMessage) -> Result<(), CoordinatorError> {
        let running = self.is_running();
        self.inner.lock().messages.push((message, running));
        Ok(())
    }

    async fn close(&self) -> Result<(), CoordinatorError> {
        self.inner.lock().closes += 1;
        Ok(())
    }
}
