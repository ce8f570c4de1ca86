// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped release of acquired handles.
//!
//! Handles are registered as they are acquired and closed in reverse
//! order by [`Closer::close_all`], once, whichever path reaches it first.

use async_trait::async_trait;
use ferry_adapters::{ClusterCoordinator, FileSystem};
use parking_lot::Mutex;
use std::sync::Arc;

#[async_trait]
pub trait Closeable: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn close(&self) -> Result<(), String>;
}

#[derive(Default)]
pub struct Closer {
    handles: Mutex<Vec<Arc<dyn Closeable>>>,
}

impl Closer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handle: Arc<dyn Closeable>) {
        self.handles.lock().push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Close every registered handle in reverse registration order.
    ///
    /// Failures are logged; every handle is attempted. Handles are
    /// drained, so a second call closes nothing.
    pub async fn close_all(&self) -> usize {
        let handles: Vec<_> = std::mem::take(&mut *self.handles.lock());
        let mut failures = 0;
        for handle in handles.into_iter().rev() {
            if let Err(e) = handle.close().await {
                tracing::warn!(handle = handle.name(), error = %e, "failed to close");
                failures += 1;
            }
        }
        failures
    }
}

/// Filesystem handle registered with a [`Closer`]
pub(crate) struct FsHandle<F>(pub F);

#[async_trait]
impl<F: FileSystem> Closeable for FsHandle<F> {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn close(&self) -> Result<(), String> {
        self.0.close().await.map_err(|e| e.to_string())
    }
}

/// Cluster coordinator registered with a [`Closer`]
pub(crate) struct CoordinatorHandle(pub Arc<dyn ClusterCoordinator>);

#[async_trait]
impl Closeable for CoordinatorHandle {
    fn name(&self) -> &str {
        "cluster coordinator"
    }

    async fn close(&self) -> Result<(), String> {
        self.0.close().await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
#[path = "closer_tests.rs"]
mod tests;
