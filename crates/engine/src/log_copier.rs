// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copies container logs from distributed storage to a local sink

use crate::services::{PeriodicTask, Service, ServiceError};
use async_trait::async_trait;
use ferry_adapters::{FileSystem, FsError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Log file extensions that are copied
pub const LOG_EXTENSIONS: [&str; 2] = ["stdout", "stderr"];

struct CopyState<F: FileSystem> {
    fs: F,
    src: PathBuf,
    dest: PathBuf,
    /// Modification time of each file at its last copy
    copied: Mutex<HashMap<PathBuf, u64>>,
}

impl<F: FileSystem> CopyState<F> {
    async fn copy_changed(&self) -> Result<usize, FsError> {
        let mut pending = vec![self.src.clone()];
        let mut copied = 0;
        while let Some(dir) = pending.pop() {
            let entries = match self.fs.list(&dir).await {
                Ok(entries) => entries,
                Err(FsError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            for entry in entries {
                if entry.is_dir {
                    pending.push(entry.path);
                    continue;
                }
                if !is_log_file(&entry.path) {
                    continue;
                }
                let unchanged = self
                    .copied
                    .lock()
                    .get(&entry.path)
                    .is_some_and(|&m| m >= entry.modified_ms);
                if unchanged {
                    continue;
                }
                let Ok(rel) = entry.path.strip_prefix(&self.src) else {
                    continue;
                };
                let local = self.dest.join(rel);
                self.fs.copy_to_local(&entry.path, &local).await?;
                self.copied.lock().insert(entry.path, entry.modified_ms);
                copied += 1;
            }
        }
        Ok(copied)
    }
}

fn is_log_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| LOG_EXTENSIONS.contains(&e))
}

/// Periodically mirrors new or changed `*.stdout`/`*.stderr` files
pub struct LogCopier<F: FileSystem> {
    state: Arc<CopyState<F>>,
    interval: Duration,
    task: Mutex<Option<PeriodicTask>>,
}

impl<F: FileSystem> LogCopier<F> {
    pub fn new(fs: F, src: impl Into<PathBuf>, dest: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            state: Arc::new(CopyState {
                fs,
                src: src.into(),
                dest: dest.into(),
                copied: Mutex::new(HashMap::new()),
            }),
            interval,
            task: Mutex::new(None),
        }
    }

    /// Copy every log file changed since the last pass. Returns the number
    /// of files copied.
    pub async fn copy_once(&self) -> Result<usize, FsError> {
        self.state.copy_changed().await
    }
}

#[async_trait]
impl<F: FileSystem> Service for LogCopier<F> {
    fn name(&self) -> &str {
        "LogCopier"
    }

    async fn start(&self) -> Result<(), ServiceError> {
        let mut task = self.task.lock();
        if task.is_some() {
            return Ok(());
        }
        tracing::info!(
            src = %self.state.src.display(),
            dest = %self.state.dest.display(),
            "starting log copier"
        );
        let state = Arc::clone(&self.state);
        *task = Some(PeriodicTask::spawn("log-copier", self.interval, move || {
            let state = Arc::clone(&state);
            async move {
                if let Err(e) = state.copy_changed().await {
                    tracing::warn!(error = %e, "log copy failed");
                }
            }
        }));
        Ok(())
    }

    /// Stop the timer and make one last pass
    async fn stop(&self) -> Result<(), ServiceError> {
        let task = self.task.lock().take();
        let Some(task) = task else { return Ok(()) };
        task.stop().await;
        self.copy_once()
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::Stop {
                service: "LogCopier".to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "log_copier_tests.rs"]
mod tests;
