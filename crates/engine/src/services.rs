// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subsidiary services started and stopped alongside the launcher

use crate::timeout::{run_with_timeout, TimeoutError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Shortest period a [`PeriodicTask`] runs at
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service {service} failed to start: {message}")]
    Start { service: String, message: String },
    #[error("service {service} failed to stop: {message}")]
    Stop { service: String, message: String },
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

/// A long-running auxiliary service supervised by the launcher
#[async_trait]
pub trait Service: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn start(&self) -> Result<(), ServiceError>;

    /// Stop the service. Stopping a stopped service is a no-op.
    async fn stop(&self) -> Result<(), ServiceError>;
}

/// Services started in order and stopped in reverse order
#[derive(Default)]
pub struct ServiceSet {
    services: Vec<Arc<dyn Service>>,
}

impl ServiceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, service: Arc<dyn Service>) {
        self.services.push(service);
    }

    pub fn names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub async fn start_all(&self) -> Result<(), ServiceError> {
        for service in &self.services {
            tracing::info!(service = service.name(), "starting service");
            service.start().await?;
        }
        Ok(())
    }

    /// Stop every service, bounded by `timeout` overall.
    ///
    /// A failing service does not keep later ones from stopping; the
    /// first failure is returned.
    pub async fn stop_all(&self, timeout: Duration) -> Result<(), ServiceError> {
        let stop = async {
            let mut first_error = None;
            for service in self.services.iter().rev() {
                tracing::info!(service = service.name(), "stopping service");
                if let Err(e) = service.stop().await {
                    tracing::warn!(service = service.name(), error = %e, "service failed to stop");
                    first_error.get_or_insert(e);
                }
            }
            first_error.map_or(Ok(()), Err)
        };
        run_with_timeout(stop, timeout, "stopping services").await?
    }
}

/// A spawned loop that runs a tick immediately and then at a fixed period.
///
/// Ticks are never interrupted; a stop request is honored between ticks.
pub struct PeriodicTask {
    name: String,
    shutdown: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PeriodicTask {
    pub fn spawn<F, Fut>(name: impl Into<String>, period: Duration, tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_at(name.into(), Instant::now(), period, tick)
    }

    /// Like [`PeriodicTask::spawn`], but the first tick waits one period
    pub fn spawn_after<F, Fut>(name: impl Into<String>, period: Duration, tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        Self::spawn_at(name.into(), Instant::now() + period, period, tick)
    }

    fn spawn_at<F, Fut>(name: String, start: Instant, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown, mut stopped) = watch::channel(false);
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(start, period.max(MIN_PERIOD));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => tick().await,
                }
            }
            tracing::debug!(task = %task_name, "periodic task exited");
        });
        Self {
            name,
            shutdown,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Ask the loop to exit and wait for the current tick to finish
    pub async fn stop(&self) {
        let _ = self.shutdown.send(true);
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(task = %self.name, error = %e, "periodic task panicked");
            }
        }
    }

    /// Like [`PeriodicTask::stop`], but a tick still running after
    /// `timeout` is aborted.
    pub async fn stop_within(&self, timeout: Duration) -> Result<(), TimeoutError> {
        let _ = self.shutdown.send(true);
        let handle = self.handle.lock().take();
        let Some(handle) = handle else { return Ok(()) };
        let abort = handle.abort_handle();
        match run_with_timeout(handle, timeout, &format!("stopping {}", self.name)).await {
            Ok(Err(e)) => {
                tracing::warn!(task = %self.name, error = %e, "periodic task panicked");
                Ok(())
            }
            Ok(Ok(())) => Ok(()),
            Err(e) => {
                abort.abort();
                Err(e)
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
