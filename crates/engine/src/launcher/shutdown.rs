// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered, single-flight teardown.

use super::{Launcher, LauncherPhase};
use crate::error::LauncherError;
use ferry_adapters::{FileSystem, FileSystemProvider, NotifyAdapter, ResourceManagerClient};
use ferry_core::{Clock, ClusterMessage};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

impl<R, P, N, C> Launcher<R, P, N, C>
where
    R: ResourceManagerClient,
    P: FileSystemProvider,
    N: NotifyAdapter,
    C: Clock,
{
    /// Stop the launcher.
    ///
    /// Only the first caller runs the teardown; later and concurrent
    /// callers return immediately (use [`Launcher::wait_stopped`] to wait
    /// for completion). Every step is attempted even when an earlier one
    /// fails, and the first failure is returned.
    pub async fn stop(&self) -> Result<(), LauncherError> {
        {
            let mut claimed = self.inner.stop_claimed.lock();
            if *claimed {
                return Ok(());
            }
            *claimed = true;
        }
        tracing::info!(application = %self.inner.config.application_name, "stopping launcher");
        self.set_phase(LauncherPhase::ShuttingDown);

        let config = &self.inner.config;
        let timeout = config.service_stop_timeout();
        let mut first_error: Option<LauncherError> = None;

        let services = self.inner.services.lock().take();
        if let Some(services) = services {
            if let Err(e) = services.stop_all(timeout).await {
                tracing::error!(error = %e, "failed to stop services");
                first_error.get_or_insert(e.into());
            }
        }
        // A refresher scheduled before start failed never joined the service set
        let refresher = self.inner.refresher.lock().take();
        if let Some(refresher) = refresher {
            if let Err(e) = refresher.into_service().stop().await {
                tracing::warn!(error = %e, "failed to stop token refresher");
            }
        }

        let poller = self.inner.poller.lock().take();
        if let Some(poller) = poller {
            if let Err(e) = poller.stop(timeout).await {
                tracing::error!(error = %e, "report poller did not stop in time");
                first_error.get_or_insert(e.into());
            }
        }

        if let Err(e) = self.inner.clients.stop_all().await {
            first_error.get_or_insert(e.into());
        }

        if self.is_application_running() {
            self.signal_master_shutdown().await;
        }

        let application_id = self.application_id();
        if let Some(id) = application_id.filter(|_| !config.detach_on_exit) {
            let mut work_dirs = vec![config.app_work_dir(id.as_str())];
            let staged = self.inner.staged_work_dir.lock().take();
            if let Some(staged) = staged.filter(|dir| !work_dirs.contains(dir)) {
                work_dirs.push(staged);
            }
            if let Err(e) = self.clean_up_work_dirs(&work_dirs).await {
                tracing::error!(error = %e, "failed to clean up application work directory");
                first_error.get_or_insert(e);
            }
        }

        let failures = self.inner.closer.close_all().await;
        if failures > 0 {
            tracing::warn!(failures, "some handles failed to close");
        }

        self.set_phase(LauncherPhase::Stopped);
        self.inner.stopped.send_replace(true);
        tracing::info!("launcher stopped");
        first_error.map_or(Ok(()), Err)
    }

    /// Wait until a stop has completed and the event handler has drained.
    pub async fn wait_stopped(&self) {
        let mut stopped = self.inner.stopped.subscribe();
        let _ = stopped.wait_for(|s| *s).await;
        let handler = self.inner.handler.lock().take();
        if let Some(handler) = handler {
            let _ = handler.await;
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.stopped.borrow()
    }

    /// Tell the application master to shut down. The running flag is
    /// cleared before the message goes out.
    async fn signal_master_shutdown(&self) {
        let Some(coordinator) = &self.inner.coordinator else {
            return;
        };
        self.inner.running.store(false, Ordering::SeqCst);
        match coordinator
            .send_message(ClusterMessage::ApplicationMasterShutdown)
            .await
        {
            Ok(()) => tracing::info!("sent shutdown request to application master"),
            Err(e) => tracing::error!(error = %e, "failed to send shutdown request to application master"),
        }
    }

    /// Delete the application's work directories through a fresh handle.
    ///
    /// The handle acquired at start may already be closed by the time
    /// teardown runs, so a new one is connected and closed here. Every
    /// directory is attempted; the first failure is returned.
    async fn clean_up_work_dirs(&self, work_dirs: &[PathBuf]) -> Result<(), LauncherError> {
        let fs = self.inner.filesystems.connect()?;
        let mut deleted = Ok(());
        for work_dir in work_dirs {
            let result = async {
                if fs.exists(work_dir).await? {
                    tracing::info!(path = %work_dir.display(), "deleting application work directory");
                    fs.delete(work_dir, true).await?;
                }
                Ok::<_, LauncherError>(())
            }
            .await;
            if deleted.is_ok() {
                deleted = result;
            }
        }
        if let Err(e) = fs.close().await {
            tracing::warn!(error = %e, "failed to close cleanup filesystem handle");
        }
        deleted
    }
}
