// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Refresher that rewrites the token file on distributed storage

use super::{RefresherArgs, RefresherError, TokenRefresher};
use crate::security::fetch_filesystem_tokens;
use crate::services::{PeriodicTask, Service, ServiceError};
use async_trait::async_trait;
use ferry_adapters::{ClusterCoordinator, FileSystem};
use ferry_core::ClusterMessage;
use parking_lot::Mutex;
use std::sync::Arc;

struct Shared<F: FileSystem> {
    args: RefresherArgs<F>,
    coordinator: Option<Arc<dyn ClusterCoordinator>>,
}

impl<F: FileSystem> Shared<F> {
    async fn renew(&self) -> Result<(), RefresherError> {
        let security = &self.args.security;
        let mut services = vec![self.args.fs.uri()];
        services.extend(self.args.config.other_namenodes.iter().cloned());

        let renewer = security
            .resource_manager_principal()
            .await
            .map_err(|e| RefresherError::Renewal(e.to_string()))?;
        let mut credentials = security
            .current_credentials()
            .await
            .map_err(|e| RefresherError::Renewal(e.to_string()))?;
        let fresh = fetch_filesystem_tokens(security.as_ref(), &services, &renewer)
            .await
            .map_err(|e| RefresherError::Renewal(e.to_string()))?;
        credentials.merge(fresh);

        self.args
            .fs
            .write(&self.args.token_file, &credentials.encode())
            .await
            .map_err(|e| RefresherError::Renewal(e.to_string()))?;
        tracing::info!(
            path = %self.args.token_file.display(),
            tokens = credentials.len(),
            "wrote token file"
        );

        if let Some(coordinator) = &self.coordinator {
            if let Err(e) = coordinator
                .send_message(ClusterMessage::TokenFileUpdated)
                .await
            {
                tracing::warn!(error = %e, "failed to announce token file update");
            }
        }
        Ok(())
    }
}

/// Logs in, writes the token file, then rewrites it every
/// `token_renew_interval_secs`.
pub struct FileTokenRefresher<F: FileSystem> {
    shared: Arc<Shared<F>>,
    renewal: Mutex<Option<PeriodicTask>>,
}

impl<F: FileSystem> FileTokenRefresher<F> {
    pub const NAME: &'static str = "FileTokenRefresher";

    pub fn new(args: RefresherArgs<F>) -> Self {
        Self::build(args, None)
    }

    /// A refresher that also announces each rewrite through `coordinator`
    pub fn with_coordinator(
        args: RefresherArgs<F>,
        coordinator: Arc<dyn ClusterCoordinator>,
    ) -> Self {
        Self::build(args, Some(coordinator))
    }

    fn build(args: RefresherArgs<F>, coordinator: Option<Arc<dyn ClusterCoordinator>>) -> Self {
        Self {
            shared: Arc::new(Shared { args, coordinator }),
            renewal: Mutex::new(None),
        }
    }

    pub fn has_coordinator(&self) -> bool {
        self.shared.coordinator.is_some()
    }

    pub fn is_scheduled(&self) -> bool {
        self.renewal.lock().is_some()
    }

    /// Fetch tokens and rewrite the token file once
    pub async fn renew(&self) -> Result<(), RefresherError> {
        self.shared.renew().await
    }
}

#[async_trait]
impl<F: FileSystem> Service for FileTokenRefresher<F> {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.schedule_token_renewal();
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        let task = self.renewal.lock().take();
        if let Some(task) = task {
            task.stop().await;
        }
        Ok(())
    }
}

#[async_trait]
impl<F: FileSystem> TokenRefresher for FileTokenRefresher<F> {
    async fn login(&self) -> Result<(), RefresherError> {
        self.shared
            .args
            .security
            .login()
            .await
            .map_err(|e| RefresherError::Login(e.to_string()))?;
        self.renew().await
    }

    fn schedule_token_renewal(&self) {
        let mut renewal = self.renewal.lock();
        if renewal.is_some() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let period = shared.args.config.token_renew_interval();
        *renewal = Some(PeriodicTask::spawn_after(Self::NAME, period, move || {
            let shared = Arc::clone(&shared);
            async move {
                if let Err(e) = shared.renew().await {
                    tracing::error!(error = %e, "token renewal failed");
                }
            }
        }));
    }

    fn into_service(self: Arc<Self>) -> Arc<dyn Service> {
        self
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
