// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::rm::{ResourceManagerClient, RmError};
use async_trait::async_trait;
use ferry_core::{
    ApplicationId, ApplicationReport, ApplicationState, Endpoint, NewApplication,
    SubmissionContext,
};
use tracing::Instrument;

/// Wrapper that adds tracing to any ResourceManagerClient
#[derive(Clone)]
pub struct TracedResourceManager<R> {
    inner: R,
}

impl<R> TracedResourceManager<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: ResourceManagerClient> ResourceManagerClient for TracedResourceManager<R> {
    fn endpoint(&self) -> &Endpoint {
        self.inner.endpoint()
    }

    async fn start(&self) -> Result<(), RmError> {
        let result = self.inner.start().await;
        tracing::info_span!("rm.start", endpoint = %self.endpoint()).in_scope(|| match &result {
            Ok(()) => tracing::info!("client started"),
            Err(e) => tracing::error!(error = %e, "start failed"),
        });
        result
    }

    async fn stop(&self) -> Result<(), RmError> {
        let result = self.inner.stop().await;
        tracing::info_span!("rm.stop", endpoint = %self.endpoint()).in_scope(|| match &result {
            Ok(()) => tracing::info!("client stopped"),
            Err(e) => tracing::warn!(error = %e, "stop failed"),
        });
        result
    }

    async fn create_application(&self) -> Result<NewApplication, RmError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.create_application().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(app) => tracing::info!(
                    app_id = %app.application_id,
                    max_memory_mbs = app.maximum_capability.memory_mbs,
                    max_vcores = app.maximum_capability.vcores,
                    elapsed_ms,
                    "application created"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "create failed"),
            }
            result
        }
        .instrument(tracing::info_span!("rm.create", endpoint = %self.endpoint()))
        .await
    }

    async fn submit_application(
        &self,
        context: &SubmissionContext,
    ) -> Result<ApplicationId, RmError> {
        let span = tracing::info_span!(
            "rm.submit",
            endpoint = %self.endpoint(),
            app_id = %context.application_id,
            name = %context.application_name,
        );
        async {
            tracing::info!(
                queue = %context.queue,
                memory_mbs = context.resource.memory_mbs,
                vcores = context.resource.vcores,
                resources = context.master.local_resources.len(),
                "submitting"
            );
            let start = std::time::Instant::now();
            let result = self.inner.submit_application(context).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(id) => tracing::info!(accepted_id = %id, elapsed_ms, "application submitted"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "submit failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn application_report(
        &self,
        id: &ApplicationId,
    ) -> Result<ApplicationReport, RmError> {
        let start = std::time::Instant::now();
        let result = self.inner.application_report(id).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(report) => tracing::debug!(
                app_id = %id,
                state = %report.state,
                elapsed_ms,
                "report fetched"
            ),
            Err(e) => tracing::warn!(app_id = %id, elapsed_ms, error = %e, "report fetch failed"),
        }
        result
    }

    async fn list_applications(
        &self,
        types: &[&str],
        states: &[ApplicationState],
    ) -> Result<Vec<ApplicationReport>, RmError> {
        let result = self.inner.list_applications(types, states).await;
        tracing::info_span!("rm.list", endpoint = %self.endpoint()).in_scope(|| match &result {
            Ok(reports) => tracing::debug!(count = reports.len(), "listed"),
            Err(e) => tracing::error!(error = %e, "list failed"),
        });
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
