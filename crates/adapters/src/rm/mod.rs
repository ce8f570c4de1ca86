// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource manager client adapters

mod bridge;

pub use bridge::BridgeResourceManager;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeResourceManager, RmCall};

use async_trait::async_trait;
use ferry_core::{
    ApplicationId, ApplicationReport, ApplicationState, Endpoint, NewApplication,
    SubmissionContext,
};
use thiserror::Error;

/// Errors from resource manager operations
#[derive(Debug, Error)]
pub enum RmError {
    #[error("client for {0} is not started")]
    NotStarted(Endpoint),
    #[error("rpc to {endpoint} failed: {message}")]
    Rpc { endpoint: Endpoint, message: String },
    #[error("unknown application {0}")]
    UnknownApplication(ApplicationId),
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid bridge command: {0:?}")]
    InvalidCommand(String),
}

/// Client for one resource manager endpoint.
///
/// Calls other than `start` fail with [`RmError::NotStarted`] until the
/// client is started, and again after it is stopped.
#[async_trait]
pub trait ResourceManagerClient: Clone + Send + Sync + 'static {
    fn endpoint(&self) -> &Endpoint;

    async fn start(&self) -> Result<(), RmError>;

    /// Stop the client. Stopping a stopped client is a no-op.
    async fn stop(&self) -> Result<(), RmError>;

    /// Allocate an application id and report the cluster's per-container ceiling
    async fn create_application(&self) -> Result<NewApplication, RmError>;

    /// Submit an application. Returns the id the resource manager accepted.
    async fn submit_application(
        &self,
        context: &SubmissionContext,
    ) -> Result<ApplicationId, RmError>;

    async fn application_report(&self, id: &ApplicationId)
        -> Result<ApplicationReport, RmError>;

    /// List applications whose type is in `types` and state is in `states`
    async fn list_applications(
        &self,
        types: &[&str],
        states: &[ApplicationState],
    ) -> Result<Vec<ApplicationReport>, RmError>;
}
