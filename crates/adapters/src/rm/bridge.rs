// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource manager client backed by an external bridge program.
//!
//! Every call runs `<command> --rm <endpoint> <verb> [args]` and reads a
//! JSON document from its stdout. A non-zero exit is an RPC failure whose
//! message is the program's stderr.

use super::{ResourceManagerClient, RmError};
use crate::subprocess::{failure_detail, run_with_timeout, split_command};
use async_trait::async_trait;
use ferry_core::{
    ApplicationId, ApplicationReport, ApplicationState, Endpoint, NewApplication,
    SubmissionContext,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    application_id: ApplicationId,
}

/// Bridge-backed resource manager client
#[derive(Clone)]
pub struct BridgeResourceManager {
    endpoint: Endpoint,
    program: String,
    args: Vec<String>,
    timeout: Duration,
    started: Arc<AtomicBool>,
}

impl BridgeResourceManager {
    pub fn new(command: &str, endpoint: Endpoint, timeout: Duration) -> Result<Self, RmError> {
        let (program, args) =
            split_command(command).ok_or_else(|| RmError::InvalidCommand(command.to_string()))?;
        Ok(Self {
            endpoint,
            program,
            args,
            timeout,
            started: Arc::new(AtomicBool::new(false)),
        })
    }

    fn ensure_started(&self) -> Result<(), RmError> {
        if self.started.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RmError::NotStarted(self.endpoint.clone()))
        }
    }

    fn rpc_error(&self, message: impl Into<String>) -> RmError {
        RmError::Rpc {
            endpoint: self.endpoint.clone(),
            message: message.into(),
        }
    }

    async fn run(&self, verb: &str, extra: &[String]) -> Result<Vec<u8>, RmError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--rm")
            .arg(self.endpoint.as_str())
            .arg(verb)
            .args(extra);
        let description = format!("rm {}", verb);
        let output = run_with_timeout(cmd, self.timeout, &description)
            .await
            .map_err(|e| self.rpc_error(e))?;
        if !output.status.success() {
            return Err(self.rpc_error(format!("{}: {}", verb, failure_detail(&output))));
        }
        Ok(output.stdout)
    }

    async fn call<T: DeserializeOwned>(&self, verb: &str, extra: &[String]) -> Result<T, RmError> {
        self.ensure_started()?;
        let stdout = self.run(verb, extra).await?;
        serde_json::from_slice(&stdout).map_err(|source| RmError::Decode {
            endpoint: self.endpoint.clone(),
            source,
        })
    }

    fn context_file() -> PathBuf {
        std::env::temp_dir().join(format!("ferry-submit-{}.json", uuid::Uuid::new_v4()))
    }
}

#[async_trait]
impl ResourceManagerClient for BridgeResourceManager {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn start(&self) -> Result<(), RmError> {
        self.run("ping", &[]).await?;
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), RmError> {
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn create_application(&self) -> Result<NewApplication, RmError> {
        self.call("new-application", &[]).await
    }

    async fn submit_application(
        &self,
        context: &SubmissionContext,
    ) -> Result<ApplicationId, RmError> {
        self.ensure_started()?;
        let body = serde_json::to_vec(context).map_err(|source| RmError::Decode {
            endpoint: self.endpoint.clone(),
            source,
        })?;
        let path = Self::context_file();
        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| self.rpc_error(format!("writing {}: {}", path.display(), e)))?;

        let result: Result<SubmitResponse, RmError> = self
            .call("submit", &["--context".to_string(), path.display().to_string()])
            .await;
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::debug!(path = %path.display(), error = %e, "failed to remove submission file");
        }
        Ok(result?.application_id)
    }

    async fn application_report(
        &self,
        id: &ApplicationId,
    ) -> Result<ApplicationReport, RmError> {
        self.call("report", &[id.to_string()]).await
    }

    async fn list_applications(
        &self,
        types: &[&str],
        states: &[ApplicationState],
    ) -> Result<Vec<ApplicationReport>, RmError> {
        let states: Vec<&str> = states.iter().map(|s| s.as_str()).collect();
        let extra = vec![
            "--types".to_string(),
            types.join(","),
            "--states".to_string(),
            states.join(","),
        ];
        self.call("list", &extra).await
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
