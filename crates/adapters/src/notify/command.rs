// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification adapter that hands the message to a shell command.
//!
//! The command runs under `sh -c` with the subject in
//! `FERRY_NOTIFY_SUBJECT` and the body in `FERRY_NOTIFY_BODY`, e.g.
//! `printf '%s' "$FERRY_NOTIFY_BODY" | mail -s "$FERRY_NOTIFY_SUBJECT" ops@example.com`.

use super::{NotifyAdapter, NotifyError};
use crate::subprocess::{failure_detail, run_with_timeout, NOTIFY_COMMAND_TIMEOUT};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;

pub const SUBJECT_ENV: &str = "FERRY_NOTIFY_SUBJECT";
pub const BODY_ENV: &str = "FERRY_NOTIFY_BODY";

#[derive(Clone, Debug)]
pub struct CommandNotifyAdapter {
    command: String,
    timeout: Duration,
}

impl CommandNotifyAdapter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: NOTIFY_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl NotifyAdapter for CommandNotifyAdapter {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.command)
            .env(SUBJECT_ENV, title)
            .env(BODY_ENV, message);
        let output = run_with_timeout(cmd, self.timeout, "notify command")
            .await
            .map_err(NotifyError::SendFailed)?;
        if !output.status.success() {
            return Err(NotifyError::SendFailed(failure_detail(&output)));
        }
        tracing::info!(title, "notification sent");
        Ok(())
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
