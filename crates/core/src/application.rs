// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application lifecycle state and status reports.

use crate::id::ApplicationId;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an application as reported by the resource manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationState {
    New,
    NewSaving,
    Submitted,
    Accepted,
    Running,
    Finished,
    Failed,
    Killed,
}

/// States under which a restarted launcher resumes monitoring instead of
/// submitting a new application.
pub const RECONNECTABLE_STATES: [ApplicationState; 5] = [
    ApplicationState::New,
    ApplicationState::NewSaving,
    ApplicationState::Submitted,
    ApplicationState::Accepted,
    ApplicationState::Running,
];

impl ApplicationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationState::Finished | ApplicationState::Failed | ApplicationState::Killed
        )
    }

    pub fn is_reconnectable(self) -> bool {
        RECONNECTABLE_STATES.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationState::New => "NEW",
            ApplicationState::NewSaving => "NEW_SAVING",
            ApplicationState::Submitted => "SUBMITTED",
            ApplicationState::Accepted => "ACCEPTED",
            ApplicationState::Running => "RUNNING",
            ApplicationState::Finished => "FINISHED",
            ApplicationState::Failed => "FAILED",
            ApplicationState::Killed => "KILLED",
        }
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome the application master reported when it unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalStatus {
    #[default]
    Undefined,
    Succeeded,
    Failed,
    Killed,
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FinalStatus::Undefined => "UNDEFINED",
            FinalStatus::Succeeded => "SUCCEEDED",
            FinalStatus::Failed => "FAILED",
            FinalStatus::Killed => "KILLED",
        })
    }
}

/// Aggregate resource usage of a running or finished application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub used_containers: u32,
    #[serde(default)]
    pub used_resources: Option<Resource>,
}

/// Point-in-time status of one application. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationReport {
    pub application_id: ApplicationId,
    pub name: String,
    #[serde(default)]
    pub application_type: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub queue: String,
    pub state: ApplicationState,
    #[serde(default)]
    pub final_status: FinalStatus,
    #[serde(default)]
    pub diagnostics: String,
    #[serde(default)]
    pub tracking_url: String,
    #[serde(default)]
    pub current_attempt_id: Option<String>,
    #[serde(default)]
    pub usage: Option<ResourceUsage>,
    /// Epoch milliseconds
    #[serde(default)]
    pub start_time_ms: u64,
    /// Epoch milliseconds, 0 while the application is still running
    #[serde(default)]
    pub finish_time_ms: u64,
}

impl ApplicationReport {
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
#[path = "application_tests.rs"]
mod tests;
