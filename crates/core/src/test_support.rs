// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{
    ApplicationId, ApplicationReport, ApplicationState, FinalStatus, LauncherConfig, Resource,
    ResourceUsage, APPLICATION_TYPE,
};

/// A report for `id`/`name` in `state` with otherwise empty fields.
pub fn report(id: &str, name: &str, state: ApplicationState) -> ApplicationReport {
    ApplicationReport {
        application_id: ApplicationId::new(id),
        name: name.to_string(),
        application_type: APPLICATION_TYPE.to_string(),
        user: "ferry".to_string(),
        queue: "default".to_string(),
        state,
        final_status: match state {
            ApplicationState::Finished => FinalStatus::Succeeded,
            ApplicationState::Failed => FinalStatus::Failed,
            ApplicationState::Killed => FinalStatus::Killed,
            _ => FinalStatus::Undefined,
        },
        diagnostics: String::new(),
        tracking_url: format!("http://rm:8088/proxy/{id}/"),
        current_attempt_id: None,
        usage: None,
        start_time_ms: 0,
        finish_time_ms: 0,
    }
}

/// A finished report carrying diagnostics and usage counters.
pub fn failed_report(id: &str, name: &str, diagnostics: &str) -> ApplicationReport {
    ApplicationReport {
        diagnostics: diagnostics.to_string(),
        current_attempt_id: Some(format!("appattempt_{}_000001", id)),
        usage: Some(ResourceUsage {
            used_containers: 3,
            used_resources: Some(Resource::new(3072, 3)),
        }),
        start_time_ms: 1_000,
        finish_time_ms: 2_000,
        ..report(id, name, ApplicationState::Failed)
    }
}

/// Minimal valid config for `name`.
pub fn config(name: &str) -> LauncherConfig {
    LauncherConfig {
        application_name: name.to_string(),
        ..LauncherConfig::default()
    }
}
