// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    new        = { ApplicationState::New, false, true },
    new_saving = { ApplicationState::NewSaving, false, true },
    submitted  = { ApplicationState::Submitted, false, true },
    accepted   = { ApplicationState::Accepted, false, true },
    running    = { ApplicationState::Running, false, true },
    finished   = { ApplicationState::Finished, true, false },
    failed     = { ApplicationState::Failed, true, false },
    killed     = { ApplicationState::Killed, true, false },
)]
fn state_classification(state: ApplicationState, terminal: bool, reconnectable: bool) {
    assert_eq!(state.is_terminal(), terminal);
    assert_eq!(state.is_reconnectable(), reconnectable);
}

#[test]
fn terminal_and_reconnectable_are_disjoint() {
    for state in RECONNECTABLE_STATES {
        assert!(!state.is_terminal(), "{state} should not be terminal");
    }
}

#[test]
fn state_uses_resource_manager_spelling() {
    let json = serde_json::to_string(&ApplicationState::NewSaving).unwrap();
    assert_eq!(json, "\"NEW_SAVING\"");
    assert_eq!(ApplicationState::NewSaving.to_string(), "NEW_SAVING");
}

#[test]
fn report_deserializes_with_defaults() {
    let report: ApplicationReport = serde_json::from_str(
        r#"{"application_id":"application_1_0001","name":"ingest","state":"RUNNING"}"#,
    )
    .unwrap();
    assert_eq!(report.application_id, "application_1_0001");
    assert_eq!(report.final_status, FinalStatus::Undefined);
    assert!(report.usage.is_none());
    assert!(!report.is_terminal());
}
