// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ferry_core::test_support::report;
use ferry_core::{LaunchContext, RECONNECTABLE_STATES, APPLICATION_TYPE};
use std::collections::BTreeSet;

#[tokio::test]
async fn create_application_allocates_sequential_ids() {
    let rm = FakeResourceManager::default();
    rm.start().await.unwrap();

    let first = rm.create_application().await.unwrap();
    let second = rm.create_application().await.unwrap();
    assert_eq!(first.application_id.sequence(), Some(1));
    assert_eq!(second.application_id.sequence(), Some(2));
    assert_eq!(first.maximum_capability, Resource::new(8192, 8));
}

#[tokio::test]
async fn scripted_reports_take_precedence() {
    let rm = FakeResourceManager::default();
    rm.start().await.unwrap();
    let id = ApplicationId::new("application_1_0001");
    rm.add_application(report(id.as_str(), "demo", ApplicationState::Running));
    rm.push_report(Err("connection refused".to_string()));

    assert!(rm.application_report(&id).await.is_err());
    let fetched = rm.application_report(&id).await.unwrap();
    assert_eq!(fetched.state, ApplicationState::Running);
    assert_eq!(rm.report_count(), 2);
}

#[tokio::test]
async fn list_filters_by_type_and_state() {
    let rm = FakeResourceManager::default();
    rm.start().await.unwrap();
    rm.add_application(report("application_1_0001", "a", ApplicationState::Running));
    rm.add_application(report("application_1_0002", "b", ApplicationState::Finished));
    let mut other = report("application_1_0003", "c", ApplicationState::Running);
    other.application_type = "MAPREDUCE".to_string();
    rm.add_application(other);

    let listed = rm
        .list_applications(&[APPLICATION_TYPE], &RECONNECTABLE_STATES)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "a");
}

#[tokio::test]
async fn unstarted_fake_rejects_calls() {
    let rm = FakeResourceManager::default();
    assert!(matches!(
        rm.create_application().await,
        Err(RmError::NotStarted(_))
    ));
    assert_eq!(rm.calls(), vec![RmCall::CreateApplication]);
}

fn context(id: &ApplicationId) -> SubmissionContext {
    SubmissionContext {
        application_id: id.clone(),
        application_name: "demo".to_string(),
        application_type: APPLICATION_TYPE.to_string(),
        queue: "default".to_string(),
        priority: 0,
        max_attempts: 1,
        tags: BTreeSet::new(),
        resource: Resource::new(1024, 1),
        master: LaunchContext::default(),
    }
}

#[tokio::test]
async fn application_on_submit_is_hidden_until_submitted() {
    let rm = FakeResourceManager::default();
    rm.start().await.unwrap();
    let id = rm.create_application().await.unwrap().application_id;
    rm.add_application_on_submit(report(id.as_str(), "demo", ApplicationState::Accepted));

    let before = rm
        .list_applications(&[APPLICATION_TYPE], &RECONNECTABLE_STATES)
        .await
        .unwrap();
    assert!(before.is_empty());
    assert!(rm.application_report(&id).await.is_err());

    let submitted = rm.submit_application(&context(&id)).await.unwrap();

    assert_eq!(submitted, id);
    let fetched = rm.application_report(&id).await.unwrap();
    assert_eq!(fetched.state, ApplicationState::Accepted);
}

#[tokio::test]
async fn application_on_submit_follows_overridden_id() {
    let rm = FakeResourceManager::default();
    rm.start().await.unwrap();
    let created = rm.create_application().await.unwrap().application_id;
    let returned = ApplicationId::new("application_1700000000000_0099");
    rm.set_submit_id(returned.clone());
    rm.add_application_on_submit(report(returned.as_str(), "demo", ApplicationState::Accepted));

    assert_eq!(rm.submit_application(&context(&created)).await.unwrap(), returned);
    assert!(rm.application_report(&returned).await.is_ok());
    assert!(rm.application_report(&created).await.is_err());
}
