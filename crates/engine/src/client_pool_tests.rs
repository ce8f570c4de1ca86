// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ferry_adapters::{FakeResourceManager, RmCall};
use ferry_core::test_support::report;
use ferry_core::ApplicationState;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn started_pool(clients: &[&FakeResourceManager]) -> ClientPool<FakeResourceManager> {
    let pool = ClientPool::new(clients.iter().map(|c| (*c).clone()).collect());
    pool.start_all().await.unwrap();
    pool
}

#[tokio::test]
async fn pool_is_built_primary_first() {
    let endpoints = vec![Endpoint::new("rm-a:8032"), Endpoint::new("rm-b:8032")];
    let pool = ClientPool::from_endpoints(&endpoints, |e| {
        Ok::<_, RmError>(FakeResourceManager::new(e.as_str()))
    })
    .unwrap();

    assert_eq!(pool.endpoints(), endpoints);
    assert_eq!(pool.primary().unwrap().endpoint().as_str(), "rm-a:8032");
    assert_eq!(pool.active().unwrap().endpoint().as_str(), "rm-a:8032");
}

#[tokio::test]
async fn reconnect_adopts_first_match_and_its_client() {
    let a = FakeResourceManager::new("rm-a:8032");
    let b = FakeResourceManager::new("rm-b:8032");
    a.add_application(report("application_1_0001", "other", ApplicationState::Running));
    b.add_application(report("application_1_0002", "ingest", ApplicationState::Accepted));
    let pool = started_pool(&[&a, &b]).await;

    let found = pool.find_reconnectable("ingest", TIMEOUT).await;

    assert_eq!(found, Some(ApplicationId::new("application_1_0002")));
    assert_eq!(pool.active().unwrap().endpoint().as_str(), "rm-b:8032");
}

#[tokio::test]
async fn terminal_applications_are_never_adopted() {
    for state in [
        ApplicationState::Finished,
        ApplicationState::Failed,
        ApplicationState::Killed,
    ] {
        let a = FakeResourceManager::new("rm-a:8032");
        a.add_application(report("application_1_0001", "ingest", state));
        let pool = started_pool(&[&a]).await;

        assert_eq!(pool.find_reconnectable("ingest", TIMEOUT).await, None, "{state}");
    }
}

#[tokio::test]
async fn failed_listing_falls_through_to_next_client() {
    let a = FakeResourceManager::new("rm-a:8032");
    let b = FakeResourceManager::new("rm-b:8032");
    a.fail_list("standby");
    b.add_application(report("application_1_0003", "ingest", ApplicationState::Running));
    let pool = started_pool(&[&a, &b]).await;

    let found = pool.find_reconnectable("ingest", TIMEOUT).await;

    assert_eq!(found, Some(ApplicationId::new("application_1_0003")));
}

#[tokio::test]
async fn no_match_keeps_primary_active() {
    let a = FakeResourceManager::new("rm-a:8032");
    let b = FakeResourceManager::new("rm-b:8032");
    let pool = started_pool(&[&a, &b]).await;

    assert_eq!(pool.find_reconnectable("ingest", TIMEOUT).await, None);
    assert_eq!(pool.active().unwrap().endpoint().as_str(), "rm-a:8032");
    assert_eq!(a.calls(), vec![RmCall::Start, RmCall::List]);
}

#[tokio::test]
async fn stop_all_stops_every_client() {
    let a = FakeResourceManager::new("rm-a:8032");
    let b = FakeResourceManager::new("rm-b:8032");
    let pool = started_pool(&[&a, &b]).await;

    pool.stop_all().await.unwrap();

    assert!(!a.is_started());
    assert!(!b.is_started());
}

#[tokio::test]
async fn start_failure_is_reported() {
    let a = FakeResourceManager::new("rm-a:8032");
    a.fail_start("connection refused");
    let pool = ClientPool::new(vec![a]);

    assert!(matches!(pool.start_all().await, Err(RmError::Rpc { .. })));
}
