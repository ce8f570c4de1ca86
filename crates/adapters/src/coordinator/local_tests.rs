// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn messages_reach_subscribers() {
    let coordinator = LocalCoordinator::new("demo");
    let mut rx = coordinator.subscribe();

    coordinator
        .send_message(ClusterMessage::TokenFileUpdated)
        .await
        .unwrap();
    assert_eq!(rx.recv().await.unwrap(), ClusterMessage::TokenFileUpdated);
}

#[tokio::test]
async fn send_without_subscribers_succeeds() {
    let coordinator = LocalCoordinator::new("demo");
    coordinator
        .send_message(ClusterMessage::ApplicationMasterShutdown)
        .await
        .unwrap();
}

#[tokio::test]
async fn closed_coordinator_rejects_messages() {
    let coordinator = LocalCoordinator::new("demo");
    coordinator.close().await.unwrap();
    assert!(matches!(
        coordinator.send_message(ClusterMessage::TokenFileUpdated).await,
        Err(CoordinatorError::Closed)
    ));
}

#[test]
fn running_flag_is_shared() {
    let coordinator = LocalCoordinator::new("demo");
    coordinator.running_flag().store(true, Ordering::SeqCst);
    assert!(coordinator.running_flag().load(Ordering::SeqCst));
}
