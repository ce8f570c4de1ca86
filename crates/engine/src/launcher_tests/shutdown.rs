// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Teardown tests

use super::*;
use ferry_adapters::RmCall;
use ferry_core::ClusterMessage;

async fn started() -> (TestContext, ApplicationId) {
    let ctx = setup();
    let id = expect_first_application(ctx.rm(), ApplicationState::Running);
    ctx.launcher.start().await.unwrap();
    ctx.tree.add_dir(&work_dir(&id), 0);
    (ctx, id)
}

#[tokio::test]
async fn external_stop_signals_master_and_cleans_up() {
    let (ctx, id) = started().await;
    assert!(ctx.coordinator.is_running());

    ctx.launcher.stop().await.unwrap();
    ctx.launcher.wait_stopped().await;

    // the flag is already cleared when the message goes out
    assert_eq!(
        ctx.coordinator.messages(),
        vec![(ClusterMessage::ApplicationMasterShutdown, false)]
    );
    assert!(!ctx.coordinator.is_running());
    assert_eq!(ctx.coordinator.closes(), 1);
    assert!(!ctx.tree.contains(&work_dir(&id)));
    assert!(ctx.rm().calls().contains(&RmCall::Stop));
    assert_eq!(ctx.launcher.phase(), LauncherPhase::Stopped);
}

#[tokio::test]
async fn concurrent_stops_tear_down_once() {
    let (ctx, id) = started().await;

    let (first, second) = tokio::join!(ctx.launcher.stop(), ctx.launcher.stop());
    ctx.launcher.wait_stopped().await;

    first.unwrap();
    second.unwrap();
    let work_dir = PathBuf::from(work_dir(&id));
    assert_eq!(
        ctx.tree.deletes().iter().filter(|p| **p == work_dir).count(),
        1
    );
    assert_eq!(ctx.coordinator.closes(), 1);
    assert_eq!(
        ctx.rm().calls().iter().filter(|c| **c == RmCall::Stop).count(),
        1
    );
}

#[tokio::test]
async fn stop_again_after_stopped_is_a_no_op() {
    let (ctx, _) = started().await;
    ctx.launcher.stop().await.unwrap();
    let deletes = ctx.tree.deletes().len();

    ctx.launcher.stop().await.unwrap();

    assert_eq!(ctx.tree.deletes().len(), deletes);
    assert!(ctx.launcher.is_stopped());
}

#[tokio::test]
async fn detached_launcher_leaves_application_and_work_dir() {
    let ctx = setup_with(Setup::new(LauncherConfig {
        detach_on_exit: true,
        ..test_config()
    }));
    let id = expect_first_application(ctx.rm(), ApplicationState::Running);
    ctx.launcher.start().await.unwrap();
    ctx.tree.add_dir(&work_dir(&id), 0);

    assert!(!ctx.launcher.is_application_running());
    ctx.launcher.stop().await.unwrap();

    assert!(ctx.tree.contains(&work_dir(&id)));
    assert!(ctx.coordinator.messages().is_empty());
    assert_eq!(ctx.filesystems.connects(), 1);
}

#[tokio::test]
async fn cleanup_failure_is_reported_but_teardown_completes() {
    let (ctx, id) = started().await;
    ctx.tree.fail_delete_of(&work_dir(&id));

    let result = ctx.launcher.stop().await;

    assert!(result.is_err());
    assert!(ctx.launcher.is_stopped());
    assert_eq!(ctx.coordinator.closes(), 1);
}

#[tokio::test]
async fn missing_work_dir_is_not_deleted() {
    let ctx = setup();
    expect_first_application(ctx.rm(), ApplicationState::Running);
    ctx.launcher.start().await.unwrap();

    ctx.launcher.stop().await.unwrap();

    assert!(ctx.tree.deletes().is_empty());
    assert_eq!(ctx.filesystems.connects(), 2);
}

#[tokio::test]
async fn stop_without_start_skips_cleanup() {
    let ctx = setup();

    ctx.launcher.stop().await.unwrap();

    assert_eq!(ctx.filesystems.connects(), 0);
    assert!(ctx.launcher.is_stopped());
    assert!(ctx.coordinator.messages().is_empty());
}

#[tokio::test]
async fn failed_start_can_still_be_stopped() {
    let ctx = setup();
    ctx.rm().fail_create("queue is full");

    assert!(ctx.launcher.start().await.is_err());
    ctx.launcher.stop().await.unwrap();

    assert!(ctx.launcher.is_stopped());
    assert_eq!(ctx.coordinator.closes(), 1);
    assert_eq!(ctx.filesystems.connects(), 1);
}

#[tokio::test]
async fn external_stop_then_notify_sends_not_available_once() {
    let (ctx, _) = started().await;

    ctx.launcher.stop().await.unwrap();
    ctx.launcher.wait_stopped().await;
    ctx.launcher.notify_shutdown(None).await;
    ctx.launcher.notify_shutdown(None).await;

    let calls = ctx.notifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].title, "Ferry application ingest completed");
    assert!(calls[0].message.contains("Not available"));
}

#[tokio::test]
async fn notify_after_completion_is_not_sent_twice() {
    let (ctx, id) = started().await;
    ctx.launcher
        .handle_event(LauncherEvent::ReportArrived(Box::new(report(
            id.as_str(),
            APP,
            ApplicationState::Finished,
        ))))
        .await;

    ctx.launcher.notify_shutdown(None).await;

    let calls = ctx.notifier.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].message.contains("Not available"));
}

#[tokio::test]
async fn stop_removes_work_dir_staged_under_created_id() {
    let ctx = setup();
    let created = app_id(1);
    let returned = ApplicationId::new("application_1700000000000_0099");
    ctx.rm().set_submit_id(returned.clone());
    ctx.rm()
        .add_application_on_submit(report(returned.as_str(), APP, ApplicationState::Running));
    ctx.launcher.start().await.unwrap();
    ctx.tree.add_dir(&work_dir(&created), 0);
    ctx.tree.add_dir(&work_dir(&returned), 0);

    ctx.launcher.stop().await.unwrap();

    assert!(!ctx.tree.contains(&work_dir(&created)));
    assert!(!ctx.tree.contains(&work_dir(&returned)));
    assert_eq!(ctx.filesystems.connects(), 2);
}
