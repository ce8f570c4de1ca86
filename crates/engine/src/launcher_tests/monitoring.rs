// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Report polling and event handling tests

use super::*;
use ferry_adapters::RmCall;
use ferry_core::test_support::failed_report;
use ferry_core::{ClusterMessage, Resource};
use proptest::prelude::*;

fn failure() -> LauncherEvent {
    LauncherEvent::ReportFailed("connection refused".to_string())
}

fn arrived(state: ApplicationState) -> LauncherEvent {
    LauncherEvent::ReportArrived(Box::new(report(app_id(1).as_str(), APP, state)))
}

#[tokio::test(start_paused = true)]
async fn repeated_fetch_failures_shut_the_launcher_down() {
    let ctx = setup_with(Setup::new(LauncherConfig {
        master_memory_mbs: 2048,
        max_report_failures: 2,
        ..test_config()
    }));
    let rm = ctx.rm();
    rm.set_maximum_capability(Resource::new(1024, 8));
    let id = app_id(1);
    rm.push_report(Ok(report(id.as_str(), APP, ApplicationState::Accepted)));
    for _ in 0..3 {
        rm.push_report(Err("connection refused".to_string()));
    }
    ctx.tree.add_dir(&work_dir(&id), 0);

    ctx.launcher.start().await.unwrap();
    ctx.launcher.wait_stopped().await;

    assert_eq!(rm.submissions()[0].resource, Resource::new(1024, 1));
    // one fetch after submission, then three failed polls
    assert_eq!(rm.report_count(), 4);
    assert!(!ctx.tree.contains(&work_dir(&id)));
    assert_eq!(ctx.filesystems.connects(), 2);
    assert_eq!(ctx.launcher.phase(), LauncherPhase::Stopped);

    let calls = ctx.notifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].title, "Ferry application ingest completed");
    assert!(calls[0].message.contains("Not available"));
}

#[tokio::test(start_paused = true)]
async fn terminal_report_from_poll_completes_the_launch() {
    let ctx = setup();
    let rm = ctx.rm();
    let id = app_id(1);
    rm.push_report(Ok(report(id.as_str(), APP, ApplicationState::Accepted)));
    rm.push_report(Ok(report(id.as_str(), APP, ApplicationState::Running)));
    rm.push_report(Ok(failed_report(id.as_str(), APP, "container exited with 137")));

    ctx.launcher.start().await.unwrap();
    ctx.launcher.wait_stopped().await;

    assert!(!ctx.launcher.is_application_running());
    assert!(!ctx.coordinator.is_running());
    // the application already ended, so there is no master to signal
    assert!(ctx.coordinator.messages().is_empty());
    let calls = ctx.notifier.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].message.contains(id.as_str()));
    assert!(calls[0].message.contains("container exited with 137"));
    assert!(rm.calls().contains(&RmCall::Stop));
}

#[tokio::test]
async fn non_terminal_report_marks_application_running() {
    let ctx = setup();
    expect_first_application(ctx.rm(), ApplicationState::Accepted);
    ctx.launcher.start().await.unwrap();

    ctx.launcher.handle_event(failure()).await;
    ctx.launcher.handle_event(arrived(ApplicationState::Running)).await;

    assert_eq!(ctx.launcher.report_failures(), 0);
    assert!(ctx.launcher.is_application_running());
    assert!(ctx.coordinator.is_running());
    assert!(!ctx.launcher.is_stopped());

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn successful_report_resets_failure_count() {
    let ctx = setup_with(Setup::new(LauncherConfig {
        max_report_failures: 2,
        ..test_config()
    }));

    for _ in 0..2 {
        ctx.launcher.handle_event(failure()).await;
    }
    ctx.launcher.handle_event(arrived(ApplicationState::Running)).await;
    for _ in 0..2 {
        ctx.launcher.handle_event(failure()).await;
    }

    assert_eq!(ctx.launcher.report_failures(), 2);
    assert!(!ctx.launcher.is_stopped());
    assert!(ctx.notifier.calls().is_empty());
}

#[tokio::test]
async fn notification_is_skipped_when_disabled() {
    let ctx = setup_with(Setup::new(LauncherConfig {
        max_report_failures: 0,
        email_notification_on_shutdown: false,
        ..test_config()
    }));

    ctx.launcher.handle_event(failure()).await;

    assert!(ctx.launcher.is_stopped());
    assert!(ctx.notifier.calls().is_empty());
}

#[tokio::test]
async fn notification_failure_is_not_fatal() {
    let ctx = setup_with(Setup::new(LauncherConfig {
        max_report_failures: 0,
        ..test_config()
    }));
    ctx.notifier.fail_with("mail relay down");

    ctx.launcher.handle_event(failure()).await;

    assert!(ctx.launcher.is_stopped());
    assert_eq!(ctx.launcher.phase(), LauncherPhase::Stopped);
}

#[tokio::test]
async fn failures_after_shutdown_do_not_notify_again() {
    let ctx = setup_with(Setup::new(LauncherConfig {
        max_report_failures: 1,
        ..test_config()
    }));

    for _ in 0..4 {
        ctx.launcher.handle_event(failure()).await;
    }

    assert_eq!(ctx.notifier.calls().len(), 1);
}

#[tokio::test]
async fn completion_after_external_stop_still_reports() {
    let ctx = setup();
    ctx.launcher.stop().await.unwrap();

    ctx.launcher
        .handle_event(arrived(ApplicationState::Killed))
        .await;

    let calls = ctx.notifier.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].message.contains("KILLED"));
    assert!(!ctx
        .coordinator
        .messages()
        .iter()
        .any(|(m, _)| *m == ClusterMessage::ApplicationMasterShutdown));
}

proptest! {
    #[test]
    fn shutdown_triggers_only_past_the_failure_threshold(max in 0u32..4, failures in 0u32..8) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let ctx = setup_with(Setup::new(LauncherConfig {
            max_report_failures: max,
            ..test_config()
        }));

        runtime.block_on(async {
            for _ in 0..failures {
                ctx.launcher.handle_event(failure()).await;
            }
        });

        prop_assert_eq!(ctx.launcher.is_stopped(), failures > max);
        prop_assert_eq!(ctx.notifier.calls().len(), usize::from(failures > max));
    }
}

#[tokio::test(start_paused = true)]
async fn poller_drops_reports_the_handler_cannot_take() {
    use crate::launcher::monitor::Poller;
    use std::time::Duration;
    use tokio::sync::mpsc;

    let rm = FakeResourceManager::new("rm-a:8032");
    rm.start().await.unwrap();
    let id = app_id(1);
    rm.add_application(report(id.as_str(), APP, ApplicationState::Running));
    let (events, mut received) = mpsc::channel(1);

    let poller = Poller::spawn(
        rm.clone(),
        id,
        Duration::from_secs(60),
        Duration::from_secs(10),
        events,
    );
    tokio::time::sleep(Duration::from_secs(300)).await;
    poller.stop(Duration::from_secs(120)).await.unwrap();

    assert!(rm.report_count() >= 2);
    assert!(matches!(
        received.recv().await,
        Some(LauncherEvent::ReportArrived(_))
    ));
    assert!(received.recv().await.is_none());
}
