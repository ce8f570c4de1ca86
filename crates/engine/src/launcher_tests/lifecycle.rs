// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup ordering, token management and auxiliary services

use super::*;
use ferry_core::{ClusterMessage, Credentials, Token, FS_DELEGATION_TOKEN};
use tempfile::tempdir;

#[tokio::test]
async fn key_management_writes_token_file_before_submitting() {
    let security = FakeSecurityPlatform::secure("rm@EXAMPLE.COM");
    security.set_delegation_tokens(
        "fake://namenode:8020",
        vec![Token::new(FS_DELEGATION_TOKEN, "fake://namenode:8020")],
    );
    let ctx = setup_with(Setup {
        security,
        ..Setup::new(LauncherConfig {
            key_management_enabled: true,
            ..test_config()
        })
    });
    expect_first_application(ctx.rm(), ApplicationState::Accepted);

    ctx.launcher.start().await.unwrap();

    assert_eq!(ctx.security.logins(), 1);
    let token_file = ctx.tree.file_contents("/ferry/apps/ingest/.token").unwrap();
    let credentials = Credentials::decode(&token_file).unwrap();
    assert!(credentials
        .get(FS_DELEGATION_TOKEN, "fake://namenode:8020")
        .is_some());
    assert!(ctx
        .coordinator
        .messages()
        .contains(&(ClusterMessage::TokenFileUpdated, false)));

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn unknown_refresher_fails_start_before_cluster_contact() {
    let ctx = setup_with(Setup::new(LauncherConfig {
        key_management_enabled: true,
        token_refresher: "vault".to_string(),
        ..test_config()
    }));

    let result = ctx.launcher.start().await;

    assert!(matches!(result, Err(LauncherError::Refresher(_))));
    assert!(ctx.rm().calls().is_empty());
}

#[tokio::test]
async fn rm_start_failure_aborts_start() {
    let ctx = setup();
    ctx.rm().fail_start("connection refused");

    let result = ctx.launcher.start().await;

    assert!(matches!(result, Err(LauncherError::Rm(_))));
    assert!(ctx.launcher.application_id().is_none());
}

#[tokio::test]
async fn log_copier_pulls_application_logs_until_stopped() {
    let sink = tempdir().unwrap();
    let ctx = setup_with(Setup::new(LauncherConfig {
        log_sink_root_dir: Some(sink.path().to_path_buf()),
        ..test_config()
    }));
    let id = expect_first_application(ctx.rm(), ApplicationState::Running);

    ctx.launcher.start().await.unwrap();
    let app_logs = format!("{}/_applogs", work_dir(&id));
    assert!(ctx.tree.contains(&app_logs));
    ctx.tree
        .add_file(&format!("{app_logs}/container_01/master.stdout"), b"started");

    ctx.launcher.stop().await.unwrap();

    let copied = sink
        .path()
        .join(APP)
        .join(id.as_str())
        .join("container_01/master.stdout");
    assert_eq!(std::fs::read(copied).unwrap(), b"started");
}

#[tokio::test]
async fn log_copier_can_be_disabled() {
    let sink = tempdir().unwrap();
    let ctx = setup_with(Setup::new(LauncherConfig {
        log_sink_root_dir: Some(sink.path().to_path_buf()),
        log_copier_disabled: true,
        ..test_config()
    }));
    let id = expect_first_application(ctx.rm(), ApplicationState::Running);

    ctx.launcher.start().await.unwrap();

    assert!(!ctx.tree.contains(&format!("{}/_applogs", work_dir(&id))));
    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn launcher_without_coordinator_keeps_its_own_flag() {
    let ctx = setup_with(Setup {
        coordinator: false,
        ..Setup::new(test_config())
    });
    expect_first_application(ctx.rm(), ApplicationState::Running);

    ctx.launcher.start().await.unwrap();
    ctx.launcher.stop().await.unwrap();

    assert!(!ctx.coordinator.is_running());
    assert!(ctx.coordinator.messages().is_empty());
    assert_eq!(ctx.coordinator.closes(), 0);
}
