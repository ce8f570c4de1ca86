// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission and reconnection tests

use super::*;
use ferry_adapters::{FsStateStore, RmCall};
use ferry_core::{
    AccessType, Credentials, Resource, Token, APPLICATION_TYPE, FS_DELEGATION_TOKEN,
    RM_DELEGATION_TOKEN,
};
use tempfile::tempdir;

#[tokio::test]
async fn submits_new_application_when_none_is_live() {
    let ctx = setup();
    let id = expect_first_application(ctx.rm(), ApplicationState::Accepted);

    ctx.launcher.start().await.unwrap();

    assert_eq!(ctx.launcher.application_id(), Some(id.clone()));
    let submissions = ctx.rm().submissions();
    assert_eq!(submissions.len(), 1);
    let submitted = &submissions[0];
    assert_eq!(submitted.application_id, id);
    assert_eq!(submitted.application_name, APP);
    assert_eq!(submitted.application_type, APPLICATION_TYPE);
    assert_eq!(submitted.queue, "default");
    assert_eq!(submitted.priority, 0);
    assert_eq!(submitted.max_attempts, 1);
    assert_eq!(submitted.resource, Resource::new(512, 1));
    assert_eq!(
        submitted.master.acls.get(&AccessType::ViewApp).map(String::as_str),
        Some("*")
    );
    assert!(submitted.master.tokens.is_none());
    assert_eq!(submitted.master.commands.len(), 1);
    assert!(submitted.master.commands[0].contains(&format!("--app_id {id}")));
    assert_eq!(
        submitted.master.environment.get(crate::env::APPLICATION_ID),
        Some(&id.to_string())
    );

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn requested_resources_are_clamped_to_cluster_maximum() {
    let ctx = setup_with(Setup::new(LauncherConfig {
        master_memory_mbs: 2048,
        master_vcores: 4,
        ..test_config()
    }));
    ctx.rm().set_maximum_capability(Resource::new(1024, 8));
    expect_first_application(ctx.rm(), ApplicationState::Accepted);

    ctx.launcher.start().await.unwrap();

    let submitted = &ctx.rm().submissions()[0];
    assert_eq!(submitted.resource, Resource::new(1024, 4));
    assert!(submitted.master.commands[0].contains("-Xmx1024M"));

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn reconnects_to_live_application_without_submitting() {
    let ctx = setup_with(Setup {
        endpoints: vec!["rm-a:8032", "rm-b:8032"],
        ..Setup::new(test_config())
    });
    let live = ApplicationId::new("application_1600000000000_0042");
    ctx.rms[1].add_application(report(live.as_str(), APP, ApplicationState::Running));

    ctx.launcher.start().await.unwrap();

    assert_eq!(ctx.launcher.application_id(), Some(live));
    assert_eq!(ctx.launcher.phase(), LauncherPhase::Monitoring);
    assert!(ctx.rms.iter().all(|rm| rm.submissions().is_empty()));
    assert!(!ctx.rms[0].calls().contains(&RmCall::CreateApplication));
    assert!(ctx.coordinator.is_running());

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn reconnect_ignores_other_names_and_finished_applications() {
    let ctx = setup();
    let rm = ctx.rm();
    rm.add_application(report("application_1600000000000_0001", "other", ApplicationState::Running));
    rm.add_application(report("application_1600000000000_0002", APP, ApplicationState::Finished));
    let id = expect_first_application(rm, ApplicationState::Accepted);

    ctx.launcher.start().await.unwrap();

    assert_eq!(ctx.launcher.application_id(), Some(id));
    assert_eq!(rm.submissions().len(), 1);

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn submitted_id_is_authoritative_when_it_differs() {
    let ctx = setup();
    let returned = ApplicationId::new("application_1700000000000_0099");
    ctx.rm().set_submit_id(returned.clone());
    ctx.rm().add_application_on_submit(report(returned.as_str(), APP, ApplicationState::Accepted));

    ctx.launcher.start().await.unwrap();

    assert_eq!(ctx.launcher.application_id(), Some(returned.clone()));
    assert_eq!(ctx.rm().submissions()[0].application_id, app_id(1));
    assert!(ctx.rm().calls().contains(&RmCall::Report(returned)));

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn report_with_different_id_does_not_fail_start() {
    let ctx = setup();
    let id = expect_first_application(ctx.rm(), ApplicationState::Accepted);
    let reported = ApplicationId::new("application_1700000000000_0077");
    ctx.rm()
        .push_report(Ok(report(reported.as_str(), APP, ApplicationState::Accepted)));

    ctx.launcher.start().await.unwrap();

    assert_eq!(ctx.launcher.application_id(), Some(id));

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn post_submit_report_failure_fails_start() {
    let ctx = setup();
    ctx.rm().push_report(Err("rm unavailable".to_string()));

    let result = ctx.launcher.start().await;

    assert!(matches!(result, Err(LauncherError::Rm(_))));
}

#[tokio::test]
async fn start_twice_is_rejected() {
    let ctx = setup();
    expect_first_application(ctx.rm(), ApplicationState::Accepted);
    ctx.launcher.start().await.unwrap();

    let again = ctx.launcher.start().await;

    assert!(matches!(again, Err(LauncherError::AlreadyStarted)));
    assert_eq!(ctx.rm().submissions().len(), 1);
    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn missing_lib_dir_aborts_before_submission() {
    let ctx = setup_with(Setup::new(LauncherConfig {
        lib_jars_dir: Some("/nonexistent/ferry/lib".into()),
        ..test_config()
    }));

    let result = ctx.launcher.start().await;

    assert!(matches!(result, Err(LauncherError::MissingLibDir(_))));
    assert!(ctx.rm().submissions().is_empty());
}

#[tokio::test]
async fn invalid_config_is_rejected_before_cluster_contact() {
    let rm = FakeResourceManager::new("rm-a:8032");
    let result = Launcher::new(
        LauncherConfig {
            jvm_overhead_mbs: 4096,
            ..test_config()
        },
        LauncherDeps {
            clients: ClientPool::new(vec![rm.clone()]),
            filesystems: FakeFileSystemProvider::new(),
            notifier: FakeNotifyAdapter::new(),
            security: Arc::new(FakeSecurityPlatform::insecure()),
            coordinator: None,
            state_store: None,
            refreshers: RefresherRegistry::with_builtins(),
            token_file_location: None,
            clock: FakeClock::default(),
        },
    );

    assert!(matches!(result, Err(LauncherError::Config(_))));
    assert!(rm.calls().is_empty());
}

#[tokio::test]
async fn uploads_master_files_into_work_dir() {
    let local = tempdir().unwrap();
    let settings = local.path().join("settings.conf");
    std::fs::write(&settings, b"threads = 4").unwrap();
    let ctx = setup_with(Setup::new(LauncherConfig {
        master_files_local: Some(settings.display().to_string()),
        ..test_config()
    }));
    let id = expect_first_application(ctx.rm(), ApplicationState::Accepted);

    ctx.launcher.start().await.unwrap();

    let uploaded = format!("{}/_appfiles/settings.conf", work_dir(&id));
    assert_eq!(ctx.tree.file_contents(&uploaded), Some(b"threads = 4".to_vec()));
    let manifest = &ctx.rm().submissions()[0].master.local_resources;
    assert!(manifest.get("settings.conf").is_some());

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn jar_cache_prunes_old_periods() {
    let ctx = setup_with(Setup::new(LauncherConfig {
        jar_cache_enabled: true,
        jar_cache_retained_periods: 2,
        ..test_config()
    }));
    for period in ["2026-07", "2026-08", "2026-09"] {
        ctx.tree.add_dir(&format!("/ferry/jar-cache/{period}"), 0);
    }
    expect_first_application(ctx.rm(), ApplicationState::Accepted);

    ctx.launcher.start().await.unwrap();

    assert!(ctx.tree.contains("/ferry/jar-cache/2026-09"));
    assert!(!ctx.tree.contains("/ferry/jar-cache/2026-08"));
    assert!(!ctx.tree.contains("/ferry/jar-cache/2026-07"));

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn secure_submission_carries_filtered_tokens() {
    let security = FakeSecurityPlatform::secure("rm/_HOST@EXAMPLE.COM");
    security.add_ambient_token(Token::new(RM_DELEGATION_TOKEN, "rm-old:8032"));
    security.set_delegation_tokens(
        "fake://namenode:8020",
        vec![Token::new(FS_DELEGATION_TOKEN, "fake://namenode:8020")],
    );
    let ctx = setup_with(Setup {
        security,
        ..Setup::new(test_config())
    });
    expect_first_application(ctx.rm(), ApplicationState::Accepted);

    ctx.launcher.start().await.unwrap();

    let submitted = &ctx.rm().submissions()[0];
    let tokens = submitted.master.tokens.as_deref().unwrap();
    let credentials = Credentials::decode(tokens).unwrap();
    assert!(credentials
        .get(FS_DELEGATION_TOKEN, "fake://namenode:8020")
        .is_some());
    assert!(credentials.get(RM_DELEGATION_TOKEN, "rm-old:8032").is_none());
    assert_eq!(
        ctx.security.fetches(),
        vec![(
            "fake://namenode:8020".to_string(),
            "rm/_HOST@EXAMPLE.COM".to_string()
        )]
    );

    ctx.launcher.stop().await.unwrap();
}

#[tokio::test]
async fn submission_is_recorded_in_state_store() {
    let dir = tempdir().unwrap();
    let ctx = setup_with(Setup {
        state_store: Some(Arc::new(FsStateStore::new(dir.path()))),
        ..Setup::new(test_config())
    });
    let id = expect_first_application(ctx.rm(), ApplicationState::Accepted);

    ctx.launcher.start().await.unwrap();

    let store = FsStateStore::new(dir.path());
    let record = store.get("launches", APP).unwrap().unwrap();
    assert_eq!(record["application_id"], id.as_str());
    assert_eq!(record["resource_manager"], "rm-a:8032");

    ctx.launcher.stop().await.unwrap();
}
