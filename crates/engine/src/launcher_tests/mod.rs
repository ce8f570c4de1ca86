// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launcher tests

mod lifecycle;
mod monitoring;
mod shutdown;
mod submit;

use super::*;
use chrono::{TimeZone, Utc};
use ferry_adapters::{
    FakeCoordinator, FakeFileSystem, FakeFileSystemProvider, FakeNotifyAdapter,
    FakeResourceManager, FakeSecurityPlatform,
};
use ferry_core::test_support::{config, report};
use ferry_core::{ApplicationState, FakeClock};

type TestLauncher =
    Launcher<FakeResourceManager, FakeFileSystemProvider, FakeNotifyAdapter, FakeClock>;

const APP: &str = "ingest";

/// Test context holding the launcher and handles to every fake it uses
struct TestContext {
    launcher: TestLauncher,
    rms: Vec<FakeResourceManager>,
    filesystems: FakeFileSystemProvider,
    tree: FakeFileSystem,
    notifier: FakeNotifyAdapter,
    security: FakeSecurityPlatform,
    coordinator: FakeCoordinator,
}

impl TestContext {
    fn rm(&self) -> &FakeResourceManager {
        &self.rms[0]
    }
}

/// Knobs for [`setup_with`]
struct Setup {
    config: LauncherConfig,
    endpoints: Vec<&'static str>,
    security: FakeSecurityPlatform,
    coordinator: bool,
    state_store: Option<Arc<dyn StateStore>>,
}

impl Setup {
    fn new(config: LauncherConfig) -> Self {
        Self {
            config,
            endpoints: vec!["rm-a:8032"],
            security: FakeSecurityPlatform::insecure(),
            coordinator: true,
            state_store: None,
        }
    }
}

fn test_config() -> LauncherConfig {
    LauncherConfig {
        email_notification_on_shutdown: true,
        ..config(APP)
    }
}

fn setup() -> TestContext {
    setup_with(Setup::new(test_config()))
}

fn setup_with(setup: Setup) -> TestContext {
    let rms: Vec<_> = setup
        .endpoints
        .iter()
        .map(|e| FakeResourceManager::new(e))
        .collect();
    let filesystems = FakeFileSystemProvider::new();
    let tree = filesystems.tree();
    let notifier = FakeNotifyAdapter::new();
    let coordinator = FakeCoordinator::new();
    let clock = FakeClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap());

    let launcher = Launcher::new(
        setup.config,
        LauncherDeps {
            clients: ClientPool::new(rms.clone()),
            filesystems: filesystems.clone(),
            notifier: notifier.clone(),
            security: Arc::new(setup.security.clone()),
            coordinator: setup
                .coordinator
                .then(|| Arc::new(coordinator.clone()) as Arc<dyn ClusterCoordinator>),
            state_store: setup.state_store,
            refreshers: RefresherRegistry::with_builtins(),
            token_file_location: None,
            clock,
        },
    )
    .unwrap();

    TestContext {
        launcher,
        rms,
        filesystems,
        tree,
        notifier,
        security: setup.security,
        coordinator,
    }
}

/// Id the fake resource manager hands out for its `n`th application
fn app_id(n: u32) -> ApplicationId {
    ApplicationId::from_parts(1_700_000_000_000, n)
}

fn work_dir(id: &ApplicationId) -> String {
    format!("/ferry/apps/{APP}/{id}")
}

/// Make the first application the fake creates report `state` once it
/// has been submitted
fn expect_first_application(rm: &FakeResourceManager, state: ApplicationState) -> ApplicationId {
    let id = app_id(1);
    rm.add_application_on_submit(report(id.as_str(), APP, state));
    id
}
