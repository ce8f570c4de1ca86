// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ferry_core::test_support;
use fs2::FileExt;
use serial_test::serial;
use std::path::Path;
use tempfile::tempdir;

const LAUNCHER_TOML: &str = r#"
application_name = "ingest"
resource_manager_address = "rm-a:8032"
other_resource_manager_addresses = ["rm-b:8032"]
"#;

fn write_launcher_config(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("launcher.toml");
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
#[serial]
fn config_arg_wins_over_env() {
    let dir = tempdir().unwrap();
    std::env::set_var("FERRY_STATE_DIR", dir.path());
    std::env::set_var(crate::env::CONFIG_ENV, "/etc/ferry/from-env.toml");

    let config = Config::load(Some(PathBuf::from("/etc/ferry/from-arg.toml"))).unwrap();

    assert_eq!(
        config.launcher_config_path,
        PathBuf::from("/etc/ferry/from-arg.toml")
    );
    assert_eq!(config.lock_path, dir.path().join("ferryd.pid"));
    assert_eq!(config.log_path, dir.path().join("ferryd.log"));
    std::env::remove_var(crate::env::CONFIG_ENV);
    std::env::remove_var("FERRY_STATE_DIR");
}

#[test]
#[serial]
fn config_falls_back_to_env() {
    std::env::set_var(crate::env::CONFIG_ENV, "/etc/ferry/from-env.toml");

    let config = Config::load(None).unwrap();

    assert_eq!(
        config.launcher_config_path,
        PathBuf::from("/etc/ferry/from-env.toml")
    );
    std::env::remove_var(crate::env::CONFIG_ENV);
}

#[test]
#[serial]
fn missing_config_is_an_error() {
    std::env::remove_var(crate::env::CONFIG_ENV);

    assert!(matches!(Config::load(None), Err(LifecycleError::NoConfig)));
}

#[test]
#[serial]
fn state_dir_prefers_xdg_over_home() {
    std::env::remove_var("FERRY_STATE_DIR");
    std::env::set_var("XDG_STATE_HOME", "/var/state");

    assert_eq!(
        crate::env::state_dir().unwrap(),
        PathBuf::from("/var/state/ferry")
    );
    std::env::remove_var("XDG_STATE_HOME");
}

#[test]
fn startup_writes_pid_and_wires_every_endpoint() {
    let dir = tempdir().unwrap();
    let config = Config::with_state_dir(
        dir.path().join("state"),
        write_launcher_config(dir.path(), LAUNCHER_TOML),
    );

    let mut daemon = startup(&config).unwrap();

    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert_eq!(daemon.launcher.config().application_name, "ingest");

    daemon.shutdown();
    assert!(!config.lock_path.exists());
}

#[test]
fn startup_with_invalid_launcher_config_releases_lock_file() {
    let dir = tempdir().unwrap();
    let config = Config::with_state_dir(
        dir.path().join("state"),
        write_launcher_config(dir.path(), "application_name = \"\"\n"),
    );

    let result = startup(&config);

    assert!(matches!(result, Err(LifecycleError::Config(_))));
    assert!(!config.lock_path.exists());
}

#[test]
fn startup_lock_failed_does_not_remove_pid_file() {
    let dir = tempdir().unwrap();
    let config = Config::with_state_dir(
        dir.path().join("state"),
        write_launcher_config(dir.path(), LAUNCHER_TOML),
    );
    std::fs::create_dir_all(&config.state_dir).unwrap();

    // Hold an exclusive lock (simulating the running daemon)
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)
        .unwrap();
    lock_file.lock_exclusive().unwrap();
    std::fs::write(&config.lock_path, b"12345").unwrap();

    match startup(&config) {
        Err(LifecycleError::LockFailed(_)) => {}
        Err(e) => panic!("expected LockFailed, got: {e}"),
        Ok(_) => panic!("expected LockFailed, but startup succeeded"),
    }

    assert_eq!(std::fs::read_to_string(&config.lock_path).unwrap(), "12345");
}

#[yare::parameterized(
    unset = { None, false },
    blank = { Some("   "), false },
    set   = { Some("mail -s \"$FERRY_NOTIFY_SUBJECT\" ops@example.com"), true },
)]
fn notifier_follows_notify_command(command: Option<&str>, is_command: bool) {
    let config = LauncherConfig {
        notify_command: command.map(str::to_string),
        ..test_support::config("ingest")
    };

    let notifier = DaemonNotifier::from_config(&config);

    assert_eq!(matches!(notifier, DaemonNotifier::Command(_)), is_command);
}

#[test]
fn build_launcher_rejects_invalid_bridge_command() {
    let config = LauncherConfig {
        rm_bridge_command: "   ".to_string(),
        ..test_support::config("ingest")
    };

    assert!(matches!(build_launcher(config), Err(LifecycleError::Rm(_))));
}
