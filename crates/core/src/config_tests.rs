// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

fn minimal() -> LauncherConfig {
    LauncherConfig {
        application_name: "ingest".to_string(),
        ..LauncherConfig::default()
    }
}

#[test]
fn parses_minimal_document_with_defaults() {
    let config = LauncherConfig::from_toml_str(r#"application_name = "ingest""#).unwrap();
    assert_eq!(config.application_name, "ingest");
    assert_eq!(config.queue, "default");
    assert_eq!(config.jar_cache_retained_periods, 2);
    assert_eq!(config.poll_interval(), Duration::from_secs(60));
    assert!(config.application_tags().is_empty());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = LauncherConfig::from_toml_str("application_name = \"x\"\nbogus = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)), "got: {err}");
}

#[test]
fn missing_application_name_is_rejected() {
    let err = LauncherConfig::from_toml_str("queue = \"q\"").unwrap_err();
    assert!(matches!(err, ConfigError::EmptyApplicationName));
}

#[yare::parameterized(
    overhead_equal_to_heap   = { 1024, 0.5, 512 },
    overhead_above_heap      = { 1024, 1.0, 2048 },
    fractional_heap_rounds   = { 201, 0.5, 100 },
)]
fn overhead_must_leave_positive_heap(memory: u32, ratio: f64, overhead: u32) {
    let config = LauncherConfig {
        master_memory_mbs: memory,
        jvm_xmx_ratio: ratio,
        jvm_overhead_mbs: overhead,
        ..minimal()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OverheadTooLarge { .. })
    ));
}

#[test]
fn heap_size_floors_before_subtracting_overhead() {
    let config = LauncherConfig {
        master_memory_mbs: 1000,
        jvm_xmx_ratio: 0.85,
        jvm_overhead_mbs: 100,
        ..minimal()
    };
    config.validate().unwrap();
    assert_eq!(config.heap_size_mbs(1000), 750);
    assert_eq!(config.heap_size_mbs(1001), 750);
}

#[yare::parameterized(
    negative = { -0.1 },
    above_one = { 1.5 },
)]
fn xmx_ratio_out_of_range(ratio: f64) {
    let config = LauncherConfig {
        jvm_xmx_ratio: ratio,
        ..minimal()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::XmxRatioOutOfRange(_))
    ));
}

#[test]
fn zero_poll_interval_is_rejected() {
    let config = LauncherConfig {
        poll_interval_secs: 0,
        ..minimal()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Zero("poll_interval_secs"))));
}

#[test]
fn endpoints_put_primary_first_and_dedupe() {
    let config = LauncherConfig {
        resource_manager_address: Endpoint::new("rm-a:8032"),
        other_resource_manager_addresses: vec![
            Endpoint::new("rm-b:8032"),
            Endpoint::new("rm-a:8032"),
            Endpoint::new("rm-b:8032"),
        ],
        ..minimal()
    };
    assert_eq!(
        config.resource_manager_endpoints(),
        vec![Endpoint::new("rm-a:8032"), Endpoint::new("rm-b:8032")]
    );
}

#[test]
fn tags_are_split_and_trimmed() {
    let config = LauncherConfig {
        application_tags: Some(" etl, nightly ,,etl".to_string()),
        ..minimal()
    };
    let tags: Vec<_> = config.application_tags().into_iter().collect();
    assert_eq!(tags, vec!["etl".to_string(), "nightly".to_string()]);
}

#[yare::parameterized(
    detached_azkaban     = { true, "Azkaban", true },
    attached_azkaban     = { false, "azkaban", false },
    detached_other_mode  = { true, "", false },
)]
fn application_prefix_hiding(detach: bool, mode: &str, expected: bool) {
    let config = LauncherConfig {
        detach_on_exit: detach,
        launcher_mode: mode.to_string(),
        ..minimal()
    };
    assert_eq!(config.hides_application_prefix(), expected);
}

#[test]
fn app_work_dir_nests_name_and_id() {
    let config = LauncherConfig {
        work_dir_root: PathBuf::from("/apps"),
        ..minimal()
    };
    assert_eq!(
        config.app_work_dir("application_1_0001"),
        PathBuf::from("/apps/ingest/application_1_0001")
    );
}

#[test]
fn loggable_id_strips_prefix_only_when_hidden() {
    let hidden = LauncherConfig {
        detach_on_exit: true,
        launcher_mode: "azkaban".to_string(),
        ..minimal()
    };
    assert_eq!(hidden.loggable_id("application_17_0003"), "17_0003");
    assert_eq!(minimal().loggable_id("application_17_0003"), "application_17_0003");
}

#[test]
fn token_file_lives_beside_application_work_dirs() {
    let config = LauncherConfig {
        work_dir_root: PathBuf::from("/apps"),
        ..minimal()
    };
    assert_eq!(config.token_file_path(), PathBuf::from("/apps/ingest/.token"));
}

#[test]
fn load_reads_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "application_name = \"from-disk\"\nmaster_vcores = 4").unwrap();
    let config = LauncherConfig::load(file.path()).unwrap();
    assert_eq!(config.application_name, "from-disk");
    assert_eq!(config.master_vcores, 4);
}

#[test]
fn load_reports_missing_file() {
    let err = LauncherConfig::load(Path::new("/nonexistent/ferry.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
