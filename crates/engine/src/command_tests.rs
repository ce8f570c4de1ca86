// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ferry_core::test_support::config;

fn jars(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn command_embeds_heap_logs_and_positional_args() {
    let mut config = config("ingest");
    config.jvm_xmx_ratio = 0.8;
    config.jvm_overhead_mbs = 100;
    config.container_timezone = "America/Los_Angeles".to_string();

    let command = build_master_command(
        &config,
        "application_1_0001",
        1024,
        &jars(&["b.jar", "a.jar"]),
        1_700_000_000_000,
    )
    .unwrap();

    assert_eq!(
        command,
        "$JAVA_HOME/bin/java -Xmx719M -Duser.timezone=America/Los_Angeles \
         -Dferry.logs.dir=<LOG_DIR> -Dferry.logs.file=ClusterMaster.stdout \
         -Dferry.launcher.start.time=1700000000000 -Dferry.lib.jars=a.jar,b.jar \
         io.ferry.cluster.ClusterMaster --app_name ingest --app_id application_1_0001 \
         1><LOG_DIR>/ClusterMaster.stdout 2><LOG_DIR>/ClusterMaster.stderr"
    );
}

#[test]
fn jvm_and_proxy_args_precede_entry_class() {
    let mut config = config("ingest");
    config.master_jvm_args = Some("-XX:+UseG1GC  -Dfoo=bar".to_string());
    config.proxy_jvm_args = "-Dhttp.proxyHost=proxy".to_string();

    let command =
        build_master_command(&config, "application_1_0001", 512, &BTreeSet::new(), 0).unwrap();
    assert!(
        command.contains(
            "-Dferry.lib.jars= -XX:+UseG1GC -Dfoo=bar -Dhttp.proxyHost=proxy io.ferry.cluster.ClusterMaster"
        ),
        "{command}"
    );
}

#[test]
fn log_file_override_names_redirects() {
    let mut config = config("ingest");
    config.master_log_file_name = Some("master".to_string());
    let command =
        build_master_command(&config, "application_1_0001", 512, &BTreeSet::new(), 0).unwrap();
    assert!(command.ends_with("1><LOG_DIR>/master.stdout 2><LOG_DIR>/master.stderr"));
}

#[test]
fn clamped_memory_can_leave_no_heap() {
    let mut config = config("ingest");
    config.jvm_overhead_mbs = 256;
    config.master_memory_mbs = 4096;

    let err = build_master_command(&config, "application_1_0001", 256, &BTreeSet::new(), 0)
        .unwrap_err();
    assert!(matches!(
        err,
        LauncherError::Config(ConfigError::OverheadTooLarge { memory_mbs: 256, .. })
    ));
}

#[yare::parameterized(
    dotted  = { "io.ferry.cluster.ClusterMaster", "ClusterMaster" },
    rust    = { "ferry::master::Main", "Main" },
    bare    = { "Master", "Master" },
)]
fn stem_uses_short_class_name(class: &str, expected: &str) {
    let mut config = config("ingest");
    config.master_class = class.to_string();
    assert_eq!(log_file_stem(&config), expected);
}
