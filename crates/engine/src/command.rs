// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application master launch command

use crate::error::LauncherError;
use ferry_core::{ConfigError, LauncherConfig};
use std::collections::BTreeSet;

/// Expanded by the node manager to the container's log directory
pub const LOG_DIR_PLACEHOLDER: &str = "<LOG_DIR>";
/// Expanded by the node manager to the container's JVM home
pub const JAVA_HOME_PLACEHOLDER: &str = "$JAVA_HOME";

const STDOUT: &str = "stdout";
const STDERR: &str = "stderr";

/// File stem for the master's stdout/stderr: configured override, else
/// the entry class's short name.
pub fn log_file_stem(config: &LauncherConfig) -> &str {
    match config.master_log_file_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => config
            .master_class
            .rsplit(['.', ':'])
            .next()
            .unwrap_or(&config.master_class),
    }
}

/// Build the command line that starts the application master.
///
/// `memory_mbs` is the negotiated container memory; the heap is derived
/// from it and must be positive.
pub fn build_master_command(
    config: &LauncherConfig,
    application_id: &str,
    memory_mbs: u32,
    lib_jar_names: &BTreeSet<String>,
    start_time_ms: u64,
) -> Result<String, LauncherError> {
    let heap_mbs = config.heap_size_mbs(memory_mbs);
    if heap_mbs <= 0 {
        return Err(ConfigError::OverheadTooLarge {
            overhead_mbs: config.jvm_overhead_mbs,
            memory_mbs,
            ratio: config.jvm_xmx_ratio,
        }
        .into());
    }
    let stem = log_file_stem(config);
    let lib_jars = lib_jar_names
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");

    let mut parts = vec![
        format!("{}/bin/java", JAVA_HOME_PLACEHOLDER),
        format!("-Xmx{}M", heap_mbs),
        format!("-Duser.timezone={}", config.container_timezone),
        format!("-Dferry.logs.dir={}", LOG_DIR_PLACEHOLDER),
        format!("-Dferry.logs.file={}.{}", stem, STDOUT),
        format!("-Dferry.launcher.start.time={}", start_time_ms),
        format!("-Dferry.lib.jars={}", lib_jars),
    ];
    if let Some(args) = config.master_jvm_args.as_deref() {
        parts.extend(args.split_whitespace().map(str::to_string));
    }
    parts.extend(config.proxy_jvm_args.split_whitespace().map(str::to_string));
    parts.push(config.master_class.clone());
    parts.push("--app_name".to_string());
    parts.push(config.application_name.clone());
    parts.push("--app_id".to_string());
    parts.push(application_id.to_string());
    parts.push(format!("1>{}/{}.{}", LOG_DIR_PLACEHOLDER, stem, STDOUT));
    parts.push(format!("2>{}/{}.{}", LOG_DIR_PLACEHOLDER, stem, STDERR));
    Ok(parts.join(" "))
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
