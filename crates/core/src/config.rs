// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launcher configuration, loaded from a TOML document.

use crate::id::{Endpoint, APPLICATION_ID_PREFIX};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Launcher mode in which detached launches hide the `application_` prefix.
pub const AZKABAN_LAUNCHER_MODE: &str = "azkaban";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("application_name must not be empty")]
    EmptyApplicationName,
    #[error("jvm_xmx_ratio must be between 0 and 1 inclusive, got {0}")]
    XmxRatioOutOfRange(f64),
    #[error(
        "jvm_overhead_mbs ({overhead_mbs}) cannot be more than master_memory_mbs ({memory_mbs}) * jvm_xmx_ratio ({ratio})"
    )]
    OverheadTooLarge {
        overhead_mbs: u32,
        memory_mbs: u32,
        ratio: f64,
    },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Everything the launcher reads from its configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    pub application_name: String,
    pub queue: String,
    pub view_acl: String,
    pub poll_interval_secs: u64,
    pub max_report_failures: u32,
    pub master_memory_mbs: u32,
    pub master_vcores: u32,
    pub jvm_xmx_ratio: f64,
    pub jvm_overhead_mbs: u32,
    pub container_timezone: String,
    pub detach_on_exit: bool,
    pub launcher_mode: String,
    pub max_attempts: u32,
    /// Comma-separated
    pub application_tags: Option<String>,

    pub resource_manager_address: Endpoint,
    pub other_resource_manager_addresses: Vec<Endpoint>,
    /// Program the resource-manager client invokes for each RPC
    pub rm_bridge_command: String,
    pub rpc_timeout_secs: u64,

    /// Root of the distributed filesystem mount
    pub filesystem_root: PathBuf,
    /// Parent of every application's working directory
    pub work_dir_root: PathBuf,
    pub jar_cache_enabled: bool,
    pub jar_cache_root: PathBuf,
    pub jar_cache_retained_periods: usize,

    pub lib_jars_dir: Option<PathBuf>,
    pub master_jars: Option<String>,
    pub master_files_local: Option<String>,
    pub master_files_remote: Option<String>,
    pub master_zips_remote: Option<String>,
    pub job_conf_path: Option<PathBuf>,
    pub container_jars: Option<String>,
    pub container_files_local: Option<String>,

    pub master_class: String,
    pub master_log_file_name: Option<String>,
    pub master_jvm_args: Option<String>,
    pub proxy_jvm_args: String,

    pub key_management_enabled: bool,
    /// Cluster requires delegation tokens; credentials come from the bridge
    pub security_enabled: bool,
    pub token_refresher: String,
    pub token_file_name: String,
    pub token_renew_interval_secs: u64,
    pub other_namenodes: Vec<String>,
    pub coordinator_enabled: bool,

    pub email_notification_on_shutdown: bool,
    pub notify_command: Option<String>,
    pub log_sink_root_dir: Option<PathBuf>,
    pub log_copier_disabled: bool,
    pub log_copy_interval_secs: u64,
    pub service_stop_timeout_secs: u64,
    pub state_store_dir: Option<PathBuf>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            application_name: String::new(),
            queue: "default".to_string(),
            view_acl: "*".to_string(),
            poll_interval_secs: 60,
            max_report_failures: 4,
            master_memory_mbs: 512,
            master_vcores: 1,
            jvm_xmx_ratio: 1.0,
            jvm_overhead_mbs: 0,
            container_timezone: "UTC".to_string(),
            detach_on_exit: false,
            launcher_mode: String::new(),
            max_attempts: 1,
            application_tags: None,
            resource_manager_address: Endpoint::new("localhost:8032"),
            other_resource_manager_addresses: Vec::new(),
            rm_bridge_command: "ferry-rm-bridge".to_string(),
            rpc_timeout_secs: 60,
            filesystem_root: PathBuf::from("/"),
            work_dir_root: PathBuf::from("/ferry/apps"),
            jar_cache_enabled: false,
            jar_cache_root: PathBuf::from("/ferry/jar-cache"),
            jar_cache_retained_periods: 2,
            lib_jars_dir: None,
            master_jars: None,
            master_files_local: None,
            master_files_remote: None,
            master_zips_remote: None,
            job_conf_path: None,
            container_jars: None,
            container_files_local: None,
            master_class: "io.ferry.cluster.ClusterMaster".to_string(),
            master_log_file_name: None,
            master_jvm_args: None,
            proxy_jvm_args: String::new(),
            key_management_enabled: false,
            security_enabled: false,
            token_refresher: "file".to_string(),
            token_file_name: ".token".to_string(),
            token_renew_interval_secs: 3600,
            other_namenodes: Vec::new(),
            coordinator_enabled: false,
            email_notification_on_shutdown: false,
            notify_command: None,
            log_sink_root_dir: None,
            log_copier_disabled: false,
            log_copy_interval_secs: 60,
            service_stop_timeout_secs: 300,
            state_store_dir: None,
        }
    }
}

impl LauncherConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: LauncherConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce an unusable launch before any
    /// cluster contact happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.trim().is_empty() {
            return Err(ConfigError::EmptyApplicationName);
        }
        if !(0.0..=1.0).contains(&self.jvm_xmx_ratio) {
            return Err(ConfigError::XmxRatioOutOfRange(self.jvm_xmx_ratio));
        }
        if self.heap_size_mbs(self.master_memory_mbs) <= 0 {
            return Err(ConfigError::OverheadTooLarge {
                overhead_mbs: self.jvm_overhead_mbs,
                memory_mbs: self.master_memory_mbs,
                ratio: self.jvm_xmx_ratio,
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Zero("poll_interval_secs"));
        }
        if self.jar_cache_retained_periods == 0 {
            return Err(ConfigError::Zero("jar_cache_retained_periods"));
        }
        if self.rpc_timeout_secs == 0 {
            return Err(ConfigError::Zero("rpc_timeout_secs"));
        }
        Ok(())
    }

    /// JVM heap for a container of `memory_mbs`:
    /// `floor(memory_mbs * jvm_xmx_ratio) - jvm_overhead_mbs`.
    pub fn heap_size_mbs(&self, memory_mbs: u32) -> i64 {
        (f64::from(memory_mbs) * self.jvm_xmx_ratio).floor() as i64 - i64::from(self.jvm_overhead_mbs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn service_stop_timeout(&self) -> Duration {
        Duration::from_secs(self.service_stop_timeout_secs)
    }

    pub fn token_renew_interval(&self) -> Duration {
        Duration::from_secs(self.token_renew_interval_secs)
    }

    pub fn log_copy_interval(&self) -> Duration {
        Duration::from_secs(self.log_copy_interval_secs)
    }

    /// Every resource-manager endpoint to try, primary first, without duplicates.
    pub fn resource_manager_endpoints(&self) -> Vec<Endpoint> {
        let mut endpoints = vec![self.resource_manager_address.clone()];
        for endpoint in &self.other_resource_manager_addresses {
            if !endpoints.contains(endpoint) {
                endpoints.push(endpoint.clone());
            }
        }
        endpoints
    }

    pub fn application_tags(&self) -> BTreeSet<String> {
        self.application_tags
            .as_deref()
            .map(|tags| split_list(tags).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Working directory of one application on distributed storage.
    pub fn app_work_dir(&self, application_id: &str) -> PathBuf {
        self.work_dir_root
            .join(&self.application_name)
            .join(application_id)
    }

    /// Whether ids should be logged without the `application_` prefix.
    pub fn hides_application_prefix(&self) -> bool {
        self.detach_on_exit && self.launcher_mode.eq_ignore_ascii_case(AZKABAN_LAUNCHER_MODE)
    }

    /// Id as it should appear in logs.
    pub fn loggable_id(&self, application_id: &str) -> String {
        if self.hides_application_prefix() {
            application_id.replace(APPLICATION_ID_PREFIX, "")
        } else {
            application_id.to_string()
        }
    }

    /// Credential file the token refresher maintains on distributed storage.
    pub fn token_file_path(&self) -> PathBuf {
        self.work_dir_root
            .join(&self.application_name)
            .join(&self.token_file_name)
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
