// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Externally supplied credential file merged into submissions
pub const TOKEN_FILE_LOCATION: &str = "FERRY_TOKEN_FILE_LOCATION";

/// Set in the application master's environment
pub const APPLICATION_NAME: &str = "FERRY_APPLICATION_NAME";
pub const APPLICATION_ID: &str = "FERRY_APPLICATION_ID";

/// Token file override, if set and non-empty.
pub fn token_file_location() -> Option<PathBuf> {
    std::env::var_os(TOKEN_FILE_LOCATION)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Environment handed to the application master container.
pub fn master_environment(application_name: &str, application_id: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (APPLICATION_NAME.to_string(), application_name.to_string()),
        (APPLICATION_ID.to_string(), application_id.to_string()),
    ])
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
