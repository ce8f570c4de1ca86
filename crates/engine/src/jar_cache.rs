// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared jar cache on distributed storage.
//!
//! Jars are uploaded once into a per-month directory under the cache root
//! and reused by every launch in that month. Old months are pruned so the
//! cache only covers the longest expected run.

use chrono::{DateTime, Utc};
use ferry_adapters::{FileSystem, FsError};
use std::path::{Path, PathBuf};

/// Directory name of the cache period containing `now` (`YYYY-MM`)
pub fn period_name(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// `<root>/<YYYY-MM>` for the period containing `now`
pub fn per_month_cache_path(root: &Path, now: DateTime<Utc>) -> PathBuf {
    root.join(period_name(now))
}

/// Names of the period directories to keep: `current` (when present) plus
/// the newest others, `k` in total.
pub(crate) fn periods_to_keep<'a>(names: &[&'a str], k: usize, current: &str) -> Vec<&'a str> {
    let k = k.max(1);
    let mut sorted: Vec<&str> = names.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let mut keep: Vec<&str> = sorted.iter().copied().filter(|n| *n == current).collect();
    for name in sorted {
        if keep.len() >= k {
            break;
        }
        if name != current {
            keep.push(name);
        }
    }
    keep
}

/// Delete all but the `k` most recent period directories under `parent`.
///
/// The `current` period is never deleted. Returns false if any directory
/// could not be removed; failures are logged and never propagated.
pub async fn retain_k_latest<F: FileSystem>(
    fs: &F,
    parent: &Path,
    k: usize,
    current: &str,
) -> bool {
    let entries = match fs.list(parent).await {
        Ok(entries) => entries,
        Err(FsError::NotFound(_)) => return true,
        Err(e) => {
            tracing::warn!(path = %parent.display(), error = %e, "failed to list jar cache");
            return false;
        }
    };

    let dirs: Vec<&str> = entries
        .iter()
        .filter(|e| e.is_dir)
        .filter_map(|e| e.name())
        .collect();
    let keep = periods_to_keep(&dirs, k, current);

    let mut all_deleted = true;
    for name in dirs.iter().filter(|n| !keep.contains(*n)) {
        let path = parent.join(name);
        match fs.delete(&path, true).await {
            Ok(_) => tracing::info!(path = %path.display(), "deleted expired jar cache period"),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to delete expired jar cache period"
                );
                all_deleted = false;
            }
        }
    }
    all_deleted
}

#[cfg(test)]
#[path = "jar_cache_tests.rs"]
mod tests;
