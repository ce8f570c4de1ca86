// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable timestamps and run times for reports.

use chrono::{DateTime, Utc};

/// Format epoch milliseconds as RFC 3339 (UTC). Zero means "not set".
pub fn format_epoch_ms(ms: u64) -> String {
    if ms == 0 {
        return "-".to_string();
    }
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}

/// Wall time between start and finish as `"45s"`, `"12m3s"`, `"2h7m"`.
///
/// Returns `None` until the application has both timestamps.
pub fn format_run_time(start_ms: u64, finish_ms: u64) -> Option<String> {
    if start_ms == 0 || finish_ms < start_ms {
        return None;
    }
    let secs = (finish_ms - start_ms) / 1000;
    Some(if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    })
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
