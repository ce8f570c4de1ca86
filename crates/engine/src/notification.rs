// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-of-run notification content

use ferry_core::{format_epoch_ms, ApplicationReport};
use std::fmt::Write;

pub fn shutdown_subject(application_name: &str) -> String {
    format!("Ferry application {} completed", application_name)
}

/// Summary of the final report, or `Not available` when no report was
/// ever obtained.
pub fn shutdown_body(report: Option<&ApplicationReport>) -> String {
    let mut body = String::from("Ferry ApplicationReport:");
    let Some(report) = report else {
        body.push_str(" Not available");
        return body;
    };

    let attempt = report.current_attempt_id.as_deref().unwrap_or("-");
    let _ = writeln!(body);
    let _ = writeln!(body, "\tApplication ID: {}", report.application_id);
    let _ = writeln!(body, "\tApplication attempt ID: {}", attempt);
    let _ = writeln!(body, "\tFinal application status: {}", report.final_status);
    let _ = writeln!(body, "\tStart time: {}", format_epoch_ms(report.start_time_ms));
    let _ = writeln!(body, "\tFinish time: {}", format_epoch_ms(report.finish_time_ms));
    if !report.diagnostics.is_empty() {
        let _ = writeln!(body, "\tDiagnostics: {}", report.diagnostics);
    }
    if let Some(usage) = &report.usage {
        let _ = writeln!(body, "\tUsed containers: {}", usage.used_containers);
        if let Some(used) = &usage.used_resources {
            let _ = writeln!(body, "\tUsed memory (MBs): {}", used.memory_mbs);
            let _ = writeln!(body, "\tUsed vcores: {}", used.vcores);
        }
    }
    body
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
