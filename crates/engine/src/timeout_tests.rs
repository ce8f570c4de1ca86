// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn completes_within_deadline() {
    let value = run_with_timeout(async { 7 }, Duration::from_secs(1), "quick")
        .await
        .unwrap();
    assert_eq!(value, 7);
}

#[tokio::test(start_paused = true)]
async fn hung_call_times_out_and_is_cancelled() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&finished);
    let err = run_with_timeout(
        async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            flag.store(true, Ordering::SeqCst);
        },
        Duration::from_secs(5),
        "application report",
    )
    .await
    .unwrap_err();

    assert_eq!(err.operation, "application report");
    assert_eq!(err.to_string(), "application report timed out after 5000ms");
    tokio::time::sleep(Duration::from_secs(7200)).await;
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn inner_errors_pass_through() {
    let result: Result<Result<(), &str>, TimeoutError> =
        run_with_timeout(async { Err("boom") }, Duration::from_secs(1), "op").await;
    assert_eq!(result.unwrap(), Err("boom"));
}
