// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_notify_records_calls() {
    let adapter = FakeNotifyAdapter::new();

    adapter.notify("Ferry application demo completed", "first").await.unwrap();
    adapter.notify("Ferry application demo completed", "second").await.unwrap();

    let calls = adapter.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].title, "Ferry application demo completed");
    assert_eq!(calls[1].message, "second");
}

#[tokio::test]
async fn fake_notify_failure_still_records() {
    let adapter = FakeNotifyAdapter::new();
    adapter.fail_with("relay refused");

    let err = adapter.notify("t", "m").await.unwrap_err();
    assert_eq!(err.to_string(), "send failed: relay refused");
    assert_eq!(adapter.calls().len(), 1);
}
