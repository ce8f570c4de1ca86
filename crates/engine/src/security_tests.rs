// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ferry_adapters::FakeSecurityPlatform;
use ferry_core::{Token, FS_DELEGATION_TOKEN, RM_DELEGATION_TOKEN};

const RM: &str = "rm-a:8032";

fn platform() -> FakeSecurityPlatform {
    let platform = FakeSecurityPlatform::secure("rm/_HOST@EXAMPLE.COM");
    platform.add_ambient_token(Token::new(RM_DELEGATION_TOKEN, RM).with_secret(b"id", b"ambient"));
    platform.add_ambient_token(Token::new(RM_DELEGATION_TOKEN, "rm-b:8032"));
    platform.set_delegation_tokens(
        "hdfs://nn1:8020",
        vec![Token::new(FS_DELEGATION_TOKEN, "hdfs://nn1:8020")],
    );
    platform.set_delegation_tokens(
        "hdfs://nn2:8020",
        vec![Token::new(FS_DELEGATION_TOKEN, "hdfs://nn2:8020")],
    );
    platform
}

fn services() -> Vec<String> {
    vec!["hdfs://nn1:8020".to_string(), "hdfs://nn2:8020".to_string()]
}

#[tokio::test]
async fn bundle_drops_tokens_for_other_resource_managers() {
    let platform = platform();

    let bytes = setup_security_tokens(&platform, &services(), &Endpoint::new(RM), None)
        .await
        .unwrap();

    let credentials = Credentials::decode(&bytes).unwrap();
    assert!(credentials.get(RM_DELEGATION_TOKEN, RM).is_some());
    assert!(credentials.get(RM_DELEGATION_TOKEN, "rm-b:8032").is_none());
    assert!(credentials.get(FS_DELEGATION_TOKEN, "hdfs://nn1:8020").is_some());
    assert!(credentials.get(FS_DELEGATION_TOKEN, "hdfs://nn2:8020").is_some());
    assert_eq!(credentials.len(), 3);
}

#[tokio::test]
async fn filesystem_tokens_are_renewed_by_rm_principal() {
    let platform = platform();

    fetch_filesystem_tokens(&platform, &services(), "rm/_HOST@EXAMPLE.COM")
        .await
        .unwrap();

    assert_eq!(
        platform.fetches(),
        vec![
            ("hdfs://nn1:8020".to_string(), "rm/_HOST@EXAMPLE.COM".to_string()),
            ("hdfs://nn2:8020".to_string(), "rm/_HOST@EXAMPLE.COM".to_string()),
        ]
    );
}

#[tokio::test]
async fn token_file_entries_override_ambient_ones() {
    let platform = platform();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens");
    let file: Credentials = [Token::new(RM_DELEGATION_TOKEN, RM).with_secret(b"id", b"from-file")]
        .into_iter()
        .collect();
    std::fs::write(&path, file.encode()).unwrap();

    let bytes = setup_security_tokens(&platform, &[], &Endpoint::new(RM), Some(&path))
        .await
        .unwrap();

    let credentials = Credentials::decode(&bytes).unwrap();
    assert_eq!(
        credentials.get(RM_DELEGATION_TOKEN, RM).unwrap().password,
        b"from-file".to_vec()
    );
}

#[tokio::test]
async fn unreadable_token_file_is_reported() {
    let platform = platform();
    let err = setup_security_tokens(
        &platform,
        &[],
        &Endpoint::new(RM),
        Some(Path::new("/nonexistent/tokens")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LauncherError::TokenFile { .. }));
}

#[tokio::test]
async fn corrupt_token_file_is_reported() {
    let platform = platform();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens");
    std::fs::write(&path, b"garbage").unwrap();

    let err = setup_security_tokens(&platform, &[], &Endpoint::new(RM), Some(&path))
        .await
        .unwrap_err();
    assert!(matches!(err, LauncherError::Credentials(_)));
}

#[tokio::test]
async fn failed_token_fetch_propagates() {
    let platform = platform();
    platform.fail_fetch_for("hdfs://nn2:8020");

    let err = setup_security_tokens(&platform, &services(), &Endpoint::new(RM), None)
        .await
        .unwrap_err();
    assert!(matches!(err, LauncherError::Security(SecurityError::TokenFetch { .. })));
}
