// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::security::InsecurePlatform;
use ferry_core::{FS_DELEGATION_TOKEN, RM_DELEGATION_TOKEN};
use tempfile::TempDir;

const SCRIPT: &str = r#"
case "$3" in
  login) exit 0 ;;
  whoami) echo '{"principal":"rm/host@REALM"}' ;;
  credentials)
    echo '[{"kind":"RM_DELEGATION_TOKEN","service":"rm-a:8032","identifier":[1],"password":[2]}]' ;;
  delegation-tokens)
    if [ "$5" = "broken" ]; then echo "namenode unreachable" >&2; exit 2; fi
    echo "[{\"kind\":\"HDFS_DELEGATION_TOKEN\",\"service\":\"$5\",\"identifier\":[],\"password\":[]}]" ;;
esac
"#;

fn platform(dir: &TempDir) -> BridgeSecurityPlatform {
    let script = dir.path().join("bridge.sh");
    std::fs::write(&script, SCRIPT).unwrap();
    BridgeSecurityPlatform::new(
        &format!("sh {}", script.display()),
        Endpoint::new("rm-a:8032"),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn reads_principal_and_credentials() {
    let dir = TempDir::new().unwrap();
    let platform = platform(&dir);

    assert!(platform.is_security_enabled());
    platform.login().await.unwrap();
    assert_eq!(
        platform.resource_manager_principal().await.unwrap(),
        "rm/host@REALM"
    );
    let creds = platform.current_credentials().await.unwrap();
    assert!(creds.get(RM_DELEGATION_TOKEN, "rm-a:8032").is_some());
}

#[tokio::test]
async fn fetches_delegation_tokens_per_service() {
    let dir = TempDir::new().unwrap();
    let platform = platform(&dir);

    let tokens = platform
        .delegation_tokens("hdfs://nn1:8020", "rm/host@REALM")
        .await
        .unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, FS_DELEGATION_TOKEN);
    assert_eq!(tokens[0].service, "hdfs://nn1:8020");

    let err = platform
        .delegation_tokens("broken", "rm/host@REALM")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("namenode unreachable"), "got {err}");
}

#[tokio::test]
async fn insecure_platform_is_inert() {
    let platform = InsecurePlatform;
    assert!(!platform.is_security_enabled());
    assert!(platform.current_credentials().await.unwrap().is_empty());
    assert!(platform.delegation_tokens("x", "y").await.unwrap().is_empty());
}
