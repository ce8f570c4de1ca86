// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn list_returns_direct_children_only() {
    let fs = FakeFileSystem::new();
    fs.add_dir("/cache/2026-09", 10);
    fs.add_dir("/cache/2026-10", 20);
    fs.add_file("/cache/2026-10/a.jar", b"a");

    let listed = fs.list(Path::new("/cache")).await.unwrap();
    let names: Vec<_> = listed.iter().filter_map(|s| s.name()).collect();
    assert_eq!(names, vec!["2026-09", "2026-10"]);
    assert_eq!(listed[0].modified_ms, 10);
}

#[tokio::test]
async fn injected_failures() {
    let fs = FakeFileSystem::new();
    fs.add_dir("/cache/old", 1);
    fs.fail_delete_of("/cache/old");
    fs.fail_next_uploads(1);

    assert!(fs.delete(Path::new("/cache/old"), true).await.is_err());
    assert!(fs.contains("/cache/old"));

    let local = tempfile::NamedTempFile::new().unwrap();
    assert!(fs
        .copy_from_local(local.path(), Path::new("/x"))
        .await
        .is_err());
    fs.copy_from_local(local.path(), Path::new("/x"))
        .await
        .unwrap();
    assert_eq!(fs.uploads().len(), 2);
}

#[tokio::test]
async fn provider_handles_close_independently() {
    let provider = FakeFileSystemProvider::new();
    let first = provider.connect().unwrap();
    first.write(Path::new("/w/a"), b"1").await.unwrap();
    first.close().await.unwrap();

    let second = provider.connect().unwrap();
    assert!(second.exists(Path::new("/w/a")).await.unwrap());
    assert!(matches!(
        first.exists(Path::new("/w/a")).await,
        Err(FsError::Closed)
    ));
    assert_eq!(provider.connects(), 2);
}
