use std::sync::Arc;
use std::time::Duration;

use game_content::kinds::components::{ACTOR, WORKABLE};
use game_content::{WaitAction, WorkOnTargetAction};
use game_core::{InsertionPolicy, Priority};
use runtime::{
    FileSnapshotRepository, InMemorySnapshotRepository, Runtime, RuntimeConfig, RuntimeError,
    SnapshotRepository, read_snapshot_file,
};
use tempfile::TempDir;

const FRAME: Duration = Duration::from_millis(100);

#[tokio::test]
async fn test_save_and_load_resumes_wait() {
    let repository = Arc::new(InMemorySnapshotRepository::new());
    let runtime = Runtime::builder()
        .repository(repository.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    let worker = handle.spawn(vec![ACTOR]).await.unwrap();
    handle
        .push(
            worker,
            WaitAction::new(Duration::from_secs(10)),
            Priority::COMMAND_STD,
            InsertionPolicy::AppendToBack,
        )
        .await
        .unwrap();
    handle.run_frames(50, FRAME).await.unwrap();

    let metadata = handle.save("halfway").await.unwrap();
    assert_eq!(metadata.frame, 50);
    assert_eq!(metadata.plans, 1);
    assert!(repository.exists("halfway"));

    // Let the wait finish, then rewind.
    handle.run_frames(60, FRAME).await.unwrap();
    assert!(handle.inspect_plan(worker).await.unwrap().is_empty());

    assert_eq!(handle.load("halfway").await.unwrap(), 50);
    let plan = handle.inspect_plan(worker).await.unwrap();
    assert_eq!(plan.len(), 1);
    assert!(!plan[0].started);

    // Exactly 5 s remain.
    handle.run_frames(49, FRAME).await.unwrap();
    assert_eq!(handle.inspect_plan(worker).await.unwrap().len(), 1);
    handle.step(FRAME).await.unwrap();
    assert!(handle.inspect_plan(worker).await.unwrap().is_empty());

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_file_repository_round_trip_through_runtime() {
    let dir = TempDir::new().unwrap();
    let config = RuntimeConfig {
        save_dir: Some(dir.path().to_path_buf()),
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder().config(config).build().await.unwrap();
    let handle = runtime.handle();

    let worker = handle.spawn(vec![ACTOR]).await.unwrap();
    let tree = handle.spawn(vec![WORKABLE]).await.unwrap();
    handle
        .push(
            worker,
            WorkOnTargetAction::new(tree, Duration::from_millis(200), Duration::from_secs(2)),
            Priority::COMMAND_STD,
            InsertionPolicy::AppendToBack,
        )
        .await
        .unwrap();
    handle.run_frames(5, FRAME).await.unwrap();
    handle.save("slot-1").await.unwrap();

    let (snapshot, metadata) = read_snapshot_file(&dir.path().join("slot-1.snap")).unwrap();
    let metadata = metadata.expect("metadata side-file is written");
    assert_eq!(snapshot.frame, 5);
    assert_eq!(metadata.checksum.len(), 64);
    // Worker, tree and the effect spawned while working.
    assert_eq!(snapshot.entities.len(), 3);
    assert!(snapshot.entity(worker).unwrap().plan.is_some());

    let repository = FileSnapshotRepository::new(dir.path()).unwrap();
    assert_eq!(repository.list().unwrap(), vec!["slot-1".to_string()]);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_save_without_repository_fails() {
    let runtime = Runtime::builder().build().await.unwrap();
    let handle = runtime.handle();

    assert!(matches!(
        handle.save("nowhere").await,
        Err(RuntimeError::RepositoryNotConfigured)
    ));

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_load_missing_snapshot() {
    let runtime = Runtime::builder()
        .repository(Arc::new(InMemorySnapshotRepository::new()))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    assert!(matches!(
        handle.load("absent").await,
        Err(RuntimeError::SnapshotNotFound(name)) if name == "absent"
    ));

    drop(handle);
    runtime.shutdown().await.unwrap();
}
