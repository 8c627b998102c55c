use std::time::Duration;

use game_content::kinds::components::{ACTOR, WORKABLE};
use game_content::{CommandOutcome, WaitAction, WorkOnTargetAction, WorkOnTargetCommand};
use game_core::{InsertionPolicy, PlanEvent, Priority};
use runtime::{Event, FrameEvent, Runtime, RuntimeConfig, RuntimeError, Topic};

const FRAME: Duration = Duration::from_millis(100);

async fn runtime() -> Runtime {
    Runtime::builder()
        .config(RuntimeConfig::default())
        .build()
        .await
        .expect("runtime should start")
}

fn plan_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<PlanEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::Plan(event) = event {
            events.push(event.event);
        }
    }
    events
}

#[tokio::test]
async fn test_push_and_step_publishes_plan_events() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    let mut plans = handle.subscribe(Topic::Plan);

    let worker = handle.spawn(vec![ACTOR]).await.unwrap();
    let id = handle
        .push(
            worker,
            WaitAction::new(Duration::from_millis(200)),
            Priority::COMMAND_STD,
            InsertionPolicy::AppendToBack,
        )
        .await
        .unwrap();

    handle.run_frames(2, FRAME).await.unwrap();

    let events = plan_events(&mut plans);
    assert!(matches!(events.first(), Some(PlanEvent::Pushed { action, .. }) if *action == id));
    assert!(events.iter().any(|e| matches!(e, PlanEvent::Started { .. })));
    assert!(matches!(events.last(), Some(PlanEvent::Finished { action, .. }) if *action == id));
    assert!(handle.inspect_plan(worker).await.unwrap().is_empty());

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_work_command_is_idempotent() {
    let runtime = runtime().await;
    let handle = runtime.handle();

    let worker = handle.spawn(vec![ACTOR]).await.unwrap();
    let tree = handle.spawn(vec![WORKABLE]).await.unwrap();
    let command = WorkOnTargetCommand::new(tree, Duration::from_millis(100), Duration::from_secs(1));

    let first = handle.execute(worker, command).await.unwrap();
    let CommandOutcome::Pushed(id) = first else {
        panic!("expected a push, got {first:?}");
    };
    let second = handle.execute(worker, command).await.unwrap();
    assert_eq!(second, CommandOutcome::AlreadyQueued(id));
    assert_eq!(handle.inspect_plan(worker).await.unwrap().len(), 1);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_destroyed_target_cancels_work() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    let mut frames = handle.subscribe(Topic::Frame);

    let worker = handle.spawn(vec![ACTOR]).await.unwrap();
    let tree = handle.spawn(vec![WORKABLE]).await.unwrap();
    handle
        .push(
            worker,
            WorkOnTargetAction::new(tree, Duration::from_millis(100), Duration::from_secs(10)),
            Priority::COMMAND_STD,
            InsertionPolicy::AppendToBack,
        )
        .await
        .unwrap();
    handle.run_frames(3, FRAME).await.unwrap();

    assert!(handle.destroy(tree).await.unwrap());
    assert!(!handle.destroy(tree).await.unwrap());
    handle.step(FRAME).await.unwrap();

    assert!(handle.inspect_plan(worker).await.unwrap().is_empty());

    let mut destroyed = Vec::new();
    while let Ok(event) = frames.try_recv() {
        if let Event::Frame(FrameEvent::EntityDestroyed { entity, .. }) = event {
            destroyed.push(entity);
        }
    }
    // The target, then the helper effect the worker spawned.
    assert_eq!(destroyed.len(), 2);
    assert_eq!(destroyed[0], tree);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_entity_is_rejected() {
    let runtime = runtime().await;
    let handle = runtime.handle();

    let missing = game_core::EntityId(999);
    let result = handle
        .push(
            missing,
            WaitAction::new(FRAME),
            Priority::COMMAND_STD,
            InsertionPolicy::AppendToBack,
        )
        .await;
    assert!(matches!(result, Err(RuntimeError::UnknownEntity(id)) if id == missing));

    let prop = handle.spawn(vec![WORKABLE]).await.unwrap();
    assert!(matches!(
        handle.inspect_plan(prop).await,
        Err(RuntimeError::NoPlan(_))
    ));

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_inactive_plan_does_not_tick() {
    let runtime = runtime().await;
    let handle = runtime.handle();

    let worker = handle.spawn(vec![ACTOR]).await.unwrap();
    handle
        .push(
            worker,
            WaitAction::new(FRAME),
            Priority::COMMAND_STD,
            InsertionPolicy::AppendToBack,
        )
        .await
        .unwrap();
    handle.set_active(worker, false).await.unwrap();

    let report = handle.step(FRAME).await.unwrap();
    assert_eq!(report.updated, 0);
    assert_eq!(handle.inspect_plan(worker).await.unwrap().len(), 1);

    handle.set_active(worker, true).await.unwrap();
    handle.step(FRAME).await.unwrap();
    assert!(handle.inspect_plan(worker).await.unwrap().is_empty());

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_automatic_ticking() {
    let config = RuntimeConfig {
        tick_interval: Some(Duration::from_millis(5)),
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder().config(config).build().await.unwrap();
    let handle = runtime.handle();
    let mut frames = handle.subscribe(Topic::Frame);

    let stepped = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(Event::Frame(FrameEvent::Stepped { frame, .. })) = frames.recv().await
                && frame >= 2
            {
                return frame;
            }
        }
    })
    .await
    .expect("worker should tick on its own");
    assert!(stepped >= 2);

    drop(handle);
    runtime.shutdown().await.unwrap();
}
