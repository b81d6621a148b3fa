use glam::Vec2;
use voidmaw::config::SimConfig;
use voidmaw::context::SimContext;
use voidmaw::events::GameEvent;
use voidmaw::sandbox::{Executor, SandboxError};

const SPAWN: Vec2 = Vec2::new(240.0, 360.0);
const EYE: Vec2 = Vec2::new(920.0, 400.0);
const DT: f32 = 1.0 / 60.0;

fn new_fixture() -> (SimContext, Executor) {
    let config = SimConfig::default();
    let ctx = SimContext::new(&config);
    let executor = Executor::new(&config.sandbox);
    (ctx, executor)
}

#[test]
fn compile_error_creates_no_entities() {
    let (mut ctx, mut executor) = new_fixture();
    let result = executor.execute(&mut ctx, "let x = ;", SPAWN, None, EYE);
    assert!(
        matches!(result, Err(SandboxError::Compile(_))),
        "broken syntax should surface as a compile error, got {result:?}"
    );
    assert!(ctx.registry.is_empty(), "a compile failure must not create entities");
    assert_eq!(executor.task_count(), 0);
}

#[test]
fn runtime_error_keeps_prior_registrations() {
    let (mut ctx, mut executor) = new_fixture();
    let source = r#"
        let a = api.spawn_ball(spawn_x, spawn_y, 6.0);
        api.register(a);
        no_such_function();
    "#;
    let result = executor.execute(&mut ctx, source, SPAWN, None, EYE);
    assert!(
        matches!(result, Err(SandboxError::Runtime(_))),
        "missing function should surface as a runtime error, got {result:?}"
    );
    assert_eq!(ctx.registry.len(), 1, "entities registered before the throw must remain");
    let entry = ctx.registry.iter().next().expect("registered entry");
    assert!(entry.spawned);
    assert!(!entry.ephemeral, "a top-level registration is a root entity");
}

#[test]
fn runaway_script_hits_operation_budget() {
    let (mut ctx, mut executor) = new_fixture();
    let result = executor.execute(&mut ctx, "loop { }", SPAWN, None, EYE);
    assert!(
        matches!(result, Err(SandboxError::Runtime(_))),
        "an infinite loop should exhaust the operation budget, got {result:?}"
    );
}

#[test]
fn scope_exposes_spawn_and_eye_target() {
    let (mut ctx, mut executor) = new_fixture();
    let source = r#"
        let a = api.spawn_ball(api.eye_x(), api.eye_y(), 5.0);
        api.register(a);
    "#;
    executor.execute(&mut ctx, source, SPAWN, None, EYE).expect("script should run");
    let entry = ctx.registry.iter().next().expect("registered entry");
    let position = ctx.physics.body_position(entry.body).expect("body exists");
    assert!(
        (position - EYE).length() < 1e-3,
        "body should spawn at the eye target, got {position:?}"
    );
}

#[test]
fn root_and_ephemeral_classification_follows_frame() {
    let (mut ctx, mut executor) = new_fixture();
    let source = r#"
        let a = api.spawn_ball(spawn_x, spawn_y, 6.0);
        api.register(a);

        fn update(api, dt) {
            let b = api.spawn_ball(120.0, 120.0, 4.0);
            api.register(b);
        }
    "#;
    executor.execute(&mut ctx, source, SPAWN, None, EYE).expect("script should run");
    assert_eq!(executor.task_count(), 1, "a script defining update contributes one task");
    assert_eq!(ctx.registry.len(), 1);

    executor.run_tasks(&mut ctx, EYE, DT);
    assert_eq!(ctx.registry.len(), 2);

    let entries: Vec<_> = ctx.registry.iter().collect();
    assert!(!entries[0].ephemeral, "entity registered during execute is a root");
    assert!(entries[1].ephemeral, "entity registered inside update is ephemeral");
    assert_eq!(executor.ephemeral_count(), 1);
}

#[test]
fn ephemeral_ring_never_exceeds_capacity_and_evicts_oldest() {
    let (mut ctx, mut executor) = new_fixture();
    let source = r#"
        fn update(api, dt) {
            for i in 0..10 {
                let b = api.spawn_ball(60.0 + i.to_float() * 8.0, 80.0, 3.0);
                api.register(b);
            }
        }
    "#;
    executor.execute(&mut ctx, source, SPAWN, None, EYE).expect("script should run");

    // 41 ticks x 10 registrations = 410 ephemerals against a cap of 400.
    for _ in 0..41 {
        executor.run_tasks(&mut ctx, EYE, DT);
    }

    assert_eq!(executor.ephemeral_count(), 400, "ring buffer must stay at capacity");
    assert_eq!(ctx.registry.len(), 400, "evicted entities must leave the registry");
    for evicted in 1..=10u64 {
        assert!(
            ctx.registry.get(evicted).is_none(),
            "entity {evicted} is among the 10 oldest and should have been evicted"
        );
    }
    assert!(ctx.registry.get(11).is_some(), "entity 11 should have survived eviction");

    let evictions = ctx
        .events
        .drain()
        .into_iter()
        .filter(|event| matches!(event, GameEvent::EphemeralEvicted { .. }))
        .count();
    assert_eq!(evictions, 10, "exactly one eviction per overflowing registration");
}

#[test]
fn updater_error_prunes_only_the_failing_task() {
    let (mut ctx, mut executor) = new_fixture();
    let broken = r#"
        fn update(api, dt) {
            this_function_does_not_exist();
        }
    "#;
    let healthy = r#"
        fn update(api, dt) {
            let b = api.spawn_ball(90.0, 90.0, 3.0);
            api.register(b);
        }
    "#;
    executor.execute(&mut ctx, broken, SPAWN, None, EYE).expect("broken task compiles fine");
    executor.execute(&mut ctx, healthy, SPAWN, None, EYE).expect("healthy task compiles fine");
    assert_eq!(executor.task_count(), 2);

    executor.run_tasks(&mut ctx, EYE, DT);
    assert_eq!(executor.task_count(), 1, "only the failing task should be pruned");
    assert_eq!(ctx.registry.len(), 1, "the healthy sibling still ran");

    executor.run_tasks(&mut ctx, EYE, DT);
    assert_eq!(ctx.registry.len(), 2, "the survivor keeps running on later ticks");
}

#[test]
fn task_dies_once_all_root_bodies_are_gone() {
    let (mut ctx, mut executor) = new_fixture();
    let source = r#"
        let a = api.spawn_ball(spawn_x, spawn_y, 6.0);
        api.register(a);

        fn update(api, dt) {
            let b = api.spawn_ball(50.0, 50.0, 3.0);
            api.register(b);
        }
    "#;
    executor.execute(&mut ctx, source, SPAWN, None, EYE).expect("script should run");
    assert_eq!(executor.task_count(), 1);

    let root_body = ctx.registry.iter().next().expect("root entry").body;
    ctx.physics.destroy_body(root_body);

    executor.run_tasks(&mut ctx, EYE, DT);
    assert_eq!(executor.task_count(), 0, "task with no live root bodies must die");
    assert_eq!(ctx.registry.len(), 1, "a dead task's update must not have been invoked");
}
