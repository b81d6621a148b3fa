use std::collections::VecDeque;
use std::ptr;

use glam::Vec2;
use rand::Rng;
use rapier2d::prelude::RigidBodyHandle;
use rhai::{Engine, Scope, AST};
use thiserror::Error;

use crate::config::SandboxConfig;
use crate::constants::MAX_EPHEMERAL;
use crate::context::SimContext;
use crate::events::GameEvent;
use crate::physics::BodyFlags;
use crate::registry::{EntityId, EntityKind, RenderAttrs};

/// How `execute` failed. Updater errors on later ticks are caught per
/// task and never surface here.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("script failed to compile: {0}")]
    Compile(String),
    #[error("script failed during execution: {0}")]
    Runtime(String),
}

/// Whether a registration happens during a script's one-time invocation
/// or inside a recurring updater call. Carried on the execution frame so
/// classification never depends on mutable flag state.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FrameMode {
    Root,
    Recurring,
}

/// One recurring behavior contributed by one `execute` call. Dead once
/// every body it registered at root level is gone from the world.
struct UpdaterTask {
    ast: AST,
    scope: Scope<'static>,
    root_bodies: Vec<RigidBodyHandle>,
    dead: bool,
}

/// Capability surface handed to scripts. The same raw-pointer shape the
/// engine uses for its script API: pointers are only valid for the
/// duration of the invocation that built this value.
#[derive(Clone, Copy)]
pub struct SandboxApi {
    sim: *mut SimContext,
    ephemerals: *mut VecDeque<EntityId>,
    roots: *mut Vec<RigidBodyHandle>,
    mode: FrameMode,
    eye_target: Vec2,
}

unsafe impl Send for SandboxApi {}
unsafe impl Sync for SandboxApi {}

impl SandboxApi {
    fn new(
        sim: &mut SimContext,
        ephemerals: &mut VecDeque<EntityId>,
        roots: Option<&mut Vec<RigidBodyHandle>>,
        mode: FrameMode,
        eye_target: Vec2,
    ) -> Self {
        Self {
            sim,
            ephemerals,
            roots: roots.map_or(ptr::null_mut(), |roots| roots as *mut _),
            mode,
            eye_target,
        }
    }

    fn spawn_ball(&mut self, x: f32, y: f32, radius: f32) -> rhai::INT {
        let sim = unsafe { &mut *self.sim };
        let radius = radius.clamp(2.0, 64.0);
        let (body, _collider) =
            sim.physics.spawn_dynamic_ball(Vec2::new(x, y), radius, 0.0, Vec2::ZERO, BodyFlags::empty());
        sim.registry.register(EntityKind::Scripted, body, RenderAttrs::default()) as rhai::INT
    }

    fn spawn_box(&mut self, x: f32, y: f32, half_width: f32, half_height: f32) -> rhai::INT {
        let sim = unsafe { &mut *self.sim };
        let half = Vec2::new(half_width.clamp(2.0, 64.0), half_height.clamp(2.0, 64.0));
        let (body, _collider) =
            sim.physics.spawn_dynamic_box(Vec2::new(x, y), half, 0.0, Vec2::ZERO, BodyFlags::empty());
        sim.registry.register(EntityKind::Scripted, body, RenderAttrs::default()) as rhai::INT
    }

    fn register(&mut self, id: rhai::INT) -> bool {
        let sim = unsafe { &mut *self.sim };
        let body;
        {
            let Some(entry) = sim.registry.get_mut(id as EntityId) else {
                return false;
            };
            if entry.spawned {
                return true;
            }
            entry.spawned = true;
            if self.mode == FrameMode::Recurring {
                entry.ephemeral = true;
            }
            body = entry.body;
        }
        match self.mode {
            FrameMode::Root => unsafe { (*self.roots).push(body) },
            FrameMode::Recurring => {
                sim.physics.add_flags(body, BodyFlags::EPHEMERAL);
                let ring = unsafe { &mut *self.ephemerals };
                ring.push_back(id as EntityId);
                if ring.len() > MAX_EPHEMERAL {
                    if let Some(oldest) = ring.pop_front() {
                        // Eviction is idempotent: the entry may already be
                        // gone if something else destroyed it first.
                        if let Some(old) = sim.registry.unregister(oldest) {
                            sim.physics.destroy_body(old.body);
                        }
                        sim.events.push(GameEvent::EphemeralEvicted { entity: oldest });
                    }
                }
            }
        }
        sim.events.push(GameEvent::ObjectRegistered {
            entity: id as EntityId,
            ephemeral: self.mode == FrameMode::Recurring,
        });
        true
    }

    fn set_velocity(&mut self, id: rhai::INT, vx: f32, vy: f32) -> bool {
        let sim = unsafe { &mut *self.sim };
        match sim.registry.get(id as EntityId) {
            Some(entry) => sim.physics.set_velocity(entry.body, Vec2::new(vx, vy)),
            None => false,
        }
    }

    fn apply_force(&mut self, id: rhai::INT, fx: f32, fy: f32) -> bool {
        let sim = unsafe { &mut *self.sim };
        match sim.registry.get(id as EntityId) {
            Some(entry) => sim.physics.apply_impulse(entry.body, Vec2::new(fx, fy)),
            None => false,
        }
    }

    /// Current weak-point position, or the fallback aim point while no
    /// combat is running.
    fn eye_x(&mut self) -> f32 {
        self.eye_target.x
    }

    fn eye_y(&mut self) -> f32 {
        self.eye_target.y
    }

    fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        let mut rng = rand::thread_rng();
        rng.gen_range(min..max)
    }

    fn log(&mut self, message: &str) {
        println!("[script] {message}");
        let sim = unsafe { &mut *self.sim };
        sim.events.push(GameEvent::ScriptMessage { message: message.to_string() });
    }
}

fn register_api(engine: &mut Engine) {
    engine.register_type_with_name::<SandboxApi>("World");
    engine.register_fn("spawn_ball", SandboxApi::spawn_ball);
    engine.register_fn("spawn_box", SandboxApi::spawn_box);
    engine.register_fn("register", SandboxApi::register);
    engine.register_fn("set_velocity", SandboxApi::set_velocity);
    engine.register_fn("apply_force", SandboxApi::apply_force);
    engine.register_fn("eye_x", SandboxApi::eye_x);
    engine.register_fn("eye_y", SandboxApi::eye_y);
    engine.register_fn("rand", SandboxApi::random_range);
    engine.register_fn("log", SandboxApi::log);
}

/// Compiles and runs untrusted behavior scripts over the enumerated
/// capability surface, and drives the updater tasks they leave behind.
pub struct Executor {
    engine: Engine,
    tasks: Vec<UpdaterTask>,
    ephemerals: VecDeque<EntityId>,
}

impl Executor {
    pub fn new(config: &SandboxConfig) -> Self {
        let mut engine = Engine::new();
        engine.set_fast_operators(true);
        // Budget so a runaway script errors out instead of stalling the tick.
        engine.set_max_operations(config.max_operations);
        register_api(&mut engine);
        Self { engine, tasks: Vec::new(), ephemerals: VecDeque::new() }
    }

    /// Runs one script to completion. Entities registered before a runtime
    /// failure remain; there is no rollback. If the script defines
    /// `fn update(api, dt)` it is retained as an updater task.
    pub fn execute(
        &mut self,
        ctx: &mut SimContext,
        source: &str,
        spawn: Vec2,
        target: Option<Vec2>,
        eye_target: Vec2,
    ) -> Result<(), SandboxError> {
        let ast = self.engine.compile(source).map_err(|err| SandboxError::Compile(err.to_string()))?;

        let bounds = ctx.physics.bounds();
        let aim = target.unwrap_or(spawn);
        let mut scope = Scope::new();
        scope.push_constant("field_width", bounds.width);
        scope.push_constant("field_height", bounds.height);
        scope.push_constant("spawn_x", spawn.x);
        scope.push_constant("spawn_y", spawn.y);
        scope.push_constant("target_x", aim.x);
        scope.push_constant("target_y", aim.y);

        let mut roots: Vec<RigidBodyHandle> = Vec::new();
        let api =
            SandboxApi::new(ctx, &mut self.ephemerals, Some(&mut roots), FrameMode::Root, eye_target);
        scope.push("api", api);

        let run = self.engine.run_ast_with_scope(&mut scope, &ast);
        scope.rewind(0);
        run.map_err(|err| SandboxError::Runtime(err.to_string()))?;

        if ast.iter_functions().any(|f| f.name == "update") {
            self.tasks.push(UpdaterTask { ast, scope, root_bodies: roots, dead: false });
        }
        Ok(())
    }

    /// Invokes every live updater task once. A task whose root bodies are
    /// all gone is marked dead without being called; a task that errors is
    /// pruned on its own, siblings keep running.
    pub fn run_tasks(&mut self, ctx: &mut SimContext, eye_target: Vec2, dt: f32) {
        let engine = &self.engine;
        let ephemerals = &mut self.ephemerals;
        for task in &mut self.tasks {
            if !task.root_bodies.is_empty()
                && task.root_bodies.iter().all(|handle| !ctx.physics.contains(*handle))
            {
                task.dead = true;
                continue;
            }
            let api = SandboxApi::new(ctx, ephemerals, None, FrameMode::Recurring, eye_target);
            if let Err(err) = engine.call_fn::<()>(&mut task.scope, &task.ast, "update", (api, dt)) {
                eprintln!("[sandbox] updater task error, pruning: {err}");
                task.dead = true;
            }
        }
        self.tasks.retain(|task| !task.dead);
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn ephemeral_count(&self) -> usize {
        self.ephemerals.len()
    }
}
