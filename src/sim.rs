use glam::Vec2;
use rand::Rng;

use crate::boss::BossEntity;
use crate::combat::{CombatState, Health, HealthMeter};
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::events::GameEvent;
use crate::physics::BodyFlags;
use crate::registry::{EntityId, EntityKind, RenderAttrs};
use crate::sandbox::{Executor, SandboxError};

/// One complete encounter instance: shared context, executor, state
/// machine, boss, and the external health resource. Drives the fixed
/// per-tick order: combat update, boss update, updater tasks, physics
/// step.
pub struct Simulation {
    config: SimConfig,
    ctx: SimContext,
    executor: Executor,
    combat: CombatState,
    boss: Option<BossEntity>,
    health: Box<dyn Health>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self::with_health(config, Box::new(HealthMeter::default()))
    }

    pub fn with_health(config: SimConfig, health: Box<dyn Health>) -> Self {
        let ctx = SimContext::new(&config);
        let executor = Executor::new(&config.sandbox);
        Self { config, ctx, executor, combat: CombatState::new(), boss: None, health }
    }

    /// Scatters static, detachable scenery across the left part of the
    /// field, clear of the boss resting spot.
    pub fn populate_scenery(&mut self) {
        let field = self.config.field.clone();
        let half = Vec2::splat(self.config.scenery.half_extent);
        let mut rng = rand::thread_rng();
        for _ in 0..self.config.scenery.count {
            let position = Vec2::new(
                rng.gen_range(field.width * 0.08..field.width * 0.60),
                rng.gen_range(field.height * 0.10..field.height * 0.90),
            );
            self.spawn_scenery_at(position, half);
        }
    }

    pub fn spawn_scenery_at(&mut self, position: Vec2, half: Vec2) -> EntityId {
        let (body, _collider) = self.ctx.physics.spawn_static_box(position, half, BodyFlags::SCENERY);
        let id = self.ctx.registry.register(EntityKind::Scenery, body, RenderAttrs::default());
        if let Some(entry) = self.ctx.registry.get_mut(id) {
            entry.spawned = true;
        }
        id
    }

    pub fn spawn_cursor_proxy(&mut self, position: Vec2) -> EntityId {
        let (body, _collider) =
            self.ctx.physics.spawn_kinematic_ball(position, 6.0, false, BodyFlags::CURSOR);
        self.ctx.registry.register(EntityKind::Cursor, body, RenderAttrs::default())
    }

    pub fn spawn_assistant_icon(&mut self, position: Vec2) -> EntityId {
        let (body, _collider) =
            self.ctx.physics.spawn_kinematic_ball(position, 10.0, false, BodyFlags::ASSISTANT);
        self.ctx.registry.register(EntityKind::Assistant, body, RenderAttrs::default())
    }

    /// Begins the encounter: no-op unless the state machine is idle.
    pub fn start_encounter(&mut self) -> bool {
        if !self.combat.start() {
            return false;
        }
        self.boss = Some(BossEntity::spawn(&mut self.ctx));
        true
    }

    /// Runs one untrusted script at the given spawn point.
    pub fn execute_script(
        &mut self,
        source: &str,
        spawn: Vec2,
        target: Option<Vec2>,
    ) -> Result<(), SandboxError> {
        let eye_target = self.eye_target();
        self.executor.execute(&mut self.ctx, source, spawn, target, eye_target)
    }

    /// One logical tick. Returns the events raised during it so the
    /// caller can render or log them.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        self.combat.update(self.health.as_ref(), dt);
        if self.combat.phase().is_active() {
            if let Some(boss) = self.boss.as_mut() {
                boss.update(&mut self.ctx, &mut self.combat, self.health.as_mut(), dt);
            }
        }
        let eye_target = self.eye_target();
        self.executor.run_tasks(&mut self.ctx, eye_target, dt);
        self.ctx.physics.step(dt);

        let events = self.ctx.events.drain();
        for event in &events {
            if let GameEvent::ObjectRegistered { .. } = event {
                self.combat.record_object_created();
            }
        }
        events
    }

    /// Aim point for scripts: the live weak-point position, or the field
    /// center while no combat is running.
    pub fn eye_target(&self) -> Vec2 {
        match (&self.boss, self.combat.phase().is_active()) {
            (Some(boss), true) => boss.eye_position(),
            _ => {
                let bounds = self.ctx.physics.bounds();
                Vec2::new(bounds.width * 0.5, bounds.height * 0.5)
            }
        }
    }

    pub fn combat(&self) -> &CombatState {
        &self.combat
    }

    pub fn boss(&self) -> Option<&BossEntity> {
        self.boss.as_ref()
    }

    pub fn health_value(&self) -> f32 {
        self.health.health()
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
