use glam::Vec2;
use rand::Rng;
use rapier2d::prelude::{ColliderHandle, RigidBodyHandle, RigidBodyType, Vector};
use smallvec::SmallVec;
use std::collections::HashSet;

use crate::combat::{CombatState, Health};
use crate::constants::*;
use crate::context::SimContext;
use crate::events::GameEvent;
use crate::physics::{body_flags, BodyFlags};

/// Pull strength of the suction field at `distance` from the boss center.
/// Inverse-distance, not inverse-square: the field stays felt across the
/// whole arena.
pub fn suction_strength(visual_radius: f32, distance: f32) -> f32 {
    (SUCTION_BASE_STRENGTH + SUCTION_GROWTH_STRENGTH * (visual_radius - BOSS_INITIAL_RADIUS)) / distance
}

/// Directed suction force on a body at `position`. Zero inside the
/// singularity guard around the center.
pub fn suction_force(center: Vec2, position: Vec2, visual_radius: f32) -> Vec2 {
    let delta = center - position;
    let dist_sq = delta.length_squared();
    if dist_sq < SUCTION_MIN_DIST_SQ {
        return Vec2::ZERO;
    }
    let dist = dist_sq.sqrt();
    delta / dist * suction_strength(visual_radius, dist)
}

/// Health damage dealt by a body striking the eye. Raw speed magnitude,
/// no impact-angle term.
pub fn impact_damage(linear_speed: f32, mass: f32) -> f32 {
    linear_speed * mass * MOMENTUM_SCALE
}

/// The adversary: an absorbing core fixed at the center plus a weak-point
/// eye roaming an arc at the visual radius. Phase is dictated by the
/// combat state machine; internally only entry vs. resident motion is
/// distinguished.
pub struct BossEntity {
    center: Vec2,
    rest_x: f32,
    eye_angle: f32,
    eye_angular_velocity: f32,
    eye_position: Vec2,
    roam_direction: f32,
    roam_timer: f32,
    current_eye_radius: f32,
    core_body: RigidBodyHandle,
    core_collider: ColliderHandle,
    eye_body: RigidBodyHandle,
    eye_collider: ColliderHandle,
    destruction_queue: Vec<RigidBodyHandle>,
}

impl BossEntity {
    pub fn spawn(ctx: &mut SimContext) -> Self {
        let bounds = ctx.physics.bounds();
        let center = Vec2::new(bounds.width + BOSS_INITIAL_RADIUS * 2.0, bounds.height * 0.5);
        let rest_x = bounds.width * BOSS_REST_X_FRACTION;

        let (core_body, core_collider) =
            ctx.physics.spawn_kinematic_ball(center, CORE_RADIUS, true, BodyFlags::BOSS);

        let eye_angle = std::f32::consts::FRAC_PI_4;
        let eye_radius = EYE_MIN_RADIUS.max(BOSS_INITIAL_RADIUS * EYE_RADIUS_FRACTION);
        let eye_position = center + Vec2::from_angle(eye_angle) * BOSS_INITIAL_RADIUS;
        let (eye_body, eye_collider) =
            ctx.physics.spawn_kinematic_ball(eye_position, eye_radius, false, BodyFlags::BOSS);

        Self {
            center,
            rest_x,
            eye_angle,
            eye_angular_velocity: 0.0,
            eye_position,
            roam_direction: 1.0,
            roam_timer: 0.0,
            current_eye_radius: eye_radius,
            core_body,
            core_collider,
            eye_body,
            eye_collider,
            destruction_queue: Vec::new(),
        }
    }

    pub fn update(
        &mut self,
        ctx: &mut SimContext,
        combat: &mut CombatState,
        health: &mut dyn Health,
        dt: f32,
    ) {
        if !combat.phase().is_active() {
            return;
        }
        self.advance_entry(combat, dt);
        let visual_radius = combat.visual_radius();
        self.roam_eye(ctx, visual_radius, dt);
        self.refresh_eye_shape(ctx, visual_radius);
        self.apply_suction(ctx, visual_radius, dt);
        self.process_contacts(ctx, combat, health);
        self.drain_destruction(ctx);
    }

    /// Entry phase: slide in horizontally from the off-field spawn point.
    /// Arrival hands the lifecycle over to the state machine.
    fn advance_entry(&mut self, combat: &mut CombatState, dt: f32) {
        if self.center.x <= self.rest_x {
            return;
        }
        self.center.x -= BOSS_ENTRY_SPEED * dt;
        if self.center.x <= self.rest_x {
            self.center.x = self.rest_x;
            combat.enter_combat();
        }
    }

    fn roam_eye(&mut self, ctx: &mut SimContext, visual_radius: f32, dt: f32) {
        self.roam_timer -= dt;
        if self.roam_timer <= 0.0 {
            let mut rng = rand::thread_rng();
            self.roam_direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            self.roam_timer = rng.gen_range(EYE_RETARGET_MIN_SECS..EYE_RETARGET_MAX_SECS);
        }

        let target_velocity = EYE_ROAM_SPEED * self.roam_direction;
        let blend = (EYE_ROAM_ACCEL * dt).min(1.0);
        self.eye_angular_velocity += (target_velocity - self.eye_angular_velocity) * blend;
        self.eye_angle += self.eye_angular_velocity * dt;

        // Soft reversal at the arc endpoints: half the speed, flipped.
        if self.eye_angle < EYE_ARC_MIN {
            self.eye_angle = EYE_ARC_MIN;
            self.eye_angular_velocity = -self.eye_angular_velocity * 0.5;
            self.roam_direction = 1.0;
        } else if self.eye_angle > EYE_ARC_MAX {
            self.eye_angle = EYE_ARC_MAX;
            self.eye_angular_velocity = -self.eye_angular_velocity * 0.5;
            self.roam_direction = -1.0;
        }

        self.eye_position = self.center + Vec2::from_angle(self.eye_angle) * visual_radius;
        ctx.physics.set_kinematic_target(self.core_body, self.center);
        ctx.physics.set_kinematic_target(self.eye_body, self.eye_position);
    }

    /// Rebuilds the eye collider only when the computed radius drifts more
    /// than the tolerance from the installed one, to avoid rebuild churn
    /// on every growth tick.
    fn refresh_eye_shape(&mut self, ctx: &mut SimContext, visual_radius: f32) {
        let computed = EYE_MIN_RADIUS.max(visual_radius * EYE_RADIUS_FRACTION);
        if (computed - self.current_eye_radius).abs() > self.current_eye_radius * EYE_REBUILD_TOLERANCE {
            ctx.physics.set_ball_radius(self.eye_collider, computed);
            self.current_eye_radius = computed;
        }
    }

    fn apply_suction(&mut self, ctx: &mut SimContext, visual_radius: f32, dt: f32) {
        let center = self.center;
        for (handle, body) in ctx.physics.bodies_mut() {
            let flags = body_flags(body);
            if flags.intersects(
                BodyFlags::BOSS | BodyFlags::WALL | BodyFlags::CURSOR | BodyFlags::ASSISTANT | BodyFlags::EPHEMERAL,
            ) {
                continue;
            }
            let translation = body.translation();
            let position = Vec2::new(translation.x, translation.y);
            let force = suction_force(center, position, visual_radius);
            if force == Vec2::ZERO {
                continue;
            }
            if body.is_fixed() {
                // Scenery tears loose exactly once the field first reaches
                // the detach threshold; from then on it is ordinary prey.
                if flags.contains(BodyFlags::SCENERY) && force.length() >= SCENERY_DETACH_FORCE {
                    body.set_body_type(RigidBodyType::Dynamic, true);
                    let entity = ctx.registry.id_of_body(handle);
                    ctx.events.push(GameEvent::SceneryDetached { entity });
                }
                continue;
            }
            if !body.is_dynamic() {
                continue;
            }
            let impulse = force * dt;
            body.apply_impulse(Vector::new(impulse.x, impulse.y), true);
        }
    }

    /// Queued contact-begins are handled once per tick; destruction is
    /// only ever enqueued here and performed by the drain afterwards.
    fn process_contacts(&mut self, ctx: &mut SimContext, combat: &mut CombatState, health: &mut dyn Health) {
        let begins: SmallVec<[(ColliderHandle, ColliderHandle); 16]> =
            ctx.physics.drain_contact_begins().into_iter().collect();
        for (a, b) in begins {
            let (boss_collider, other_collider) = if a == self.core_collider || a == self.eye_collider {
                (a, b)
            } else if b == self.core_collider || b == self.eye_collider {
                (b, a)
            } else {
                continue;
            };
            let Some(other_body) = ctx.physics.body_of_collider(other_collider) else {
                continue;
            };
            let Some(body) = ctx.physics.body(other_body) else {
                continue;
            };
            let flags = body_flags(body);
            if flags.intersects(
                BodyFlags::WALL | BodyFlags::CURSOR | BodyFlags::ASSISTANT | BodyFlags::BOSS,
            ) {
                continue;
            }
            if !body.is_dynamic() {
                continue;
            }

            if boss_collider == self.core_collider {
                if flags.contains(BodyFlags::CONSUMED) {
                    continue;
                }
                ctx.physics.add_flags(other_body, BodyFlags::CONSUMED);
                self.destruction_queue.push(other_body);
                combat.record_object_consumed();
                let entity = ctx.registry.id_of_body(other_body);
                ctx.events.push(GameEvent::ObjectConsumed { entity });
            } else {
                let velocity = body.linvel();
                let speed = Vec2::new(velocity.x, velocity.y).length();
                let damage = impact_damage(speed, body.mass());
                if damage > DAMAGE_THRESHOLD {
                    health.take_damage(damage);
                    combat.trigger_damage_flash();
                    combat.record_damage(damage);
                    ctx.events.push(GameEvent::EyeStruck { damage });
                }
                // Projectiles burst on the eye whether or not they hurt.
                if flags.contains(BodyFlags::EPHEMERAL) {
                    self.destruction_queue.push(other_body);
                }
            }
        }
    }

    /// Drains the deferred-destruction queue, strictly after contact
    /// processing. A handle queued twice is destroyed once.
    fn drain_destruction(&mut self, ctx: &mut SimContext) {
        if self.destruction_queue.is_empty() {
            return;
        }
        let mut seen: HashSet<RigidBodyHandle> = HashSet::new();
        for handle in self.destruction_queue.drain(..) {
            if !seen.insert(handle) {
                continue;
            }
            ctx.registry.unregister_body(handle);
            ctx.physics.destroy_body(handle);
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn eye_position(&self) -> Vec2 {
        self.eye_position
    }

    pub fn eye_radius(&self) -> f32 {
        self.current_eye_radius
    }

    pub fn has_arrived(&self) -> bool {
        self.center.x <= self.rest_x
    }
}
