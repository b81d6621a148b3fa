use bitflags::bitflags;
use glam::Vec2;
use rapier2d::geometry::CollisionEvent;
use rapier2d::pipeline::{ActiveEvents, EventHandler};
use rapier2d::prelude::{
    CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, ContactPair, DefaultBroadPhase,
    ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase,
    PhysicsPipeline, QueryPipeline, Real, RigidBody, RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
    RigidBodyType, SharedShape, Vector,
};
use std::sync::Mutex;

use crate::config::SimConfig;

bitflags! {
    /// Per-body classification packed into rapier's `user_data`, so every
    /// pass over the body set can read it without a side table.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BodyFlags: u32 {
        const WALL      = 1 << 0;
        const CURSOR    = 1 << 1;
        const ASSISTANT = 1 << 2;
        const BOSS      = 1 << 3;
        const EPHEMERAL = 1 << 4;
        const SCENERY   = 1 << 5;
        const CONSUMED  = 1 << 6;
    }
}

pub fn body_flags(body: &RigidBody) -> BodyFlags {
    BodyFlags::from_bits_truncate(body.user_data as u32)
}

#[derive(Debug, Clone, Copy)]
pub struct FieldBounds {
    pub width: f32,
    pub height: f32,
    pub thickness: f32,
}

#[derive(Default)]
struct ContactCollector {
    begins: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl ContactCollector {
    fn drain(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        if let Ok(mut begins) = self.begins.lock() {
            std::mem::take(&mut *begins)
        } else {
            Vec::new()
        }
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        // Sensor intersections carry the consumption contacts, so begin
        // events are kept regardless of their flags.
        if let CollisionEvent::Started(a, b, _) = event {
            if let Ok(mut begins) = self.begins.lock() {
                begins.push((a, b));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: ContactCollector,
    bounds: FieldBounds,
}

impl PhysicsWorld {
    pub fn new(config: &SimConfig) -> Self {
        let bounds = FieldBounds {
            width: config.field.width,
            height: config.field.height,
            thickness: config.field.wall_thickness,
        };
        let mut world = Self {
            pipeline: PhysicsPipeline::new(),
            gravity: Vector::new(config.physics.gravity[0], config.physics.gravity[1]),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: ContactCollector::default(),
            bounds,
        };
        world.install_walls();
        world
    }

    fn install_walls(&mut self) {
        let t = self.bounds.thickness;
        let w = self.bounds.width;
        let h = self.bounds.height;
        let horizontal_half = Vector::new(w * 0.5 + t, t);
        let vertical_half = Vector::new(t, h * 0.5 + t);

        let centers = [
            Vector::new(w * 0.5, -t),
            Vector::new(w * 0.5, h + t),
            Vector::new(-t, h * 0.5),
            Vector::new(w + t, h * 0.5),
        ];
        let half_extents = [horizontal_half, horizontal_half, vertical_half, vertical_half];

        for (center, half) in centers.into_iter().zip(half_extents) {
            let body = RigidBodyBuilder::fixed()
                .translation(center)
                .user_data(BodyFlags::WALL.bits() as u128)
                .build();
            let handle = self.bodies.insert(body);
            let collider =
                ColliderBuilder::cuboid(half.x, half.y).restitution(0.4).friction(0.8).build();
            self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        }
    }

    pub fn spawn_dynamic_ball(
        &mut self,
        position: Vec2,
        radius: f32,
        mass: f32,
        velocity: Vec2,
        flags: BodyFlags,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(position.x, position.y))
            .user_data(flags.bits() as u128)
            .build();
        let body_handle = self.bodies.insert(body);
        if let Some(body) = self.bodies.get_mut(body_handle) {
            if mass > 0.0 {
                body.set_additional_mass(mass, true);
            }
            body.set_linvel(Vector::new(velocity.x, velocity.y), true);
            body.wake_up(true);
        }
        let collider = ColliderBuilder::ball(radius)
            .restitution(0.3)
            .friction(0.6)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle = self.colliders.insert_with_parent(collider, body_handle, &mut self.bodies);
        (body_handle, collider_handle)
    }

    pub fn spawn_dynamic_box(
        &mut self,
        position: Vec2,
        half: Vec2,
        mass: f32,
        velocity: Vec2,
        flags: BodyFlags,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(position.x, position.y))
            .user_data(flags.bits() as u128)
            .build();
        let body_handle = self.bodies.insert(body);
        if let Some(body) = self.bodies.get_mut(body_handle) {
            if mass > 0.0 {
                body.set_additional_mass(mass, true);
            }
            body.set_linvel(Vector::new(velocity.x, velocity.y), true);
            body.wake_up(true);
        }
        let collider = ColliderBuilder::cuboid(half.x, half.y)
            .restitution(0.3)
            .friction(0.6)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle = self.colliders.insert_with_parent(collider, body_handle, &mut self.bodies);
        (body_handle, collider_handle)
    }

    pub fn spawn_static_box(
        &mut self,
        position: Vec2,
        half: Vec2,
        flags: BodyFlags,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::fixed()
            .translation(Vector::new(position.x, position.y))
            .user_data(flags.bits() as u128)
            .build();
        let body_handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(half.x, half.y)
            .restitution(0.2)
            .friction(0.9)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle = self.colliders.insert_with_parent(collider, body_handle, &mut self.bodies);
        (body_handle, collider_handle)
    }

    pub fn spawn_kinematic_ball(
        &mut self,
        position: Vec2,
        radius: f32,
        sensor: bool,
        flags: BodyFlags,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(Vector::new(position.x, position.y))
            .user_data(flags.bits() as u128)
            .build();
        let body_handle = self.bodies.insert(body);
        let collider = ColliderBuilder::ball(radius)
            .sensor(sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle = self.colliders.insert_with_parent(collider, body_handle, &mut self.bodies);
        (body_handle, collider_handle)
    }

    pub fn set_ball_radius(&mut self, handle: ColliderHandle, radius: f32) {
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.set_shape(SharedShape::ball(radius));
        }
    }

    pub fn add_flags(&mut self, handle: RigidBodyHandle, flags: BodyFlags) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.user_data |= flags.bits() as u128;
        }
    }

    pub fn flags_of(&self, handle: RigidBodyHandle) -> BodyFlags {
        self.bodies.get(handle).map(body_flags).unwrap_or(BodyFlags::empty())
    }

    pub fn make_dynamic(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_body_type(RigidBodyType::Dynamic, true);
        }
    }

    pub fn set_kinematic_target(&mut self, handle: RigidBodyHandle, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_next_kinematic_translation(Vector::new(position.x, position.y));
        }
    }

    pub fn set_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec2) -> bool {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(Vector::new(velocity.x, velocity.y), true);
            true
        } else {
            false
        }
    }

    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec2) -> bool {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.apply_impulse(Vector::new(impulse.x, impulse.y), true);
            true
        } else {
            false
        }
    }

    /// Removes a body and its colliders. Destroying a body that is already
    /// gone is a benign no-op.
    pub fn destroy_body(&mut self, handle: RigidBodyHandle) {
        if self.bodies.get(handle).is_none() {
            return;
        }
        let _ = self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.get(handle).is_some()
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn body_of_collider(&self, handle: ColliderHandle) -> Option<RigidBodyHandle> {
        self.colliders.get(handle).and_then(|collider| collider.parent())
    }

    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|body| {
            let translation = body.translation();
            Vec2::new(translation.x, translation.y)
        })
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = (RigidBodyHandle, &mut RigidBody)> {
        self.bodies.iter_mut()
    }

    pub fn drain_contact_begins(&mut self) -> Vec<(ColliderHandle, ColliderHandle)> {
        self.event_collector.drain()
    }

    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;
        let hooks = ();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &hooks,
            &self.event_collector,
        );
        self.query_pipeline.update(&self.colliders);
    }

    pub fn bounds(&self) -> FieldBounds {
        self.bounds
    }
}
