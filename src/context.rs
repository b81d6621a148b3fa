use crate::config::SimConfig;
use crate::events::EventBus;
use crate::physics::PhysicsWorld;
use crate::registry::Registry;

/// Shared mutable state of one simulation instance: the physics world, the
/// entity registry, and the renderer-facing event bus. Passed explicitly
/// into the executor, the boss, and the tick loop so tests can build
/// isolated instances.
pub struct SimContext {
    pub physics: PhysicsWorld,
    pub registry: Registry,
    pub events: EventBus,
}

impl SimContext {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            physics: PhysicsWorld::new(config),
            registry: Registry::new(),
            events: EventBus::default(),
        }
    }
}
