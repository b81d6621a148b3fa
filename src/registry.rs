use rapier2d::prelude::RigidBodyHandle;

pub type EntityId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Scripted,
    Scenery,
    Cursor,
    Assistant,
}

/// Render attributes travel with an entity but are never interpreted by
/// the simulation core; the renderer owns their meaning.
#[derive(Debug, Clone, Copy)]
pub struct RenderAttrs {
    pub tint: [f32; 4],
    pub layer: i32,
}

impl Default for RenderAttrs {
    fn default() -> Self {
        Self { tint: [1.0, 1.0, 1.0, 1.0], layer: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct TrackedEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub body: RigidBodyHandle,
    pub render: RenderAttrs,
    pub spawned: bool,
    pub ephemeral: bool,
}

/// Insertion-ordered collection of tracked entities. Each `register` call
/// mints a fresh id, so no entity can appear twice.
#[derive(Default)]
pub struct Registry {
    next_id: EntityId,
    entries: Vec<TrackedEntity>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: EntityKind, body: RigidBodyHandle, render: RenderAttrs) -> EntityId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(TrackedEntity { id, kind, body, render, spawned: false, ephemeral: false });
        id
    }

    pub fn unregister(&mut self, id: EntityId) -> Option<TrackedEntity> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn unregister_body(&mut self, body: RigidBodyHandle) -> Option<TrackedEntity> {
        let index = self.entries.iter().position(|entry| entry.body == body)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<&TrackedEntity> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut TrackedEntity> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    pub fn id_of_body(&self, body: RigidBodyHandle) -> Option<EntityId> {
        self.entries.iter().find(|entry| entry.body == body).map(|entry| entry.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedEntity> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
