use crate::registry::EntityId;
use std::fmt;

#[derive(Debug, Clone)]
pub enum GameEvent {
    ObjectRegistered { entity: EntityId, ephemeral: bool },
    ObjectConsumed { entity: Option<EntityId> },
    EyeStruck { damage: f32 },
    SceneryDetached { entity: Option<EntityId> },
    EphemeralEvicted { entity: EntityId },
    ScriptMessage { message: String },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::ObjectRegistered { entity, ephemeral } => {
                write!(f, "ObjectRegistered entity={entity} ephemeral={ephemeral}")
            }
            GameEvent::ObjectConsumed { entity: Some(entity) } => {
                write!(f, "ObjectConsumed entity={entity}")
            }
            GameEvent::ObjectConsumed { entity: None } => write!(f, "ObjectConsumed entity=untracked"),
            GameEvent::EyeStruck { damage } => write!(f, "EyeStruck damage={damage:.3}"),
            GameEvent::SceneryDetached { entity: Some(entity) } => {
                write!(f, "SceneryDetached entity={entity}")
            }
            GameEvent::SceneryDetached { entity: None } => write!(f, "SceneryDetached entity=untracked"),
            GameEvent::EphemeralEvicted { entity } => write!(f, "EphemeralEvicted entity={entity}"),
            GameEvent::ScriptMessage { message } => write!(f, "ScriptMessage {message}"),
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    events: Vec<GameEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }
}
