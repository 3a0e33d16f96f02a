use bevy::prelude::*;
use glam::IVec3;

use crate::ecs::core::{ActorId, Location};
use crate::ecs::plugins::movement::error::MovementError;

/// What the movement engine tells the AI that drives an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiEvent {
    Arrived,
    /// A long move is past its checkpoint; the AI may re-check its goal.
    ArrivedRevalidate,
    Stopped,
    ActionFailed(MovementError),
}

/// What observers of an actor need to render its movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementBroadcast {
    MoveToLocation { origin: IVec3, destination: IVec3 },
    StopMove { location: Location },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementNotice {
    Ai { actor: ActorId, event: AiEvent },
    Broadcast { actor: ActorId, broadcast: MovementBroadcast, include_self: bool },
}

/// Notices produced while the engine runs. Drained once per tick; nothing
/// the engine does waits on delivery.
#[derive(Resource, Debug, Default)]
pub struct MovementOutbox {
    notices: Vec<MovementNotice>,
}

impl MovementOutbox {
    pub fn notify_ai(&mut self, actor: ActorId, event: AiEvent) {
        self.notices.push(MovementNotice::Ai { actor, event });
    }

    pub fn broadcast(&mut self, actor: ActorId, broadcast: MovementBroadcast, include_self: bool) {
        self.notices.push(MovementNotice::Broadcast { actor, broadcast, include_self });
    }

    pub fn notices(&self) -> &[MovementNotice] {
        &self.notices
    }

    pub fn drain(&mut self) -> Vec<MovementNotice> {
        std::mem::take(&mut self.notices)
    }
}

/// Command: move an actor toward `target`, stopping `offset` units short.
#[derive(Event, Debug, Clone, Copy)]
pub struct MoveRequestEvent {
    pub actor: ActorId,
    pub target: IVec3,
    pub offset: i32,
}

/// Command: halt an actor, at `location` or where it currently stands.
#[derive(Event, Debug, Clone, Copy)]
pub struct StopRequestEvent {
    pub actor: ActorId,
    pub location: Option<Location>,
}

/// An [`AiEvent`] on its way to the actor's AI.
#[derive(Event, Debug, Clone, Copy)]
pub struct AiNotification {
    pub actor: ActorId,
    pub event: AiEvent,
}

/// A movement broadcast on its way to the network layer.
#[derive(Event, Debug, Clone, Copy)]
pub struct MovementBroadcastEvent {
    pub actor: ActorId,
    pub broadcast: MovementBroadcast,
    pub include_self: bool,
}
