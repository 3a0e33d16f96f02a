use bevy::prelude::*;

use crate::ecs::core::ActorId;

/// Marks an actor driven by a connected client.
#[derive(Component, Debug, Clone, Copy)]
pub struct Player {
    pub id: ActorId,
    /// Radius within which this player observes other actors.
    pub view_distance: f64,
}

#[derive(Event)]
pub struct PlayerSpawnEvent {
    pub player_id: ActorId,
}

#[derive(Event)]
pub struct PlayerDespawnEvent {
    pub player_id: ActorId,
}
