use bevy::prelude::*;
use crate::ecs::core::SimulationSet;
use crate::ecs::plugins::player::components::*;
use crate::ecs::plugins::player::systems::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerSpawnEvent>()
            .add_event::<PlayerDespawnEvent>()
            .add_systems(Startup, spawn_configured_npcs_system)
            .add_systems(FixedUpdate, (
                player_spawn_system,
                player_despawn_system,
            ).chain().in_set(SimulationSet::Clock));
    }
}
