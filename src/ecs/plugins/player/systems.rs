use bevy::prelude::*;
use glam::IVec3;
use rand::Rng;

use crate::ecs::core::*;
use crate::ecs::plugins::ai::Wander;
use crate::ecs::plugins::player::components::*;
use crate::ecs::plugins::scheduler::GameTimeController;

/// Seconds between two strolls of a wandering NPC.
const WANDER_INTERVAL_SECS: u64 = 5;

pub fn player_spawn_system(
    mut commands: Commands,
    mut spawn_events: EventReader<PlayerSpawnEvent>,
    mut registry: ResMut<ActorRegistry>,
    game_config: Res<GameConfig>,
) {
    let mut rng = rand::thread_rng();
    for event in spawn_events.read() {
        let world = &game_config.world;
        let min = world.spawn_min.min(world.spawn_max);
        let max = world.spawn_min.max(world.spawn_max);
        let position = IVec3::new(
            rng.gen_range(min.x..=max.x),
            rng.gen_range(min.y..=max.y),
            world.spawn_z,
        );
        let stats = MoveStats {
            speed: game_config.player.speed,
            collision_radius: game_config.player.collision_radius,
            can_fly: false,
        };
        let actor = Actor::new(event.player_id, ActorKind::Player, position, stats);
        let entity = commands
            .spawn((
                ActorBundle::new(actor),
                Player {
                    id: event.player_id,
                    view_distance: game_config.player.view_distance,
                },
            ))
            .id();
        // Registered right away so input arriving in the same tick finds it.
        registry.register_actor(event.player_id, entity);
        info!("Spawned player {} at {:?} -> Entity: {:?}", event.player_id, position, entity);
    }
}

pub fn player_despawn_system(
    mut commands: Commands,
    mut despawn_events: EventReader<PlayerDespawnEvent>,
    mut registry: ResMut<ActorRegistry>,
    mut clock: ResMut<GameTimeController>,
) {
    for event in despawn_events.read() {
        clock.unregister_moving(event.player_id);
        if let Some(entity) = registry.unregister_actor(event.player_id) {
            commands.entity(entity).despawn();
            info!("Despawned player {}", event.player_id);
        }
    }
}

/// Startup: Place the NPCs listed in the configuration
pub fn spawn_configured_npcs_system(
    mut commands: Commands,
    mut registry: ResMut<ActorRegistry>,
    mut allocator: ResMut<ActorIdAllocator>,
    game_config: Res<GameConfig>,
    clock: Res<GameTimeController>,
) {
    let wander_interval = WANDER_INTERVAL_SECS * clock.ticks_per_second() as u64;
    for npc in &game_config.npcs {
        let id = allocator.allocate_npc();
        let stats = MoveStats {
            speed: npc.speed,
            collision_radius: npc.collision_radius,
            can_fly: npc.can_fly,
        };
        let mut entity = commands.spawn(ActorBundle::new(Actor::new(id, npc.kind, npc.position, stats)));
        if npc.wander_radius > 0 {
            entity.insert(Wander::new(npc.position, npc.wander_radius, wander_interval));
        }
        registry.register_actor(id, entity.id());
        debug!("Spawned {:?} {} at {:?}", npc.kind, id, npc.position);
    }
    if !game_config.npcs.is_empty() {
        info!("Spawned {} configured NPCs", game_config.npcs.len());
    }
}
