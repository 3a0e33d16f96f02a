/*!
# Debug Systems

Development and debugging tools for the game server.

Dumps the moving actors at a fixed interval so trajectories can be
followed from the log.
*/

use bevy::prelude::*;
use crate::ecs::core::{Actor, ActorRegistry};
use crate::ecs::plugins::movement::Movement;
use crate::ecs::plugins::scheduler::GameTimeController;

/// How often to print debug information (in seconds)
const DEBUG_PRINT_INTERVAL: f32 = 1.0;

#[derive(Resource, Default)]
pub struct DebugTimer {
    last_print_time: f32,
}

/// Debug system that logs every actor in motion once per interval:
/// position, leg destination and path progress.
pub fn debug_system(
    clock: Res<GameTimeController>,
    registry: Res<ActorRegistry>,
    actors: Query<(&Actor, &Movement)>,
    time: Res<Time>,
    mut debug_timer: ResMut<DebugTimer>,
) {
    let current_time = time.elapsed_secs();
    if current_time - debug_timer.last_print_time <= DEBUG_PRINT_INTERVAL {
        return;
    }
    debug_timer.last_print_time = current_time;

    let moving = clock.moving_actors();
    debug!("tick {}: {} actors, {} moving", clock.game_ticks(), registry.actors.len(), moving.len());

    for id in moving {
        let Some((actor, movement)) = registry.get_entity(id).and_then(|e| actors.get(e).ok()) else {
            continue;
        };
        let Some(record) = movement.record() else {
            continue;
        };
        let leg = match &record.path {
            Some(path) if record.path_index >= 0 => format!("leg {}/{}", record.path_index + 1, path.len()),
            _ => "direct".to_string(),
        };
        debug!(
            "{} {:?} at {:?} -> {:?} ({}, heading {})",
            actor.id, actor.kind, actor.position, record.destination, leg, actor.heading
        );
    }
}
