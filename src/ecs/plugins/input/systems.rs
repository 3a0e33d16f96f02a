use bevy::prelude::*;
use glam::IVec3;

use crate::ecs::core::{Actor, ActorRegistry, GameConfig};
use crate::ecs::plugins::ai::Desire;
use crate::ecs::plugins::input::components::*;
use crate::ecs::plugins::movement::{MoveRequestEvent, StopRequestEvent};

/// System: Turn client commands into desires and movement requests
pub fn input_processing_system(
    mut input_events: EventReader<InputCommandEvent>,
    registry: Res<ActorRegistry>,
    config: Res<GameConfig>,
    mut desires: Query<&mut Desire>,
    actors: Query<&Actor>,
    mut move_requests: EventWriter<MoveRequestEvent>,
    mut stop_requests: EventWriter<StopRequestEvent>,
) {
    for event in input_events.read() {
        let Some(entity) = registry.get_entity(event.player_id) else {
            warn!("Input from player {} without an actor", event.player_id);
            continue;
        };
        let Ok(mut desire) = desires.get_mut(entity) else {
            continue;
        };

        match event.command {
            InputCommand::MoveTo { x, y, z, offset } => {
                *desire = Desire::MoveTo;
                move_requests.send(MoveRequestEvent {
                    actor: event.player_id,
                    target: IVec3::new(x, y, z),
                    offset: offset.max(0),
                });
            }
            InputCommand::Stop => {
                *desire = Desire::Idle;
                stop_requests.send(StopRequestEvent {
                    actor: event.player_id,
                    location: None,
                });
            }
            InputCommand::Attack { target } | InputCommand::Follow { target } => {
                if target == event.player_id {
                    warn!("Player {} cannot target itself", event.player_id);
                    continue;
                }
                let Some(target_actor) = registry.get_entity(target).and_then(|e| actors.get(e).ok()) else {
                    warn!("Player {} targeted unknown actor {}", event.player_id, target);
                    continue;
                };
                *desire = match event.command {
                    InputCommand::Attack { .. } => Desire::Attack { target },
                    _ => Desire::Follow { target },
                };
                move_requests.send(MoveRequestEvent {
                    actor: event.player_id,
                    target: target_actor.position,
                    offset: desire.approach_offset(config.player.attack_offset),
                });
            }
        }
    }
}
