/*!
# AI Systems

A thin stand-in for the real AI: it reacts to what the movement engine
reports and keeps chasing and wandering actors on the move.
*/

use bevy::prelude::*;
use glam::IVec3;
use rand::Rng;

use crate::ecs::core::{Actor, ActorRegistry, GameConfig};
use crate::ecs::plugins::ai::components::*;
use crate::ecs::plugins::movement::geometry::distance_2d;
use crate::ecs::plugins::movement::{AiEvent, AiNotification, MoveRequestEvent, Movement};
use crate::ecs::plugins::scheduler::GameTimeController;

/// System: Update desires from the movement engine's notifications
pub fn ai_notification_system(
    mut notifications: EventReader<AiNotification>,
    registry: Res<ActorRegistry>,
    config: Res<GameConfig>,
    mut desires: Query<&mut Desire>,
    actors: Query<&Actor>,
    mut move_requests: EventWriter<MoveRequestEvent>,
) {
    for notification in notifications.read() {
        let Some(entity) = registry.get_entity(notification.actor) else {
            continue;
        };
        let Ok(mut desire) = desires.get_mut(entity) else {
            continue;
        };

        match notification.event {
            AiEvent::Arrived => {
                if *desire == Desire::MoveTo {
                    *desire = Desire::Idle;
                }
            }
            AiEvent::ArrivedRevalidate => {
                let Some(target) = desire.target() else {
                    continue;
                };
                match registry.get_entity(target).and_then(|e| actors.get(e).ok()) {
                    Some(target_actor) => {
                        move_requests.send(MoveRequestEvent {
                            actor: notification.actor,
                            target: target_actor.position,
                            offset: desire.approach_offset(config.player.attack_offset),
                        });
                    }
                    None => *desire = Desire::Idle,
                }
            }
            AiEvent::Stopped => *desire = Desire::Idle,
            AiEvent::ActionFailed(error) => {
                debug!("Actor {} gave up: {}", notification.actor, error);
                *desire = Desire::Idle;
            }
        }
    }
}

/// System: Re-approach chased targets that moved out of reach
pub fn follow_target_system(
    clock: Res<GameTimeController>,
    registry: Res<ActorRegistry>,
    config: Res<GameConfig>,
    mut chasers: Query<(&Actor, &mut Desire, &Movement)>,
    targets: Query<&Actor>,
    mut move_requests: EventWriter<MoveRequestEvent>,
) {
    if clock.game_ticks() % FOLLOW_INTERVAL_TICKS != 0 {
        return;
    }
    for (actor, mut desire, movement) in chasers.iter_mut() {
        let Some(target) = desire.target() else {
            continue;
        };
        let Some(target_actor) = registry.get_entity(target).and_then(|e| targets.get(e).ok()) else {
            debug!("Actor {} lost its target {}", actor.id, target);
            *desire = Desire::Idle;
            continue;
        };
        let offset = desire.approach_offset(config.player.attack_offset);
        // Already walking toward the target: the watchdog handles drift.
        if movement.is_moving() || distance_2d(actor.position, target_actor.position) <= offset as f64 {
            continue;
        }
        move_requests.send(MoveRequestEvent {
            actor: actor.id,
            target: target_actor.position,
            offset,
        });
    }
}

/// System: Send idle wanderers to a random point around their home
pub fn wander_system(
    clock: Res<GameTimeController>,
    mut wanderers: Query<(&Actor, &mut Desire, &Movement, &mut Wander)>,
    mut move_requests: EventWriter<MoveRequestEvent>,
) {
    let now = clock.game_ticks();
    let mut rng = rand::thread_rng();
    for (actor, mut desire, movement, mut wander) in wanderers.iter_mut() {
        if *desire != Desire::Idle || movement.is_moving() || now < wander.next_tick {
            continue;
        }
        wander.next_tick = now + wander.interval_ticks;
        let radius = wander.radius.max(1);
        let target = wander.home
            + IVec3::new(rng.gen_range(-radius..=radius), rng.gen_range(-radius..=radius), 0);
        *desire = Desire::MoveTo;
        move_requests.send(MoveRequestEvent {
            actor: actor.id,
            target,
            offset: 0,
        });
    }
}
