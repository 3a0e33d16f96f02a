/*!
# Network Systems

Transport-agnostic half of the network layer: decides which players hear
about which movement and queues the packets in [`NetworkUpdates`]. The
transport drains the queues at the end of the tick.
*/

use bevy::prelude::*;

use crate::ecs::core::{Actor, ActorRegistry, GameConfig};
use crate::ecs::plugins::movement::geometry::is_in_range;
use crate::ecs::plugins::movement::{AiEvent, AiNotification, Movement, MovementBroadcastEvent};
use crate::ecs::plugins::network::components::*;
use crate::ecs::plugins::player::Player;

/// System: Greet new players with their own actor and the actors around them
pub fn send_welcome_system(
    mut connect_events: EventReader<ClientConnectedEvent>,
    registry: Res<ActorRegistry>,
    config: Res<GameConfig>,
    players: Query<(&Actor, &Player)>,
    actors: Query<(&Actor, &Movement)>,
    mut network_updates: ResMut<NetworkUpdates>,
) {
    for event in connect_events.read() {
        let Some((actor, player)) = registry
            .get_entity(event.player_id)
            .and_then(|entity| players.get(entity).ok())
        else {
            warn!("No actor to welcome player {}", event.player_id);
            continue;
        };

        network_updates.push(
            event.player_id,
            ServerPacket::Welcome {
                actor: actor.id,
                position: actor.position,
                heading: actor.heading,
                tick_rate: config.tick_rate,
            },
        );

        let mut visible = 0;
        for (other, movement) in actors.iter() {
            if other.id == actor.id || !is_in_range(actor.position, other.position, player.view_distance, false) {
                continue;
            }
            let packet = match movement.record() {
                Some(record) => ServerPacket::MoveToLocation {
                    actor: other.id,
                    origin: other.position,
                    destination: record.destination,
                },
                None => ServerPacket::stop_move(other.id, other.location()),
            };
            network_updates.push(event.player_id, packet);
            visible += 1;
        }
        info!("Welcomed player {} with {} visible actors", event.player_id, visible);
    }
}

/// System: Queue movement broadcasts for every player that can see the actor
pub fn queue_movement_packets_system(
    mut broadcasts: EventReader<MovementBroadcastEvent>,
    registry: Res<ActorRegistry>,
    actors: Query<&Actor>,
    observers: Query<(&Actor, &Player)>,
    mut network_updates: ResMut<NetworkUpdates>,
) {
    for event in broadcasts.read() {
        let Some(source) = registry.get_entity(event.actor).and_then(|e| actors.get(e).ok()) else {
            continue;
        };
        let packet = ServerPacket::from_broadcast(event.actor, &event.broadcast);
        for (observer, player) in observers.iter() {
            let sees = if observer.id == event.actor {
                event.include_self
            } else {
                is_in_range(observer.position, source.position, player.view_distance, false)
            };
            if sees {
                network_updates.push(player.id, packet.clone());
            }
        }
    }
}

/// System: Tell players why their own move was refused
pub fn queue_action_failures_system(
    mut notifications: EventReader<AiNotification>,
    registry: Res<ActorRegistry>,
    players: Query<&Player>,
    mut network_updates: ResMut<NetworkUpdates>,
) {
    for notification in notifications.read() {
        let AiEvent::ActionFailed(error) = notification.event else {
            continue;
        };
        let is_player = registry
            .get_entity(notification.actor)
            .is_some_and(|entity| players.contains(entity));
        if is_player {
            network_updates.push(notification.actor, ServerPacket::action_failed(notification.actor, error));
        }
    }
}
