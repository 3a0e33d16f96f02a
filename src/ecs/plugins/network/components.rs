use bevy::prelude::*;
use glam::IVec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::ecs::core::{ActorId, Location, FIRST_NPC_ID};
use crate::ecs::plugins::movement::{MovementBroadcast, MovementError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientId {
    WebSocket(SocketAddr),
}

#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub id: ClientId,
    pub connected_at: std::time::Instant,
}

impl ClientInfo {
    pub fn new(id: ClientId) -> Self {
        Self {
            id,
            connected_at: std::time::Instant::now(),
        }
    }
}

#[derive(Event)]
pub struct ClientConnectedEvent {
    pub client_id: ClientId,
    pub player_id: ActorId,
}

#[derive(Event)]
pub struct ClientDisconnectedEvent {
    pub client_id: ClientId,
    pub player_id: ActorId,
    pub reason: String,
}

#[derive(Resource, Default)]
pub struct ConnectedClients {
    pub clients: HashMap<ClientId, ClientInfo>,
}

#[derive(Resource, Default)]
pub struct NetworkPlayerRegistry {
    pub client_to_player: HashMap<ClientId, ActorId>,
    pub player_to_client: HashMap<ActorId, ClientId>,
}

impl NetworkPlayerRegistry {
    pub fn register_player(&mut self, client_id: ClientId, player_id: ActorId) {
        self.client_to_player.insert(client_id, player_id);
        self.player_to_client.insert(player_id, client_id);
    }

    pub fn unregister_player(&mut self, client_id: &ClientId) -> Option<ActorId> {
        let player_id = self.client_to_player.remove(client_id)?;
        self.player_to_client.remove(&player_id);
        Some(player_id)
    }

    pub fn get_player_id(&self, client_id: &ClientId) -> Option<ActorId> {
        self.client_to_player.get(client_id).copied()
    }

    pub fn get_client_id(&self, player_id: ActorId) -> Option<&ClientId> {
        self.player_to_client.get(&player_id)
    }
}

static NEXT_PLAYER_ID: AtomicU32 = AtomicU32::new(1);

/// Player ids count up from 1 and wrap before reaching the NPC range.
pub fn generate_player_id() -> ActorId {
    let raw = NEXT_PLAYER_ID.fetch_add(1, Ordering::SeqCst);
    ActorId((raw - 1) % (FIRST_NPC_ID - 1) + 1)
}

/// Everything the server sends to clients, as tagged JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum ServerPacket {
    /// First packet of a session: the client's own actor.
    Welcome {
        actor: ActorId,
        position: IVec3,
        heading: i32,
        tick_rate: u32,
    },
    MoveToLocation {
        actor: ActorId,
        origin: IVec3,
        destination: IVec3,
    },
    StopMove {
        actor: ActorId,
        position: IVec3,
        heading: i32,
    },
    ActionFailed {
        actor: ActorId,
        reason: String,
    },
}

impl ServerPacket {
    pub fn from_broadcast(actor: ActorId, broadcast: &MovementBroadcast) -> Self {
        match *broadcast {
            MovementBroadcast::MoveToLocation { origin, destination } => ServerPacket::MoveToLocation {
                actor,
                origin,
                destination,
            },
            MovementBroadcast::StopMove { location } => ServerPacket::stop_move(actor, location),
        }
    }

    pub fn stop_move(actor: ActorId, location: Location) -> Self {
        ServerPacket::StopMove {
            actor,
            position: location.position,
            heading: location.heading,
        }
    }

    pub fn action_failed(actor: ActorId, error: MovementError) -> Self {
        ServerPacket::ActionFailed {
            actor,
            reason: error.to_string(),
        }
    }
}

/// Packets queued this tick, per receiving player.
#[derive(Resource, Default)]
pub struct NetworkUpdates {
    pub player_messages: HashMap<ActorId, Vec<ServerPacket>>,
}

impl NetworkUpdates {
    pub fn push(&mut self, player_id: ActorId, packet: ServerPacket) {
        self.player_messages.entry(player_id).or_default().push(packet);
    }

    pub fn messages_for(&self, player_id: ActorId) -> &[ServerPacket] {
        self.player_messages.get(&player_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (ActorId, Vec<ServerPacket>)> + '_ {
        self.player_messages.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packets_serialize_with_a_message_type() {
        let packet = ServerPacket::MoveToLocation {
            actor: ActorId(3),
            origin: IVec3::new(0, 0, 0),
            destination: IVec3::new(100, -20, 8),
        };
        let json = serde_json::to_value(&packet).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message_type": "move_to_location",
                "actor": 3,
                "origin": [0, 0, 0],
                "destination": [100, -20, 8],
            })
        );

        let json = serde_json::to_value(ServerPacket::action_failed(ActorId(3), MovementError::PathNotFound)).unwrap();
        assert_eq!(json["message_type"], "action_failed");
        assert_eq!(json["reason"], "no path to the requested destination");
    }

    #[test]
    fn stop_broadcast_carries_the_authoritative_location() {
        let location = Location::new(IVec3::new(5, 6, 7), 900);
        let packet = ServerPacket::from_broadcast(ActorId(1), &MovementBroadcast::StopMove { location });
        assert_eq!(
            packet,
            ServerPacket::StopMove {
                actor: ActorId(1),
                position: IVec3::new(5, 6, 7),
                heading: 900,
            }
        );
    }

    #[test]
    fn player_ids_stay_below_the_npc_range() {
        let id = generate_player_id();
        assert!(id.0 >= 1 && id.0 < FIRST_NPC_ID);
    }
}
