/*!
# WebSocket Network Systems

The server runs on its own thread with a tokio runtime. It talks to the
simulation through two channels only:

- inbound connection events and text frames (`crossbeam-channel`), polled
  every frame by [`poll_ws_messages`];
- outbound serialized packets (unbounded tokio mpsc), fed once per tick by
  [`send_network_updates_to_clients_system`].

Each connection owns a writer task fed by its own unbounded queue, so a
slow socket only delays its own client. A client whose writer has gone
away is dropped on the next packet addressed to it.
*/

use bevy::prelude::*;
use crossbeam_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use crate::ecs::plugins::input::{InputCommand, InputCommandEvent};
use crate::ecs::plugins::network::components::*;
use crate::ecs::plugins::network::ws::components::*;
use crate::ecs::plugins::player::{PlayerDespawnEvent, PlayerSpawnEvent};

/// Per-client writer queues. Never held across an `.await`.
type ClientQueues = Arc<Mutex<HashMap<SocketAddr, UnboundedSender<Message>>>>;

fn lock_queues(queues: &ClientQueues) -> MutexGuard<'_, HashMap<SocketAddr, UnboundedSender<Message>>> {
    queues.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Hand one packet to its client's writer without waiting on the socket.
fn route_outbound(queues: &ClientQueues, OutboundMessage { client, text }: OutboundMessage) {
    let mut queues = lock_queues(queues);
    let Some(queue) = queues.get(&client) else {
        return;
    };
    if queue.send(Message::Text(text.into())).is_err() {
        queues.remove(&client);
        debug!("Removed failed WebSocket connection: {:?}", client);
    }
}

pub async fn ws_server_task(
    addr: String,
    ws_send: Sender<WsEvent>,
    mut outbound: UnboundedReceiver<OutboundMessage>,
) {
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind WebSocket server on {}: {}", addr, e);
            return;
        }
    };
    info!("WebSocket server started on ws://{}", addr);

    let queues: ClientQueues = Arc::default();

    let router = queues.clone();
    tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            route_outbound(&router, message);
        }
    });

    while let Ok((stream, client_addr)) = listener.accept().await {
        let ws_send = ws_send.clone();
        let queues = queues.clone();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws_stream) => ws_stream,
                Err(e) => {
                    warn!("WebSocket handshake with {:?} failed: {}", client_addr, e);
                    return;
                }
            };
            let (mut sink, mut stream) = ws_stream.split();
            let (queue, mut pending) = unbounded_channel::<Message>();
            let writer = tokio::spawn(async move {
                while let Some(message) = pending.recv().await {
                    if sink.send(message).await.is_err() {
                        break;
                    }
                }
            });
            lock_queues(&queues).insert(client_addr, queue);
            let _ = ws_send.send(WsEvent::Connected(client_addr));

            while let Some(Ok(msg)) = stream.next().await {
                match msg {
                    Message::Text(text) => {
                        let _ = ws_send.send(WsEvent::TextMessage { client: client_addr, text: text.to_string() });
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }

            lock_queues(&queues).remove(&client_addr);
            writer.abort();
            let _ = ws_send.send(WsEvent::Disconnected(client_addr));
        });
    }
}

pub fn poll_ws_messages(
    recv: Res<WsRecvChannel>,
    mut connected_clients: ResMut<ConnectedClients>,
    mut player_registry: ResMut<NetworkPlayerRegistry>,
    mut connect_events: EventWriter<ClientConnectedEvent>,
    mut disconnect_events: EventWriter<ClientDisconnectedEvent>,
    mut input_events: EventWriter<InputCommandEvent>,
    mut spawn_events: EventWriter<PlayerSpawnEvent>,
    mut despawn_events: EventWriter<PlayerDespawnEvent>,
) {
    for event in recv.0.try_iter() {
        match event {
            WsEvent::Connected(addr) => {
                let client_id = ClientId::WebSocket(addr);
                let player_id = generate_player_id();

                connected_clients.clients.insert(client_id, ClientInfo::new(client_id));
                player_registry.register_player(client_id, player_id);

                spawn_events.send(PlayerSpawnEvent { player_id });
                connect_events.send(ClientConnectedEvent { client_id, player_id });

                info!("WS Player {} connected from {:?} (Total: {})",
                    player_id, addr, connected_clients.clients.len());
            }
            WsEvent::Disconnected(addr) => {
                let client_id = ClientId::WebSocket(addr);

                let Some(player_id) = player_registry.unregister_player(&client_id) else {
                    warn!("Received disconnect for unknown client {:?}", addr);
                    continue;
                };
                let session = connected_clients.clients.remove(&client_id)
                    .map(|info| info.connected_at.elapsed())
                    .unwrap_or_default();

                disconnect_events.send(ClientDisconnectedEvent {
                    client_id,
                    player_id,
                    reason: "WebSocket disconnected".to_string(),
                });
                despawn_events.send(PlayerDespawnEvent { player_id });

                info!("WS Player {} disconnected from {:?} (Session: {}s, Remaining: {})",
                    player_id, addr, session.as_secs(), connected_clients.clients.len());
            }
            WsEvent::TextMessage { client, text } => {
                let Some(player_id) = player_registry.get_player_id(&ClientId::WebSocket(client)) else {
                    warn!("Received text message from unregistered WS client: {:?}", client);
                    continue;
                };
                match serde_json::from_str::<InputCommand>(&text) {
                    Ok(command) => {
                        input_events.send(InputCommandEvent { player_id, command });
                    }
                    Err(e) => {
                        warn!("Error parsing JSON from player {}: '{}' - Error: {} - Expected format: {{\"MoveTo\": {{\"x\": 0, \"y\": 0, \"z\": 0}}}}",
                            player_id, text, e);
                    }
                }
            }
        }
    }
}

/// System: Send this tick's queued packets to their WebSocket clients
pub fn send_network_updates_to_clients_system(
    mut network_updates: ResMut<NetworkUpdates>,
    player_registry: Res<NetworkPlayerRegistry>,
    outbound: Res<WsOutbound>,
) {
    for (player_id, packets) in network_updates.drain() {
        let Some(ClientId::WebSocket(client)) = player_registry.get_client_id(player_id).copied() else {
            continue;
        };
        for packet in packets {
            match serde_json::to_string(&packet) {
                Ok(text) => {
                    // Only fails once the server thread is gone.
                    let _ = outbound.0.send(OutboundMessage { client, text });
                }
                Err(e) => error!("Failed to serialize packet for player {}: {}", player_id, e),
            }
        }
    }
}
