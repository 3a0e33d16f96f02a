use bevy::prelude::*;
use crate::ecs::core::{GameConfig, SimulationSet};
use crate::ecs::plugins::network::systems::queue_action_failures_system;
use crate::ecs::plugins::network::ws::components::*;
use crate::ecs::plugins::network::ws::systems::*;

/// WebSocket transport. Requires [`NetworkPlugin`](crate::ecs::plugins::network::NetworkPlugin).
pub struct WsNetworkPlugin;

impl Plugin for WsNetworkPlugin {
    fn build(&self, app: &mut App) {
        let network = app.world().resource::<GameConfig>().network.clone();
        let addr = format!("{}:{}", network.host, network.port);
        let (ws_send, ws_recv) = crossbeam_channel::unbounded::<WsEvent>();
        let (outbound_send, outbound_recv) = tokio::sync::mpsc::unbounded_channel::<OutboundMessage>();

        app.insert_resource(WsRecvChannel(ws_recv))
            .insert_resource(WsOutbound(outbound_send))
            .add_systems(Update, poll_ws_messages)
            .add_systems(FixedUpdate, send_network_updates_to_clients_system
                .in_set(SimulationSet::Network)
                .after(queue_action_failures_system));

        // Spawn background server in a new thread
        std::thread::spawn(move || {
            match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime.block_on(ws_server_task(addr, ws_send, outbound_recv)),
                Err(e) => error!("Failed to start WebSocket runtime: {}", e),
            }
        });
    }
}
