pub mod components;
pub mod systems;
pub mod ws;

pub use components::*;
pub use ws::WsNetworkPlugin;

use bevy::prelude::*;
use crate::ecs::core::SimulationSet;
use systems::{queue_action_failures_system, queue_movement_packets_system, send_welcome_system};

/// Observer selection and packet queues. Transports plug in on top.
pub struct NetworkPlugin;

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NetworkUpdates>()
            .init_resource::<ConnectedClients>()
            .init_resource::<NetworkPlayerRegistry>()
            .add_event::<ClientConnectedEvent>()
            .add_event::<ClientDisconnectedEvent>()
            .add_systems(FixedUpdate, (
                send_welcome_system,
                queue_movement_packets_system,
                queue_action_failures_system,
            ).chain().in_set(SimulationSet::Network));
    }
}
