/*!
# Movement Sync Server

Server-authoritative movement for an MMO world: actors are told to go
somewhere, the server validates the destination against geodata, plans a
path when needed, advances every moving actor once per tick and tells
nearby players what they need to render it.

Everything lives in Bevy plugins under [`ecs::plugins`]; the
[`SimulationPlugins`](ecs::SimulationPlugins) group assembles all of them
except the WebSocket transport, which the binary adds on top.
*/

pub mod ecs;

pub use ecs::SimulationPlugins;
pub use ecs::core::{ConfigError, GameConfig};
