/*!
# Movement Sync Server

A real-time movement server built with Bevy ECS (Entity Component System).

## Architecture Overview

This server uses a plugin-based architecture where each major system is implemented as a plugin:

- **CorePlugin**: Actors, registries, configuration and the tick ordering
- **SchedulerPlugin**: Game tick clock, moving-actor set and deferred tasks
- **GeodataPlugin**: Walkability checks and path planning
- **ZonePlugin**: Water zones
- **MovementPlugin**: Move validation, path following and per-tick advance
- **AiPlugin**: Reactions to arrivals and failures, following and wandering
- **InputPlugin**: Client command processing
- **PlayerPlugin**: Player lifecycle management (spawn/despawn) and NPC placement
- **NetworkPlugin** + **WsNetworkPlugin**: Observer selection and WebSocket transport
- **DebugPlugin**: Development tools and logging

## How It Works

1. Clients connect via WebSocket and get a player actor at a random spawn point
2. Clients send commands (MoveTo, Stop, Attack, Follow)
3. The server validates the destination, plans a path when the straight
   line is blocked and advances the actor every tick
4. Players within view distance receive move and stop packets

Run the server and connect clients to `ws://localhost:5000`.
*/

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::app::ScheduleRunnerPlugin;
use std::time::Duration;

use movement_sync_server::ecs::plugins::{DebugPlugin, WsNetworkPlugin};
use movement_sync_server::{GameConfig, SimulationPlugins};

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "MOVEMENT_SERVER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "server.toml";

/// Main entry point for the movement server.
///
/// Loads the configuration, sets up the Bevy app with all plugins and
/// starts the game loop.
fn main() {
    println!("🚀 Starting Movement Sync Server...");
    println!("📡 Network Protocol: WebSocket");

    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let (config, config_status) = match GameConfig::load(&config_path) {
        Ok(config) => (config, format!("loaded {}", config_path)),
        Err(e) => (GameConfig::default(), format!("{}, using defaults", e)),
    };
    let frame_time = Duration::from_millis((config.millis_per_tick() / 4).max(1) as u64);

    App::new()
        // Bevy's minimal plugins (no graphics/audio needed for server)
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame_time)))
        .add_plugins(LogPlugin {
            filter: "wgpu=error,movement_sync_server=debug".to_string(),
            ..default()
        })

        // Simulation, then transport on top
        .add_plugins(SimulationPlugins::new(config))
        .add_plugins(WsNetworkPlugin)
        .add_plugins(DebugPlugin)

        // Setup game world when server starts
        .add_systems(Startup, move |config: Res<GameConfig>| setup_game_world(&config, &config_status))

        // Start the game loop
        .run();
}

/// Print startup information once the world is set up.
fn setup_game_world(config: &GameConfig, config_status: &str) {
    println!("⚙️  Config: {}", config_status);
    println!("🌍 Game world initialized at {} ticks/s!", config.tick_rate);
    println!("🧱 Obstacles: {}, zones: {}, NPCs: {}",
        config.geodata.obstacles.len(), config.zones.len(), config.npcs.len());
    println!("🎮 Server ready for player connections");
    println!("📍 WebSocket: ws://{}:{}", config.network.host, config.network.port);
    println!();
    println!("📤 Input format: {{\"MoveTo\": {{\"x\": 100, \"y\": 50, \"z\": 0}}}}, \"Stop\", {{\"Attack\": {{\"target\": 10000}}}}");
}
