pub mod core;
pub mod plugins;

use bevy::app::PluginGroupBuilder;
use bevy::prelude::*;

use crate::ecs::core::{CorePlugin, GameConfig};
use crate::ecs::plugins::*;

/// The whole simulation without a transport: clock, geodata, zones,
/// movement, AI, players and packet queues.
pub struct SimulationPlugins {
    pub config: GameConfig,
}

impl SimulationPlugins {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }
}

impl PluginGroup for SimulationPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(CorePlugin { config: self.config })
            .add(SchedulerPlugin)
            .add(GeodataPlugin)
            .add(ZonePlugin)
            .add(MovementPlugin)
            .add(AiPlugin)
            .add(InputPlugin)
            .add(PlayerPlugin)
            .add(NetworkPlugin)
    }
}
