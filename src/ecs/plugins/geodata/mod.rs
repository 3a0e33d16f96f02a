pub mod grid;
pub mod planner;

pub use grid::GridGeodata;
pub use planner::{Geodata, PathPlanner};

use bevy::prelude::*;
use crate::ecs::core::GameConfig;

/// Installs the grid geodata described by the configuration unless a
/// planner was inserted beforehand.
pub struct GeodataPlugin;

impl Plugin for GeodataPlugin {
    fn build(&self, app: &mut App) {
        if app.world().contains_resource::<Geodata>() {
            return;
        }
        let config = app.world().resource::<GameConfig>();
        let grid = GridGeodata::from_config(&config.world, &config.geodata);
        info!("Geodata: {} cell grid, {} obstacles", config.geodata.cell_size, config.geodata.obstacles.len());
        app.insert_resource(Geodata::new(grid));
    }
}
