use bevy::prelude::*;
use glam::{IVec2, IVec3};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::ecs::core::components::{ActorId, ActorKind, FIRST_NPC_ID};
use crate::ecs::plugins::movement::MovementConfig;
use crate::ecs::plugins::scheduler::MAX_TICK_RATE;
use crate::ecs::plugins::zone::ZoneKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Simulation ticks per second, 1 to [`MAX_TICK_RATE`].
    pub tick_rate: u32,
    pub world: WorldConfig,
    pub movement: MovementConfig,
    pub geodata: GeodataConfig,
    pub zones: Vec<ZoneConfig>,
    pub player: PlayerConfig,
    pub npcs: Vec<NpcSpawnConfig>,
    pub network: NetworkConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: 10,
            world: WorldConfig::default(),
            movement: MovementConfig::default(),
            geodata: GeodataConfig::default(),
            zones: Vec::new(),
            player: PlayerConfig::default(),
            npcs: Vec::new(),
            network: NetworkConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML file. Missing sections keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(contents)?;
        config.tick_rate = config.tick_rate.clamp(1, MAX_TICK_RATE);
        Ok(config)
    }

    pub fn millis_per_tick(&self) -> u32 {
        (1000 / self.tick_rate.clamp(1, MAX_TICK_RATE)).max(1)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World coordinates of the geodata grid origin.
    pub origin: IVec2,
    pub spawn_min: IVec2,
    pub spawn_max: IVec2,
    pub spawn_z: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            origin: IVec2::new(-327_680, -262_144),
            spawn_min: IVec2::new(0, 0),
            spawn_max: IVec2::new(2_000, 2_000),
            spawn_z: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RectConfig {
    pub min: IVec2,
    pub max: IVec2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeodataConfig {
    pub cell_size: i32,
    /// Cells added around the start/goal bounding box before A* gives up.
    pub search_margin_cells: i32,
    pub obstacles: Vec<RectConfig>,
}

impl Default for GeodataConfig {
    fn default() -> Self {
        Self {
            cell_size: 16,
            search_margin_cells: 64,
            obstacles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneConfig {
    pub kind: ZoneKind,
    pub area: RectConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f64,
    pub collision_radius: f64,
    pub view_distance: f64,
    /// Stop offset used when approaching an attack target.
    pub attack_offset: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 120.0,
            collision_radius: 8.0,
            view_distance: 3_000.0,
            attack_offset: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NpcSpawnConfig {
    pub kind: ActorKind,
    pub position: IVec3,
    #[serde(default = "default_npc_speed")]
    pub speed: f64,
    #[serde(default)]
    pub collision_radius: f64,
    #[serde(default)]
    pub can_fly: bool,
    /// Zero disables wandering.
    #[serde(default)]
    pub wander_radius: i32,
}

fn default_npc_speed() -> f64 {
    80.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Resource, Default)]
pub struct ActorRegistry {
    pub actors: HashMap<ActorId, Entity>,
}

impl ActorRegistry {
    pub fn register_actor(&mut self, id: ActorId, entity: Entity) {
        self.actors.insert(id, entity);
    }

    pub fn unregister_actor(&mut self, id: ActorId) -> Option<Entity> {
        self.actors.remove(&id)
    }

    pub fn get_entity(&self, id: ActorId) -> Option<Entity> {
        self.actors.get(&id).copied()
    }
}

#[derive(Resource)]
pub struct ActorIdAllocator {
    next_npc_id: u32,
}

impl Default for ActorIdAllocator {
    fn default() -> Self {
        Self {
            next_npc_id: FIRST_NPC_ID,
        }
    }
}

impl ActorIdAllocator {
    pub fn allocate_npc(&mut self) -> ActorId {
        let id = ActorId(self.next_npc_id);
        self.next_npc_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml(
            r#"
            tick_rate = 20

            [movement]
            water_clamp_distance = 500.0

            [[geodata.obstacles]]
            min = [0, 0]
            max = [64, 64]

            [[npcs]]
            kind = "monster"
            position = [100, 200, 0]
            wander_radius = 300
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_rate, 20);
        assert_eq!(config.millis_per_tick(), 50);
        assert_eq!(config.movement.water_clamp_distance, 500.0);
        assert_eq!(config.movement.arrive_fraction, 1.79);
        assert_eq!(config.geodata.cell_size, 16);
        assert_eq!(config.geodata.obstacles.len(), 1);
        assert_eq!(config.npcs[0].kind, ActorKind::Monster);
        assert_eq!(config.npcs[0].speed, 80.0);
        assert_eq!(config.network.port, 5000);
    }

    #[test]
    fn tick_rate_is_clamped_on_load() {
        let fast = GameConfig::from_toml("tick_rate = 5000").unwrap();
        assert_eq!(fast.tick_rate, MAX_TICK_RATE);
        assert_eq!(fast.millis_per_tick(), 1);

        let stopped = GameConfig::from_toml("tick_rate = 0").unwrap();
        assert_eq!(stopped.tick_rate, 1);
        assert_eq!(stopped.millis_per_tick(), 1000);
    }

    #[test]
    fn bundled_server_toml_loads() {
        let config = GameConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/server.toml")).unwrap();
        assert_eq!(config.tick_rate, 10);
        assert_eq!(config.zones.len(), 1);
        assert_eq!(config.npcs.len(), 2);
        assert_eq!(config.geodata.obstacles.len(), 2);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let error = GameConfig::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(error, ConfigError::Read { .. }));
    }

    #[test]
    fn npc_ids_start_above_player_range() {
        let mut allocator = ActorIdAllocator::default();
        assert_eq!(allocator.allocate_npc(), ActorId(FIRST_NPC_ID));
        assert_eq!(allocator.allocate_npc(), ActorId(FIRST_NPC_ID + 1));
    }
}
