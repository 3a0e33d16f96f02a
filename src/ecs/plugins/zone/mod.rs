use bevy::prelude::*;
use glam::{IVec2, IVec3};
use serde::Deserialize;

use crate::ecs::core::{Actor, GameConfig, ZoneConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub kind: ZoneKind,
    pub min: IVec2,
    pub max: IVec2,
}

impl Zone {
    pub fn contains(&self, position: IVec3) -> bool {
        position.x >= self.min.x
            && position.x <= self.max.x
            && position.y >= self.min.y
            && position.y <= self.max.y
    }
}

impl From<&ZoneConfig> for Zone {
    fn from(config: &ZoneConfig) -> Self {
        Self {
            kind: config.kind,
            min: config.area.min.min(config.area.max),
            max: config.area.min.max(config.area.max),
        }
    }
}

/// Areas with movement rules of their own.
#[derive(Resource, Debug, Clone, Default)]
pub struct ZoneMap {
    pub zones: Vec<Zone>,
}

impl ZoneMap {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    pub fn is_inside(&self, position: IVec3, kind: ZoneKind) -> bool {
        self.zones
            .iter()
            .any(|zone| zone.kind == kind && zone.contains(position))
    }

    /// Recompute the zone flags of an actor after its position changed.
    pub fn revalidate(&self, actor: &mut Actor) {
        let in_water = self.is_inside(actor.position, ZoneKind::Water);
        if actor.in_water != in_water {
            debug!("Actor {} {} water", actor.id, if in_water { "entered" } else { "left" });
            actor.in_water = in_water;
        }
    }
}

pub struct ZonePlugin;

impl Plugin for ZonePlugin {
    fn build(&self, app: &mut App) {
        let zones = app
            .world()
            .resource::<GameConfig>()
            .zones
            .iter()
            .map(Zone::from)
            .collect();
        app.insert_resource(ZoneMap::new(zones));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::core::{ActorId, ActorKind, MoveStats};

    #[test]
    fn revalidate_tracks_water_edges() {
        let zones = ZoneMap::new(vec![Zone {
            kind: ZoneKind::Water,
            min: IVec2::new(0, 0),
            max: IVec2::new(100, 100),
        }]);
        let mut actor = Actor::new(ActorId(1), ActorKind::Player, IVec3::new(50, 50, 0), MoveStats::default());

        zones.revalidate(&mut actor);
        assert!(actor.in_water);

        actor.position = IVec3::new(101, 50, 0);
        zones.revalidate(&mut actor);
        assert!(!actor.in_water);
    }
}
