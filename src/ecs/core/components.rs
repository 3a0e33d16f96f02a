use bevy::prelude::*;
use glam::IVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ecs::plugins::ai::Desire;
use crate::ecs::plugins::movement::Movement;

/// Identifier shared by players and NPCs. Players take ids below
/// [`FIRST_NPC_ID`], NPCs are allocated from it upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub const FIRST_NPC_ID: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Player,
    /// Peaceful AI-controlled character (citizens, guards).
    Npc,
    /// Hostile AI-controlled character.
    Monster,
}

impl ActorKind {
    pub fn is_player(self) -> bool {
        matches!(self, ActorKind::Player)
    }

    pub fn is_hostile(self) -> bool {
        matches!(self, ActorKind::Monster)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveStats {
    /// World units per second.
    pub speed: f64,
    pub collision_radius: f64,
    pub can_fly: bool,
}

impl Default for MoveStats {
    fn default() -> Self {
        Self {
            speed: 100.0,
            collision_radius: 0.0,
            can_fly: false,
        }
    }
}

/// Server-authoritative state of anything that can move through the world.
#[derive(Component, Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: IVec3,
    /// Client heading units, 65536 per full turn.
    pub heading: i32,
    pub stats: MoveStats,
    pub in_vehicle: bool,
    pub in_water: bool,
}

impl Actor {
    pub fn new(id: ActorId, kind: ActorKind, position: IVec3, stats: MoveStats) -> Self {
        Self {
            id,
            kind,
            position,
            heading: 0,
            stats,
            in_vehicle: false,
            in_water: false,
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.position, self.heading)
    }
}

/// A position together with the heading an actor should face there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub position: IVec3,
    pub heading: i32,
}

impl Location {
    pub fn new(position: IVec3, heading: i32) -> Self {
        Self { position, heading }
    }
}

#[derive(Bundle)]
pub struct ActorBundle {
    pub actor: Actor,
    pub desire: Desire,
    pub movement: Movement,
}

impl ActorBundle {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            desire: Desire::Idle,
            movement: Movement::default(),
        }
    }
}

/// Ordering of the fixed-tick pipeline. Every plugin places its systems in
/// one of these sets so the tick reads front to back.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Clock,
    Input,
    Ai,
    Commands,
    Advance,
    Dispatch,
    Network,
}
