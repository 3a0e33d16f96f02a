use bevy::prelude::*;
use glam::IVec3;

use crate::ecs::core::ActorId;

/// Ticks between two follow checks of an actor chasing a target.
pub const FOLLOW_INTERVAL_TICKS: u64 = 10;
/// Stop offset used when following a target that is not being attacked.
pub const FOLLOW_OFFSET: i32 = 60;

/// What the actor is currently trying to do. Movement reads it to decide
/// whether a move is a combat approach.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Desire {
    #[default]
    Idle,
    MoveTo,
    Attack { target: ActorId },
    Follow { target: ActorId },
}

impl Desire {
    pub fn is_attacking(&self) -> bool {
        matches!(self, Desire::Attack { .. })
    }

    /// The actor being chased, if any.
    pub fn target(&self) -> Option<ActorId> {
        match self {
            Desire::Attack { target } | Desire::Follow { target } => Some(*target),
            Desire::Idle | Desire::MoveTo => None,
        }
    }

    /// How far short of its target a chasing actor stops.
    pub fn approach_offset(&self, attack_offset: i32) -> i32 {
        if self.is_attacking() { attack_offset } else { FOLLOW_OFFSET }
    }
}

/// Idle NPCs with this component stroll to random points around `home`.
#[derive(Component, Debug, Clone, Copy)]
pub struct Wander {
    pub home: IVec3,
    pub radius: i32,
    pub interval_ticks: u64,
    pub next_tick: u64,
}

impl Wander {
    pub fn new(home: IVec3, radius: i32, interval_ticks: u64) -> Self {
        Self {
            home,
            radius,
            interval_ticks,
            next_tick: 0,
        }
    }
}
