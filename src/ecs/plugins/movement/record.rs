use bevy::prelude::*;
use glam::{DVec2, IVec2, IVec3};
use std::sync::Arc;

/// `path_index` value of a record that is not following a path.
pub const NO_PATH_INDEX: i32 = -1;

/// Snapshot of one in-progress trajectory.
///
/// A record is never shared: the owning actor's [`Movement`] slot holds it
/// and every change replaces the whole value.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementRecord {
    /// Target of the current leg.
    pub destination: IVec3,
    /// Sub-unit running position in the horizontal plane.
    pub accurate_position: DVec2,
    pub path: Option<Arc<[IVec3]>>,
    /// Leg currently travelled, or [`NO_PATH_INDEX`].
    pub path_index: i32,
    /// Coarse cell of the path's final target, used to drop repeated requests.
    pub path_grid_cell: IVec2,
    /// Full precision final target, restored on the last leg.
    pub precise_target: IVec2,
    pub start_tick: u64,
    /// `None` until the first tick seeds `accurate_position`.
    pub last_update_tick: Option<u64>,
    pub last_broadcast_tick: u64,
    pub disregard_geodata: bool,
}

impl MovementRecord {
    /// Single segment move from `origin` to `destination`.
    pub fn direct(origin: IVec3, destination: IVec3, start_tick: u64) -> Self {
        Self {
            destination,
            accurate_position: origin.truncate().as_dvec2(),
            path: None,
            path_index: NO_PATH_INDEX,
            path_grid_cell: IVec2::ZERO,
            precise_target: destination.truncate(),
            start_tick,
            last_update_tick: None,
            last_broadcast_tick: 0,
            disregard_geodata: false,
        }
    }

    pub fn is_path_following(&self) -> bool {
        match &self.path {
            Some(path) => self.path_index >= 0 && (self.path_index as i64) < path.len() as i64 - 1,
            None => false,
        }
    }

    /// Same trajectory, no longer following its path.
    pub fn without_path(&self) -> Self {
        Self {
            path_index: NO_PATH_INDEX,
            ..self.clone()
        }
    }

    /// The record for the next path leg, starting from `origin` at `start_tick`.
    /// The final leg heads for the precise target at the height of the last
    /// path node.
    pub fn next_leg(&self, origin: IVec3, start_tick: u64) -> Option<Self> {
        if !self.is_path_following() {
            return None;
        }
        let path = self.path.as_ref()?;
        let index = self.path_index + 1;
        let node = path[index as usize];
        let destination = if self.path_index == path.len() as i32 - 2 {
            self.precise_target.extend(node.z)
        } else {
            node
        };
        Some(Self {
            destination,
            accurate_position: origin.truncate().as_dvec2(),
            path: Some(path.clone()),
            path_index: index,
            path_grid_cell: self.path_grid_cell,
            precise_target: self.precise_target,
            start_tick,
            last_update_tick: None,
            last_broadcast_tick: 0,
            disregard_geodata: self.disregard_geodata,
        })
    }
}

/// Per-actor movement slot. Empty means the actor is stationary.
#[derive(Component, Debug, Default, Clone)]
pub struct Movement {
    record: Option<MovementRecord>,
    generation: u64,
}

impl Movement {
    pub fn record(&self) -> Option<&MovementRecord> {
        self.record.as_ref()
    }

    /// An owned copy for readers that must not observe a later swap.
    pub fn snapshot(&self) -> Option<MovementRecord> {
        self.record.clone()
    }

    pub fn is_moving(&self) -> bool {
        self.record.is_some()
    }

    /// The current target, or `position` when idle.
    pub fn destination_or(&self, position: IVec3) -> IVec3 {
        self.record.as_ref().map_or(position, |record| record.destination)
    }

    pub fn is_path_following(&self) -> bool {
        self.record.as_ref().is_some_and(MovementRecord::is_path_following)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a deferred task armed for `generation` still refers to the
    /// move in progress.
    pub fn is_current(&self, generation: u64) -> bool {
        self.record.is_some() && self.generation == generation
    }

    /// Install a new move and return its generation.
    pub fn install(&mut self, record: MovementRecord) -> u64 {
        self.generation += 1;
        self.record = Some(record);
        self.generation
    }

    /// Swap in an updated copy of the current move.
    pub fn replace(&mut self, record: MovementRecord) {
        self.record = Some(record);
    }

    pub fn clear(&mut self) -> Option<MovementRecord> {
        self.record.take()
    }
}
