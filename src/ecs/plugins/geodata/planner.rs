use bevy::prelude::*;
use glam::IVec3;

use crate::ecs::core::ActorId;

/// Walkability and path queries over the world's navigable surface.
///
/// Implementations are synchronous and expected to finish in bounded time;
/// they are only consulted when a move is issued (plus one cheap probe per
/// tick for long player moves), never on every tick for every actor.
pub trait PathPlanner: Send + Sync {
    /// The walkable point nearest to `to` along the straight line from `from`.
    fn valid_location(&self, from: IVec3, to: IVec3, actor: ActorId) -> IVec3;

    /// Whether the straight segment `from -> to` is traversable.
    fn can_move_to_target(&self, from: IVec3, to: IVec3, actor: ActorId) -> bool;

    /// Waypoints leading from `from` to `to`, excluding the start point.
    /// `strict` requires the exact goal to be reachable; otherwise the
    /// planner may settle for a walkable point next to it.
    fn find_path(&self, from: IVec3, to: IVec3, actor: ActorId, strict: bool) -> Option<Vec<IVec3>>;
}

/// The planner the movement engine consults.
#[derive(Resource)]
pub struct Geodata(Box<dyn PathPlanner>);

impl Geodata {
    pub fn new(planner: impl PathPlanner + 'static) -> Self {
        Self(Box::new(planner))
    }

    pub fn planner(&self) -> &dyn PathPlanner {
        self.0.as_ref()
    }
}
