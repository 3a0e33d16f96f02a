use thiserror::Error;

/// Why a move was refused or cut short. None of these are fatal: the actor
/// is simply left where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MovementError {
    #[error("actor cannot move: speed is zero")]
    NoSpeed,
    #[error("no path to the requested destination")]
    PathNotFound,
    #[error("obstacle ahead of a long move")]
    ObstacleDetected,
    #[error("nothing left to travel after validation")]
    ZeroDistanceCancel,
}

/// Result of a successful `move_to_location` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A new trajectory was installed.
    Started { ticks_to_move: u64, path_following: bool },
    /// Already within the requested distance; the AI was told it arrived.
    ImmediateArrival,
    /// The request targets the cell the current path already leads to.
    Unchanged,
}

/// Result of advancing one actor by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Stationary,
    StillMoving,
    Arrived,
}
