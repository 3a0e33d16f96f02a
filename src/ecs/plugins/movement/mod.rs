pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod plugin;
pub mod record;
pub mod systems;

pub use config::MovementConfig;
pub use engine::{ActorMut, MovementEngine};
pub use error::{MoveOutcome, MovementError, TickOutcome};
pub use events::{
    AiEvent, AiNotification, MoveRequestEvent, MovementBroadcast, MovementBroadcastEvent, MovementNotice,
    MovementOutbox, StopRequestEvent,
};
pub use plugin::MovementPlugin;
pub use record::{Movement, MovementRecord, NO_PATH_INDEX};
