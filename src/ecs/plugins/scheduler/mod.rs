pub mod plugin;
pub mod resources;
pub mod systems;

pub use plugin::SchedulerPlugin;
pub use resources::{DeferredAction, GameTimeController, MAX_TICK_RATE, ScheduledTask};
