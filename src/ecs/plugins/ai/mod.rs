pub mod components;
pub mod plugin;
pub mod systems;

pub use components::{Desire, Wander};
pub use plugin::AiPlugin;
