pub mod components;
pub mod plugin;
pub mod systems;

pub use components::{InputCommand, InputCommandEvent};
pub use plugin::InputPlugin;
