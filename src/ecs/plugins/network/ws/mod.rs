pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::WsNetworkPlugin;
