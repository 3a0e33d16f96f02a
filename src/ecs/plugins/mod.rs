pub mod ai;
pub mod debug;
pub mod geodata;
pub mod input;
pub mod movement;
pub mod network;
pub mod player;
pub mod scheduler;
pub mod zone;

pub use ai::AiPlugin;
pub use debug::DebugPlugin;
pub use geodata::GeodataPlugin;
pub use input::InputPlugin;
pub use movement::MovementPlugin;
pub use network::{NetworkPlugin, WsNetworkPlugin};
pub use player::PlayerPlugin;
pub use scheduler::SchedulerPlugin;
pub use zone::ZonePlugin;
