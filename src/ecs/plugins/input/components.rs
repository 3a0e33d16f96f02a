use bevy::prelude::*;
use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::ecs::core::ActorId;

/// A command from a connected client, as JSON:
/// `{"MoveTo": {"x": 100, "y": 50, "z": 0}}`, `"Stop"`,
/// `{"Attack": {"target": 10001}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputCommand {
    MoveTo {
        x: i32,
        y: i32,
        z: i32,
        #[serde(default)]
        offset: i32,
    },
    Stop,
    Attack { target: ActorId },
    Follow { target: ActorId },
}

impl InputCommand {
    pub fn move_to(target: IVec3) -> Self {
        InputCommand::MoveTo {
            x: target.x,
            y: target.y,
            z: target.z,
            offset: 0,
        }
    }
}

#[derive(Event, Debug, Clone)]
pub struct InputCommandEvent {
    pub player_id: ActorId,
    pub command: InputCommand,
}
