use bevy::prelude::*;
use crate::ecs::core::SimulationSet;
use crate::ecs::plugins::ai::systems::*;

pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, (
            ai_notification_system,
            follow_target_system,
            wander_system,
        ).chain().in_set(SimulationSet::Ai));
    }
}
