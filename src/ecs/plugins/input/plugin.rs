use bevy::prelude::*;
use crate::ecs::core::SimulationSet;
use crate::ecs::plugins::input::components::*;
use crate::ecs::plugins::input::systems::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<InputCommandEvent>()
            .add_systems(FixedUpdate, input_processing_system.in_set(SimulationSet::Input));
    }
}
