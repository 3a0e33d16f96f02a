use bevy::prelude::*;
use crate::ecs::core::{GameConfig, SimulationSet};
use crate::ecs::plugins::scheduler::resources::GameTimeController;
use crate::ecs::plugins::scheduler::systems::advance_game_ticks_system;

pub struct SchedulerPlugin;

impl Plugin for SchedulerPlugin {
    fn build(&self, app: &mut App) {
        let clock = GameTimeController::new(app.world().resource::<GameConfig>().tick_rate);
        let tick_rate = clock.ticks_per_second();
        app.insert_resource(clock)
            .insert_resource(Time::<Fixed>::from_hz(tick_rate as f64))
            .add_systems(FixedUpdate, advance_game_ticks_system
                .in_set(SimulationSet::Clock)
                .before(crate::ecs::core::plugin::register_new_actors_system));
    }
}
