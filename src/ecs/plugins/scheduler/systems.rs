use bevy::prelude::*;
use crate::ecs::plugins::scheduler::resources::GameTimeController;

/// System: Advance the simulation clock by one tick
pub fn advance_game_ticks_system(mut clock: ResMut<GameTimeController>) {
    clock.advance();
}
