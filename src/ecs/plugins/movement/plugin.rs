use bevy::prelude::*;
use crate::ecs::core::SimulationSet;
use crate::ecs::plugins::movement::events::*;
use crate::ecs::plugins::movement::systems::*;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MoveRequestEvent>()
            .add_event::<StopRequestEvent>()
            .add_event::<AiNotification>()
            .add_event::<MovementBroadcastEvent>()
            .init_resource::<MovementOutbox>()
            .add_systems(FixedUpdate, (
                move_request_system,
                stop_request_system,
            ).chain().in_set(SimulationSet::Commands))
            .add_systems(FixedUpdate, (
                moving_objects_system,
                movement_watchdog_system,
            ).chain().in_set(SimulationSet::Advance))
            .add_systems(FixedUpdate, dispatch_movement_notices_system.in_set(SimulationSet::Dispatch));
    }
}
