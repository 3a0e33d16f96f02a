use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::ecs::core::{Actor, ActorRegistry, GameConfig};
use crate::ecs::plugins::ai::Desire;
use crate::ecs::plugins::geodata::Geodata;
use crate::ecs::plugins::movement::engine::{ActorMut, MovementEngine};
use crate::ecs::plugins::movement::error::TickOutcome;
use crate::ecs::plugins::movement::events::*;
use crate::ecs::plugins::movement::record::Movement;
use crate::ecs::plugins::scheduler::{DeferredAction, GameTimeController};
use crate::ecs::plugins::zone::ZoneMap;

/// Everything a [`MovementEngine`] borrows for the length of one system.
#[derive(SystemParam)]
pub struct MovementContext<'w> {
    config: Res<'w, GameConfig>,
    geodata: Res<'w, Geodata>,
    zones: Res<'w, ZoneMap>,
    clock: ResMut<'w, GameTimeController>,
    outbox: ResMut<'w, MovementOutbox>,
}

impl MovementContext<'_> {
    pub fn engine(&mut self) -> MovementEngine<'_> {
        MovementEngine::new(
            &self.config.movement,
            self.config.world.origin,
            self.geodata.planner(),
            &self.zones,
            &mut self.clock,
            &mut self.outbox,
        )
    }
}

type MovingActors<'w, 's> = Query<'w, 's, (&'static mut Actor, &'static mut Desire, &'static mut Movement)>;

/// System: Start the moves requested this tick
pub fn move_request_system(
    mut requests: EventReader<MoveRequestEvent>,
    registry: Res<ActorRegistry>,
    mut context: MovementContext,
    mut actors: MovingActors,
) {
    let mut engine = context.engine();
    for request in requests.read() {
        let Some(entity) = registry.get_entity(request.actor) else {
            debug!("Move request for unknown actor {}", request.actor);
            continue;
        };
        let Ok((mut actor, mut desire, mut movement)) = actors.get_mut(entity) else {
            continue;
        };
        let mut view = ActorMut::new(&mut actor, &mut desire, &mut movement);
        match engine.move_to_location(&mut view, request.target, request.offset) {
            Ok(outcome) => debug!("Actor {} -> {:?}: {:?}", request.actor, request.target, outcome),
            Err(error) => debug!("Actor {} -> {:?} refused: {}", request.actor, request.target, error),
        }
    }
}

/// System: Halt actors on request, at the given location or where they stand
pub fn stop_request_system(
    mut requests: EventReader<StopRequestEvent>,
    registry: Res<ActorRegistry>,
    mut context: MovementContext,
    mut actors: MovingActors,
) {
    let mut engine = context.engine();
    for request in requests.read() {
        let Some(entity) = registry.get_entity(request.actor) else {
            continue;
        };
        let Ok((mut actor, mut desire, mut movement)) = actors.get_mut(entity) else {
            continue;
        };
        let location = request.location.unwrap_or_else(|| actor.location());
        let mut view = ActorMut::new(&mut actor, &mut desire, &mut movement);
        engine.stop(&mut view, location);
    }
}

/// System: Advance every registered actor by one tick
pub fn moving_objects_system(
    registry: Res<ActorRegistry>,
    mut context: MovementContext,
    mut actors: MovingActors,
) {
    let mut engine = context.engine();
    // Snapshot: arrivals below change the moving set.
    for id in engine.clock().moving_actors() {
        let Some(entity) = registry.get_entity(id) else {
            engine.clock().unregister_moving(id);
            continue;
        };
        let Ok((mut actor, mut desire, mut movement)) = actors.get_mut(entity) else {
            engine.clock().unregister_moving(id);
            continue;
        };
        let mut view = ActorMut::new(&mut actor, &mut desire, &mut movement);
        match engine.advance_tick(&mut view) {
            Ok(TickOutcome::StillMoving) => {}
            Ok(TickOutcome::Arrived) => {
                if !engine.complete_leg(&mut view) {
                    debug!("Actor {} arrived at {:?}", id, view.actor.position);
                }
            }
            Ok(TickOutcome::Stationary) => engine.clock().unregister_moving(id),
            Err(error) => debug!("Actor {} stopped: {}", id, error),
        }
    }
}

/// System: Fire due progress checks for moves that are still in progress
pub fn movement_watchdog_system(
    mut clock: ResMut<GameTimeController>,
    mut outbox: ResMut<MovementOutbox>,
    registry: Res<ActorRegistry>,
    movements: Query<&Movement>,
) {
    for task in clock.drain_due() {
        match task.action {
            DeferredAction::RevalidateArrival { actor, generation } => {
                let current = registry
                    .get_entity(actor)
                    .and_then(|entity| movements.get(entity).ok())
                    .is_some_and(|movement| movement.is_current(generation));
                if current {
                    outbox.notify_ai(actor, AiEvent::ArrivedRevalidate);
                } else {
                    debug!("Dropping stale progress check for {}", actor);
                }
            }
        }
    }
}

/// System: Hand this tick's notices to the AI and network layers
pub fn dispatch_movement_notices_system(
    mut outbox: ResMut<MovementOutbox>,
    mut ai_events: EventWriter<AiNotification>,
    mut broadcasts: EventWriter<MovementBroadcastEvent>,
) {
    for notice in outbox.drain() {
        match notice {
            MovementNotice::Ai { actor, event } => {
                ai_events.send(AiNotification { actor, event });
            }
            MovementNotice::Broadcast { actor, broadcast, include_self } => {
                broadcasts.send(MovementBroadcastEvent { actor, broadcast, include_self });
            }
        }
    }
}
