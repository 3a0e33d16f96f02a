/*!
# Movement Engine

Turns "move to (x, y, z)" into a validated trajectory and advances it once
per tick.

A move goes through three stages:

1. **Validation**: the requested point is checked against geodata, unless the
   move is one the client must be trusted on (combat approach, vehicles, far
   player clicks, ledges, deliberate falls).
2. **Planning**: when validation moved the target noticeably, a path is
   searched. Hostile actors fall back to the best reachable grid point near
   the target; other NPCs walk straight ignoring geodata; players give up.
3. **Advancing**: every tick the actor covers `speed * elapsed` of the
   remaining distance, snapping onto the destination once it would overshoot.

The engine owns no state. Everything it touches is borrowed for the length
of one call: the actor, the clock, and the outbox that collects AI events
and broadcasts.
*/

use bevy::prelude::*;
use glam::{DVec2, DVec3, IVec2, IVec3};
use std::sync::Arc;

use crate::ecs::core::{Actor, ActorId, Location};
use crate::ecs::plugins::ai::Desire;
use crate::ecs::plugins::geodata::PathPlanner;
use crate::ecs::plugins::movement::config::MovementConfig;
use crate::ecs::plugins::movement::error::{MoveOutcome, MovementError, TickOutcome};
use crate::ecs::plugins::movement::events::{AiEvent, MovementBroadcast, MovementOutbox};
use crate::ecs::plugins::movement::geometry::{
    cell_index, clamp_to_world, distance_2d, heading_between, heading_from_direction, heading_to_degrees,
    hypot, point_along,
};
use crate::ecs::plugins::movement::record::{Movement, MovementRecord, NO_PATH_INDEX};
use crate::ecs::plugins::scheduler::{DeferredAction, GameTimeController};
use crate::ecs::plugins::zone::ZoneMap;

/// Mutable view of the components a move reads and writes.
pub struct ActorMut<'a> {
    pub actor: &'a mut Actor,
    pub desire: &'a mut Desire,
    pub movement: &'a mut Movement,
}

impl<'a> ActorMut<'a> {
    pub fn new(actor: &'a mut Actor, desire: &'a mut Desire, movement: &'a mut Movement) -> Self {
        Self { actor, desire, movement }
    }

    /// Where the actor is heading, or where it stands when idle.
    pub fn destination(&self) -> IVec3 {
        self.movement.destination_or(self.actor.position)
    }

    pub fn is_moving(&self) -> bool {
        self.movement.is_moving()
    }
}

pub struct MovementEngine<'a> {
    config: &'a MovementConfig,
    grid_origin: IVec2,
    geodata: &'a dyn PathPlanner,
    zones: &'a ZoneMap,
    clock: &'a mut GameTimeController,
    outbox: &'a mut MovementOutbox,
}

impl<'a> MovementEngine<'a> {
    pub fn new(
        config: &'a MovementConfig,
        grid_origin: IVec2,
        geodata: &'a dyn PathPlanner,
        zones: &'a ZoneMap,
        clock: &'a mut GameTimeController,
        outbox: &'a mut MovementOutbox,
    ) -> Self {
        Self {
            config,
            grid_origin,
            geodata,
            zones,
            clock,
            outbox,
        }
    }

    pub fn clock(&mut self) -> &mut GameTimeController {
        &mut *self.clock
    }

    pub fn outbox(&mut self) -> &mut MovementOutbox {
        &mut *self.outbox
    }

    /// Start moving toward `target`, stopping `offset` units short of it.
    pub fn move_to_location(
        &mut self,
        a: &mut ActorMut<'_>,
        target: IVec3,
        offset: i32,
    ) -> Result<MoveOutcome, MovementError> {
        let cfg = self.config;
        let id = a.actor.id;
        let speed = a.actor.stats.speed;
        if speed <= 0.0 {
            return Err(self.fail(id, MovementError::NoSpeed));
        }

        let is_player = a.actor.kind.is_player();
        let current = a.actor.position;
        let mut target = clamp_to_world(target);
        let mut delta = target.as_dvec3() - current.as_dvec3();
        let mut distance = hypot(delta.x, delta.y);
        let vertical_only = a.actor.stats.can_fly && distance == 0.0 && delta.z != 0.0;

        if a.actor.in_water && distance > cfg.water_clamp_distance {
            let divider = cfg.water_clamp_distance / distance;
            target = current + (delta * divider).as_ivec3();
            delta = target.as_dvec3() - current.as_dvec3();
            distance = hypot(delta.x, delta.y);
        }

        let (cos, sin);
        if offset > 0 || distance < 1.0 {
            // Height difference already brings the actor that much closer.
            let offset = (offset - delta.z.abs() as i32).max(cfg.min_stop_offset);
            if distance < 1.0 || distance - offset as f64 <= 0.0 {
                self.outbox.notify_ai(id, AiEvent::Arrived);
                return Ok(MoveOutcome::ImmediateArrival);
            }
            cos = delta.x / distance;
            sin = delta.y / distance;
            // Land slightly inside the requested range so rounding cannot leave us outside it.
            distance -= (offset - cfg.min_stop_offset) as f64;
            (target.x, target.y) = point_along(current, cos, sin, distance);
        } else {
            cos = delta.x / distance;
            sin = delta.y / distance;
        }

        let original = target;
        let original_distance = distance;
        let target_cell = self.grid_cell(original.x, original.y);

        if let Some(record) = a.movement.record().filter(|record| record.is_path_following()) {
            if record.path_grid_cell == target_cell {
                return Ok(MoveOutcome::Unchanged);
            }
            let invalidated = record.without_path();
            a.movement.replace(invalidated);
        }

        let must_validate = !a.desire.is_attacking()
            && !a.actor.in_vehicle
            && !(is_player && distance > cfg.long_move_distance)
            && !(!is_player && delta.z.abs() > cfg.ledge_height)
            && !(i64::from(current.z) - i64::from(target.z) > i64::from(cfg.fall_height)
                && distance < cfg.fall_max_distance);
        if must_validate {
            let valid = self.geodata.valid_location(current, target, id);
            target.x = valid.x;
            target.y = valid.y;
            if !is_player {
                target.z = valid.z;
            }
            delta = target.as_dvec3() - current.as_dvec3();
            distance = leg_length(delta, vertical_only);
        }

        let mut path = None;
        let mut path_index = NO_PATH_INDEX;
        let mut precise_target = original.truncate();
        let mut disregard_geodata = false;
        let mut bearing = (cos, sin);

        if original_distance - distance > cfg.path_deviation {
            let mut found = self
                .geodata
                .find_path(current, original, id, true)
                .filter(|path| path.len() > 1);
            if found.is_none() && a.actor.kind.is_hostile() {
                if let Some((approximate, cell_target)) = self.search_approximate_path(current, original, id) {
                    precise_target = cell_target;
                    found = Some(approximate);
                }
            }

            match found {
                Some(waypoints) => {
                    target = waypoints[0];
                    delta = target.as_dvec3() - current.as_dvec3();
                    distance = leg_length(delta, vertical_only);
                    if distance > 0.0 {
                        bearing = (delta.x / distance, delta.y / distance);
                    }
                    path_index = 0;
                    path = Some(Arc::<[IVec3]>::from(waypoints));
                }
                None if is_player => {
                    debug!("Actor {} has no path to {:?}", id, original);
                    return Err(self.fail(id, MovementError::PathNotFound));
                }
                None => {
                    debug!("Actor {} has no path to {:?}, moving without geodata", id, original);
                    disregard_geodata = true;
                    target = original;
                    distance = original_distance;
                }
            }
        }

        if distance < 1.0 && !is_player {
            *a.desire = Desire::Idle;
            return Err(self.fail(id, MovementError::ZeroDistanceCancel));
        }

        let ticks_per_second = self.clock.ticks_per_second() as f64;
        let ticks_to_move = 1 + (ticks_per_second * distance / speed) as u64;
        a.actor.heading = heading_from_direction(bearing.0, bearing.1);

        let now = self.clock.game_ticks();
        let record = MovementRecord {
            path,
            path_index,
            path_grid_cell: target_cell,
            precise_target,
            disregard_geodata,
            ..MovementRecord::direct(current, target, now)
        };
        let path_following = record.is_path_following();
        let generation = a.movement.install(record);
        self.clock.register_moving(id);
        self.arm_watchdog(id, generation, ticks_to_move);
        self.outbox.broadcast(
            id,
            MovementBroadcast::MoveToLocation { origin: current, destination: target },
            true,
        );

        Ok(MoveOutcome::Started { ticks_to_move, path_following })
    }

    /// Advance the actor by the ticks elapsed since its last update.
    pub fn advance_tick(&mut self, a: &mut ActorMut<'_>) -> Result<TickOutcome, MovementError> {
        let Some(mut record) = a.movement.snapshot() else {
            return Ok(TickOutcome::Stationary);
        };
        let cfg = self.config;
        let id = a.actor.id;
        let now = self.clock.game_ticks();

        let last_update = match record.last_update_tick {
            Some(tick) => tick,
            None => {
                record.accurate_position = a.actor.position.truncate().as_dvec2();
                record.last_update_tick = Some(record.start_tick);
                record.start_tick
            }
        };
        if last_update >= now {
            a.movement.replace(record);
            return Ok(TickOutcome::StillMoving);
        }

        let position = a.actor.position;
        let speed = a.actor.stats.speed;
        let dx = record.destination.x as f64 - record.accurate_position.x;
        let dy = record.destination.y as f64 - record.accurate_position.y;
        let dz = record.destination.z as f64 - position.z as f64;

        if a.actor.kind.is_player() && hypot(dx, dy) > cfg.long_move_distance {
            let radians = heading_to_degrees(a.actor.heading).to_radians();
            let reach = cfg.probe_distance * (speed / 100.0);
            let (x, y) = point_along(position, radians.cos(), radians.sin(), reach);
            let probe = IVec3::new(x, y, position.z);
            if !self.geodata.can_move_to_target(position, probe, id) {
                debug!("Actor {} blocked at {:?} on a long move", id, position);
                self.abort(a);
                return Err(MovementError::ObstacleDetected);
            }
        }

        let horizontal_sq = dx * dx + dy * dy;
        let vertical_sq = dz * dz;
        // Close by but far apart in height: client and server geodata disagree, ignore z.
        let remaining = if horizontal_sq < cfg.height_tolerance_horizontal_sq
            && vertical_sq > cfg.height_tolerance_vertical_sq
        {
            horizontal_sq.sqrt()
        } else {
            (horizontal_sq + vertical_sq).sqrt()
        };
        let remaining = (remaining - a.actor.stats.collision_radius).max(cfg.min_remaining_distance);

        let fraction = self.distance_fraction(remaining, speed, now - last_update);
        let arrived = fraction > cfg.arrive_fraction;
        if arrived {
            a.actor.position = record.destination;
        } else {
            record.accurate_position += DVec2::new(dx, dy) * fraction;
            a.actor.position = IVec3::new(
                record.accurate_position.x as i32,
                record.accurate_position.y as i32,
                position.z + (dz * fraction + cfg.z_rounding_bias) as i32,
            );
        }

        record.last_update_tick = Some(now);
        self.zones.revalidate(a.actor);

        if now - record.last_broadcast_tick >= cfg.broadcast_interval_ticks && record.is_path_following() {
            record.last_broadcast_tick = now;
            self.outbox.broadcast(
                id,
                MovementBroadcast::MoveToLocation {
                    origin: a.actor.position,
                    destination: record.destination,
                },
                false,
            );
        }
        a.movement.replace(record);

        Ok(if arrived { TickOutcome::Arrived } else { TickOutcome::StillMoving })
    }

    /// Start the next leg of the current path. Returns `false` when the actor
    /// is not following a path or cannot move.
    pub fn advance_to_next_waypoint(&mut self, a: &mut ActorMut<'_>) -> bool {
        let Some(record) = a.movement.record() else {
            return false;
        };
        if !record.is_path_following() {
            return false;
        }
        let id = a.actor.id;
        let speed = a.actor.stats.speed;
        if speed <= 0.0 {
            a.movement.clear();
            self.clock.unregister_moving(id);
            return false;
        }

        let position = a.actor.position;
        let now = self.clock.game_ticks();
        let Some(next) = record.next_leg(position, now) else {
            return false;
        };
        let destination = next.destination;

        let distance = distance_2d(position, destination);
        if distance != 0.0 {
            a.actor.heading = heading_between(position, destination);
        }
        let ticks_to_move = (self.clock.ticks_per_second() as f64 * distance / speed) as u64;

        let generation = a.movement.install(next);
        self.clock.register_moving(id);
        self.arm_watchdog(id, generation, ticks_to_move);
        self.outbox.broadcast(
            id,
            MovementBroadcast::MoveToLocation { origin: position, destination },
            true,
        );
        true
    }

    /// Called once a leg is reached: continue along the path or finish the
    /// move. Returns whether the actor is still moving.
    pub fn complete_leg(&mut self, a: &mut ActorMut<'_>) -> bool {
        if self.advance_to_next_waypoint(a) {
            return true;
        }
        let location = a.actor.location();
        self.stop(a, location);
        self.outbox.notify_ai(a.actor.id, AiEvent::Arrived);
        false
    }

    /// Halt at `location`, which the server treats as authoritative.
    pub fn stop(&mut self, a: &mut ActorMut<'_>, location: Location) {
        let id = a.actor.id;
        a.movement.clear();
        self.clock.unregister_moving(id);
        a.actor.position = location.position;
        a.actor.heading = location.heading;
        if a.actor.kind.is_player() {
            self.zones.revalidate(a.actor);
        }
        self.outbox.broadcast(id, MovementBroadcast::StopMove { location }, false);
    }

    fn abort(&mut self, a: &mut ActorMut<'_>) {
        let id = a.actor.id;
        a.movement.clear();
        self.clock.unregister_moving(id);
        *a.desire = Desire::Idle;
        self.outbox.notify_ai(id, AiEvent::Stopped);
        self.outbox.broadcast(
            id,
            MovementBroadcast::StopMove { location: a.actor.location() },
            true,
        );
    }

    fn fail(&mut self, actor: ActorId, error: MovementError) -> MovementError {
        self.outbox.notify_ai(actor, AiEvent::ActionFailed(error));
        error
    }

    fn arm_watchdog(&mut self, actor: ActorId, generation: u64, ticks_to_move: u64) {
        let travel_ms = ticks_to_move * self.clock.millis_per_tick() as u64;
        if travel_ms > self.config.watchdog_threshold_ms {
            self.clock.schedule_once(
                DeferredAction::RevalidateArrival { actor, generation },
                self.config.watchdog_delay_ms,
            );
        }
    }

    fn grid_cell(&self, x: i32, y: i32) -> IVec2 {
        let size = self.config.grid_cell_size;
        IVec2::new(
            cell_index(x, self.grid_origin.x, size),
            cell_index(y, self.grid_origin.y, size),
        )
    }

    fn distance_fraction(&self, remaining: f64, speed: f64, elapsed_ticks: u64) -> f64 {
        if remaining <= 1.0 {
            return f64::MAX;
        }
        let travelled = speed * elapsed_ticks as f64 / self.clock.ticks_per_second() as f64;
        travelled / remaining
    }

    /// Probe a grid of points around both endpoints for the reachable one
    /// closest to `original`. Returns the path and the point it leads to.
    fn search_approximate_path(
        &self,
        current: IVec3,
        original: IVec3,
        actor: ActorId,
    ) -> Option<(Vec<IVec3>, IVec2)> {
        let step = self.config.approximate_search_step.max(1) as usize;
        let min = current.truncate().min(original.truncate());
        let max = current.truncate().max(original.truncate());
        let span = max - min;
        let margin = IVec2::splat(span.x.max(span.y).min(self.config.approximate_search_margin));
        let (min, max) = (min - margin, max + margin);

        let mut best = None;
        let mut shortest = f64::MAX;
        for sx in (min.x..max.x).step_by(step) {
            for sy in (min.y..max.y).step_by(step) {
                let distance = hypot((sx - original.x) as f64, (sy - original.y) as f64);
                if distance >= shortest {
                    continue;
                }
                let candidate = IVec3::new(sx, sy, original.z);
                if let Some(path) = self
                    .geodata
                    .find_path(current, candidate, actor, false)
                    .filter(|path| path.len() > 1)
                {
                    shortest = distance;
                    best = Some((path, IVec2::new(sx, sy)));
                }
            }
        }
        best
    }
}

/// Horizontal length of a leg; vertical-only moves measure the squared climb.
fn leg_length(delta: DVec3, vertical_only: bool) -> f64 {
    if vertical_only {
        delta.z.powi(2)
    } else {
        hypot(delta.x, delta.y)
    }
}
