use bevy::prelude::*;
use std::collections::BTreeSet;

use crate::ecs::core::ActorId;

/// Highest supported tick rate; one tick never lasts less than a millisecond.
pub const MAX_TICK_RATE: u32 = 1000;

/// Work deferred to a later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Ask the AI to re-check progress of a long move. Carries the move
    /// generation it was armed for so a superseded move can be detected.
    RevalidateArrival { actor: ActorId, generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub due_tick: u64,
    pub action: DeferredAction,
}

/// The simulation clock: tick counter, the set of actors in motion and
/// one-shot deferred tasks.
#[derive(Resource, Debug)]
pub struct GameTimeController {
    game_ticks: u64,
    ticks_per_second: u32,
    millis_per_tick: u32,
    moving: BTreeSet<ActorId>,
    tasks: Vec<ScheduledTask>,
}

impl GameTimeController {
    pub fn new(ticks_per_second: u32) -> Self {
        let ticks_per_second = ticks_per_second.clamp(1, MAX_TICK_RATE);
        Self {
            game_ticks: 0,
            ticks_per_second,
            millis_per_tick: (1000 / ticks_per_second).max(1),
            moving: BTreeSet::new(),
            tasks: Vec::new(),
        }
    }

    pub fn game_ticks(&self) -> u64 {
        self.game_ticks
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    pub fn millis_per_tick(&self) -> u32 {
        self.millis_per_tick
    }

    pub fn advance(&mut self) -> u64 {
        self.game_ticks += 1;
        self.game_ticks
    }

    pub fn register_moving(&mut self, actor: ActorId) {
        self.moving.insert(actor);
    }

    pub fn unregister_moving(&mut self, actor: ActorId) {
        self.moving.remove(&actor);
    }

    pub fn is_registered(&self, actor: ActorId) -> bool {
        self.moving.contains(&actor)
    }

    /// Snapshot of the moving set, in id order.
    pub fn moving_actors(&self) -> Vec<ActorId> {
        self.moving.iter().copied().collect()
    }

    /// Run `action` once, `delay_ms` from now, rounded up to whole ticks.
    pub fn schedule_once(&mut self, action: DeferredAction, delay_ms: u32) -> u64 {
        let delay_ticks = delay_ms.div_ceil(self.millis_per_tick.max(1)).max(1) as u64;
        let due_tick = self.game_ticks + delay_ticks;
        self.tasks.push(ScheduledTask { due_tick, action });
        due_tick
    }

    pub fn pending_tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    /// Remove and return every task due at or before the current tick.
    pub fn drain_due(&mut self) -> Vec<ScheduledTask> {
        let now = self.game_ticks;
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .tasks
            .drain(..)
            .partition(|task| task.due_tick <= now);
        self.tasks = pending;
        due.sort_by_key(|task| task.due_tick);
        due
    }
}

impl Default for GameTimeController {
    fn default() -> Self {
        Self::new(10)
    }
}
