use glam::{IVec2, IVec3};
use pathfinding::prelude::astar;
use std::collections::HashSet;

use crate::ecs::core::{ActorId, GeodataConfig, WorldConfig};
use crate::ecs::plugins::geodata::planner::PathPlanner;
use crate::ecs::plugins::movement::geometry::cell_index;

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

const NEIGHBOURS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(1, 1),
    IVec2::new(1, -1),
    IVec2::new(-1, 1),
    IVec2::new(-1, -1),
];

/// Flat grid geodata: every cell is walkable unless blocked.
#[derive(Debug, Clone)]
pub struct GridGeodata {
    origin: IVec2,
    cell_size: i32,
    search_margin: i32,
    blocked: HashSet<IVec2>,
}

impl GridGeodata {
    pub fn new(origin: IVec2, cell_size: i32) -> Self {
        Self {
            origin,
            cell_size: cell_size.max(1),
            search_margin: 64,
            blocked: HashSet::new(),
        }
    }

    pub fn from_config(world: &WorldConfig, config: &GeodataConfig) -> Self {
        let mut grid = Self::new(world.origin, config.cell_size)
            .with_search_margin(config.search_margin_cells);
        for rect in &config.obstacles {
            grid.block_rect(rect.min, rect.max);
        }
        grid
    }

    pub fn with_search_margin(mut self, cells: i32) -> Self {
        self.search_margin = cells.max(1);
        self
    }

    /// Block every cell touched by the world-space rectangle.
    pub fn block_rect(&mut self, min: IVec2, max: IVec2) {
        let from = self.cell_of(min.x.min(max.x), min.y.min(max.y));
        let to = self.cell_of(min.x.max(max.x), min.y.max(max.y));
        for cx in from.x..=to.x {
            for cy in from.y..=to.y {
                self.blocked.insert(IVec2::new(cx, cy));
            }
        }
    }

    pub fn cell_of(&self, x: i32, y: i32) -> IVec2 {
        IVec2::new(
            cell_index(x, self.origin.x, self.cell_size),
            cell_index(y, self.origin.y, self.cell_size),
        )
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        !self.blocked.contains(&self.cell_of(x, y))
    }

    fn cell_walkable(&self, cell: IVec2) -> bool {
        !self.blocked.contains(&cell)
    }

    fn cell_center(&self, cell: IVec2) -> IVec2 {
        self.origin + cell * self.cell_size + IVec2::splat(self.cell_size / 2)
    }

    /// Points along `from -> to`, half a cell apart, ending exactly at `to`.
    fn samples(&self, from: IVec3, to: IVec3) -> impl Iterator<Item = IVec3> {
        let delta = (to - from).as_dvec3();
        let length = delta.x.hypot(delta.y);
        let step = (self.cell_size as f64 / 2.0).max(1.0);
        let count = ((length / step).ceil() as i64).max(1);
        let start = from.as_dvec3();
        (1..=count).map(move |i| {
            if i == count {
                to
            } else {
                (start + delta * (i as f64 / count as f64)).as_ivec3()
            }
        })
    }

    fn successors(&self, cell: IVec2, min: IVec2, max: IVec2) -> Vec<(IVec2, u32)> {
        NEIGHBOURS
            .iter()
            .filter_map(|&offset| {
                let next = cell + offset;
                if next.cmplt(min).any() || next.cmpgt(max).any() || !self.cell_walkable(next) {
                    return None;
                }
                if offset.x != 0 && offset.y != 0 {
                    // No corner cutting.
                    let side_a = IVec2::new(cell.x + offset.x, cell.y);
                    let side_b = IVec2::new(cell.x, cell.y + offset.y);
                    if !self.cell_walkable(side_a) || !self.cell_walkable(side_b) {
                        return None;
                    }
                    return Some((next, DIAGONAL_COST));
                }
                Some((next, STRAIGHT_COST))
            })
            .collect()
    }

    fn nearest_walkable_neighbour(&self, cell: IVec2) -> Option<IVec2> {
        NEIGHBOURS
            .iter()
            .map(|offset| cell + *offset)
            .find(|candidate| self.cell_walkable(*candidate))
    }
}

fn octile(a: IVec2, b: IVec2) -> u32 {
    let d = (a - b).abs();
    let (long, short) = (d.x.max(d.y) as u32, d.x.min(d.y) as u32);
    STRAIGHT_COST * long + (DIAGONAL_COST - STRAIGHT_COST) * short
}

impl PathPlanner for GridGeodata {
    fn valid_location(&self, from: IVec3, to: IVec3, _actor: ActorId) -> IVec3 {
        let start_cell = self.cell_of(from.x, from.y);
        let mut last = from;
        for point in self.samples(from, to) {
            let cell = self.cell_of(point.x, point.y);
            if cell != start_cell && !self.cell_walkable(cell) {
                return last;
            }
            last = point;
        }
        to
    }

    fn can_move_to_target(&self, from: IVec3, to: IVec3, _actor: ActorId) -> bool {
        let start_cell = self.cell_of(from.x, from.y);
        self.samples(from, to).all(|point| {
            let cell = self.cell_of(point.x, point.y);
            cell == start_cell || self.cell_walkable(cell)
        })
    }

    fn find_path(&self, from: IVec3, to: IVec3, _actor: ActorId, strict: bool) -> Option<Vec<IVec3>> {
        let start = self.cell_of(from.x, from.y);
        let requested_goal = self.cell_of(to.x, to.y);
        let goal = if self.cell_walkable(requested_goal) {
            requested_goal
        } else if strict {
            return None;
        } else {
            self.nearest_walkable_neighbour(requested_goal)?
        };

        let min = start.min(goal) - IVec2::splat(self.search_margin);
        let max = start.max(goal) + IVec2::splat(self.search_margin);
        let (cells, _cost) = astar(
            &start,
            |cell| self.successors(*cell, min, max),
            |cell| octile(*cell, goal),
            |cell| *cell == goal,
        )?;

        // Keep only the cells where the direction changes, then the goal.
        let mut waypoints: Vec<IVec3> = cells
            .windows(3)
            .filter(|w| w[1] - w[0] != w[2] - w[1])
            .map(|w| {
                let center = self.cell_center(w[1]);
                IVec3::new(center.x, center.y, from.z)
            })
            .collect();
        let end = if goal == requested_goal {
            to
        } else {
            let center = self.cell_center(goal);
            IVec3::new(center.x, center.y, to.z)
        };
        waypoints.push(end);
        Some(waypoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTOR: ActorId = ActorId(1);

    /// A wall along x = 160..176 from y = -400 to y = 400.
    fn walled() -> GridGeodata {
        let mut grid = GridGeodata::new(IVec2::ZERO, 16).with_search_margin(40);
        grid.block_rect(IVec2::new(160, -400), IVec2::new(175, 400));
        grid
    }

    #[test]
    fn cells_floor_negative_coordinates() {
        let grid = GridGeodata::new(IVec2::ZERO, 16);
        assert_eq!(grid.cell_of(15, 16), IVec2::new(0, 1));
        assert_eq!(grid.cell_of(-1, -16), IVec2::new(-1, -1));
        assert_eq!(grid.cell_of(-17, 0), IVec2::new(-2, 0));
        assert_eq!(grid.cell_of(i32::MAX, i32::MIN), IVec2::new(134_217_727, -134_217_728));
    }

    #[test]
    fn open_ground_is_fully_reachable() {
        let grid = GridGeodata::new(IVec2::ZERO, 16);
        let from = IVec3::new(0, 0, 0);
        let to = IVec3::new(900, 300, 0);
        assert_eq!(grid.valid_location(from, to, ACTOR), to);
        assert!(grid.can_move_to_target(from, to, ACTOR));
    }

    #[test]
    fn valid_location_stops_in_front_of_a_wall() {
        let grid = walled();
        let from = IVec3::new(0, 0, 0);
        let stop = grid.valid_location(from, IVec3::new(400, 0, 0), ACTOR);
        assert!(stop.x < 160 && stop.x > 100, "stopped at {stop:?}");
        assert!(grid.is_walkable(stop.x, stop.y));
        assert!(!grid.can_move_to_target(from, IVec3::new(400, 0, 0), ACTOR));
    }

    #[test]
    fn path_goes_around_the_wall() {
        let grid = walled();
        let to = IVec3::new(400, 0, 0);
        let path = grid.find_path(IVec3::ZERO, to, ACTOR, true).unwrap();

        assert!(path.len() >= 2);
        assert_eq!(*path.last().unwrap(), to);
        for point in &path {
            assert!(grid.is_walkable(point.x, point.y));
        }
        let mut previous = IVec3::ZERO;
        for point in &path {
            assert!(grid.can_move_to_target(previous, *point, ACTOR), "{previous:?} -> {point:?}");
            previous = *point;
        }
    }

    #[test]
    fn strict_search_rejects_blocked_goal() {
        let grid = walled();
        let inside_wall = IVec3::new(165, 0, 0);
        assert!(grid.find_path(IVec3::ZERO, inside_wall, ACTOR, true).is_none());

        let relaxed = grid.find_path(IVec3::ZERO, inside_wall, ACTOR, false).unwrap();
        let end = relaxed.last().unwrap();
        assert!(grid.is_walkable(end.x, end.y));
    }

    #[test]
    fn unreachable_goal_terminates() {
        let mut grid = GridGeodata::new(IVec2::ZERO, 16).with_search_margin(4);
        // Box the goal in completely.
        grid.block_rect(IVec2::new(300, -100), IVec2::new(500, -90));
        grid.block_rect(IVec2::new(300, 90), IVec2::new(500, 100));
        grid.block_rect(IVec2::new(300, -100), IVec2::new(310, 100));
        grid.block_rect(IVec2::new(490, -100), IVec2::new(500, 100));
        assert!(grid.find_path(IVec3::ZERO, IVec3::new(400, 0, 0), ACTOR, true).is_none());
    }
}
