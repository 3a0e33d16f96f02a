use serde::Deserialize;

/// Move targets are clamped to this magnitude on every axis, keeping all
/// later integer coordinate math far from overflow.
pub const WORLD_COORDINATE_LIMIT: i32 = 1 << 20;
/// Moves longer than this while in water are shortened to it.
pub const WATER_CLAMP_DISTANCE: f64 = 700.0;
/// Floor applied to a stop offset once height difference is compensated.
pub const MIN_STOP_OFFSET: i32 = 5;
/// Player moves beyond this skip validation and get an obstacle probe each tick.
pub const LONG_MOVE_DISTANCE: f64 = 3000.0;
/// Non-players climbing or dropping more than this skip validation.
pub const LEDGE_HEIGHT: f64 = 100.0;
/// A drop larger than this over less than [`FALL_MAX_DISTANCE`] is a deliberate fall.
pub const FALL_HEIGHT: i32 = 300;
pub const FALL_MAX_DISTANCE: f64 = 300.0;
/// Validated distance may differ from the requested one by this much before
/// a path is searched.
pub const PATH_DEVIATION: f64 = 30.0;
pub const APPROXIMATE_SEARCH_STEP: i32 = 500;
pub const APPROXIMATE_SEARCH_MARGIN: i32 = 500;
pub const GRID_CELL_SIZE: i32 = 16;
/// Covering more than this fraction of the remaining distance in one tick
/// snaps the actor onto its destination.
pub const ARRIVE_FRACTION: f64 = 1.79;
pub const Z_ROUNDING_BIAS: f64 = 0.895;
pub const BROADCAST_INTERVAL_TICKS: u64 = 3;
pub const WATCHDOG_THRESHOLD_MS: u64 = 3000;
pub const WATCHDOG_DELAY_MS: u32 = 2000;
/// Below this squared horizontal distance a squared height error above
/// [`HEIGHT_TOLERANCE_VERTICAL_SQ`] is ignored.
pub const HEIGHT_TOLERANCE_HORIZONTAL_SQ: f64 = 10_000.0;
pub const HEIGHT_TOLERANCE_VERTICAL_SQ: f64 = 2_500.0;
pub const MIN_REMAINING_DISTANCE: f64 = 0.00001;
/// Obstacle probe length at speed 100; scales linearly with speed.
pub const PROBE_DISTANCE: f64 = 10.0;

/// Tunable movement thresholds. Defaults match the client's expectations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub water_clamp_distance: f64,
    pub min_stop_offset: i32,
    pub long_move_distance: f64,
    pub ledge_height: f64,
    pub fall_height: i32,
    pub fall_max_distance: f64,
    pub path_deviation: f64,
    pub approximate_search_step: i32,
    pub approximate_search_margin: i32,
    pub grid_cell_size: i32,
    pub arrive_fraction: f64,
    pub z_rounding_bias: f64,
    pub broadcast_interval_ticks: u64,
    pub watchdog_threshold_ms: u64,
    pub watchdog_delay_ms: u32,
    pub height_tolerance_horizontal_sq: f64,
    pub height_tolerance_vertical_sq: f64,
    pub min_remaining_distance: f64,
    pub probe_distance: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            water_clamp_distance: WATER_CLAMP_DISTANCE,
            min_stop_offset: MIN_STOP_OFFSET,
            long_move_distance: LONG_MOVE_DISTANCE,
            ledge_height: LEDGE_HEIGHT,
            fall_height: FALL_HEIGHT,
            fall_max_distance: FALL_MAX_DISTANCE,
            path_deviation: PATH_DEVIATION,
            approximate_search_step: APPROXIMATE_SEARCH_STEP,
            approximate_search_margin: APPROXIMATE_SEARCH_MARGIN,
            grid_cell_size: GRID_CELL_SIZE,
            arrive_fraction: ARRIVE_FRACTION,
            z_rounding_bias: Z_ROUNDING_BIAS,
            broadcast_interval_ticks: BROADCAST_INTERVAL_TICKS,
            watchdog_threshold_ms: WATCHDOG_THRESHOLD_MS,
            watchdog_delay_ms: WATCHDOG_DELAY_MS,
            height_tolerance_horizontal_sq: HEIGHT_TOLERANCE_HORIZONTAL_SQ,
            height_tolerance_vertical_sq: HEIGHT_TOLERANCE_VERTICAL_SQ,
            min_remaining_distance: MIN_REMAINING_DISTANCE,
            probe_distance: PROBE_DISTANCE,
        }
    }
}
