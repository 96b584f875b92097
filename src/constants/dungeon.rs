//! Dungeon generation constants.

/// Minimum grid edge length accepted by settings validation
pub const MIN_GRID_SIZE: i32 = 20;
/// Minimum room size accepted by settings validation
pub const MIN_ROOM_SIZE_FLOOR: i32 = 4;
/// Margin around rooms within their BSP leaf (reserved for walls)
pub const ROOM_MARGIN: i32 = 1;
/// Default dungeon width
pub const DEFAULT_WIDTH: i32 = 100;
/// Default dungeon height
pub const DEFAULT_HEIGHT: i32 = 100;
/// Default minimum room size
pub const DEFAULT_MIN_ROOM_SIZE: i32 = 8;
/// Default maximum room size
pub const DEFAULT_MAX_ROOM_SIZE: i32 = 20;
/// Default corridor width in tiles
pub const DEFAULT_CORRIDOR_WIDTH: i32 = 1;
/// Chance per extra depth level that a splittable node stops early
pub const SPLIT_STOP_CHANCE_PER_DEPTH: f64 = 0.05;
/// Depth below which a node never stops splitting early
pub const SPLIT_MIN_DEPTH: u32 = 3;

/// Area at or above which a room counts as medium
pub const MEDIUM_ROOM_AREA: i32 = 48;
/// Area at or above which a room counts as large
pub const LARGE_ROOM_AREA: i32 = 120;
