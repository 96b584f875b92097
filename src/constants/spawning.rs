//! Entity population constants.

/// Hard cap on rejection-sampling attempts per spawn placement
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 16;
/// Default maximum spawns per room before size/distance scaling
pub const DEFAULT_MAX_SPAWNS_PER_ROOM: u32 = 4;
/// Default minimum tile distance between any two spawns in a room
pub const DEFAULT_MIN_DISTANCE_BETWEEN_SPAWNS: i32 = 2;
/// Default spawn budget multiplier for small rooms
pub const SMALL_ROOM_MULTIPLIER: f32 = 0.5;
/// Default spawn budget multiplier for medium rooms
pub const MEDIUM_ROOM_MULTIPLIER: f32 = 1.0;
/// Default spawn budget multiplier for large rooms
pub const LARGE_ROOM_MULTIPLIER: f32 = 1.5;
