//! Configuration surfaces for every pipeline stage.
//!
//! All settings are plain structs constructed by the caller (or loaded from
//! JSON) and validated with clamping: out-of-range values are corrected,
//! never rejected.

use crate::constants::*;
use crate::room::RoomType;
use serde::{Deserialize, Serialize};

/// Chance weights for special room types, each clamped to 0..=1. Rooms not
/// drawn as special fall back to a size-based type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoomTypeChances {
    pub treasure: f32,
    pub guard: f32,
    pub laboratory: f32,
    pub boss: f32,
}

impl Default for RoomTypeChances {
    fn default() -> Self {
        Self {
            treasure: 0.08,
            guard: 0.10,
            laboratory: 0.06,
            boss: 0.04,
        }
    }
}

impl RoomTypeChances {
    fn clamped(mut self) -> Self {
        self.treasure = self.treasure.clamp(0.0, 1.0);
        self.guard = self.guard.clamp(0.0, 1.0);
        self.laboratory = self.laboratory.clamp(0.0, 1.0);
        self.boss = self.boss.clamp(0.0, 1.0);
        self
    }
}

/// Settings for the partition and connection stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub width: i32,
    pub height: i32,
    pub seed: u64,
    pub min_room_size: i32,
    pub max_room_size: i32,
    pub corridor_width: i32,
    pub room_type_chances: RoomTypeChances,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: 0,
            min_room_size: DEFAULT_MIN_ROOM_SIZE,
            max_room_size: DEFAULT_MAX_ROOM_SIZE,
            corridor_width: DEFAULT_CORRIDOR_WIDTH,
            room_type_chances: RoomTypeChances::default(),
        }
    }
}

impl GenerationSettings {
    /// Clamp every field into its valid range. Invalid values are corrected,
    /// never rejected.
    pub fn validated(mut self) -> Self {
        self.width = self.width.max(MIN_GRID_SIZE);
        self.height = self.height.max(MIN_GRID_SIZE);
        self.min_room_size = self.min_room_size.max(MIN_ROOM_SIZE_FLOOR);
        self.max_room_size = self.max_room_size.max(self.min_room_size + 2);
        self.corridor_width = self.corridor_width.max(1);
        self.room_type_chances = self.room_type_chances.clamped();
        self
    }
}

/// Compass edge of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassEdge {
    North,
    South,
    East,
    West,
}

/// Criteria for scoring candidate starting rooms.
///
/// `min_connections`/`max_connections` bound the room's graph degree: the
/// number of distinct rooms reachable through its doors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartingPointCriteria {
    pub prefer_map_edge: bool,
    /// 0..=100; scales the edge-proximity score contribution.
    pub edge_preference_strength: f32,
    pub create_exterior_entrance: bool,
    pub entrance_width: i32,
    pub allow_corners: bool,
    pub min_connections: usize,
    pub max_connections: usize,
    pub preferred_edge: Option<CompassEdge>,
    pub min_room_area: i32,
}

impl Default for StartingPointCriteria {
    fn default() -> Self {
        Self {
            prefer_map_edge: true,
            edge_preference_strength: 50.0,
            create_exterior_entrance: true,
            entrance_width: 1,
            allow_corners: false,
            min_connections: 1,
            max_connections: 4,
            preferred_edge: None,
            min_room_area: 16,
        }
    }
}

impl StartingPointCriteria {
    pub fn validated(mut self) -> Self {
        self.edge_preference_strength = self.edge_preference_strength.clamp(0.0, 100.0);
        self.entrance_width = self.entrance_width.max(1);
        if self.max_connections < self.min_connections {
            self.max_connections = self.min_connections;
        }
        self.min_room_area = self.min_room_area.max(1);
        self
    }
}

/// What an entry places: a pickup or an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    Item,
    Enemy,
}

/// A single item spawn rule. Read-only configuration during population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpawnRule {
    pub id: String,
    pub weight: f32,
    pub max_per_room: u32,
    pub allowed_room_types: Vec<RoomType>,
    /// Inclusive bounds in room-graph hops from the starting room.
    pub min_distance_from_start: u32,
    pub max_distance_from_start: u32,
}

/// A single enemy spawn rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpawnRule {
    pub id: String,
    pub weight: f32,
    pub max_per_room: u32,
    pub allowed_room_types: Vec<RoomType>,
    pub min_distance_from_start: u32,
    pub max_distance_from_start: u32,
    /// Extra pairwise spacing against other enemy spawns.
    pub min_distance_from_other_enemies: i32,
    /// Boss enemies are capped at one per room regardless of `max_per_room`.
    pub is_boss: bool,
}

/// Density scaling by room-graph distance from the starting room: rooms at
/// hop `i` use `curve[min(i, len-1)]`; an empty curve means no scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceCurve {
    pub curve: Vec<f32>,
}

impl Default for DistanceCurve {
    fn default() -> Self {
        Self {
            curve: vec![0.5, 0.8, 1.0, 1.2, 1.5],
        }
    }
}

impl DistanceCurve {
    pub fn sample(&self, hops: u32) -> f32 {
        match self.curve.as_slice() {
            [] => 1.0,
            c => c[(hops as usize).min(c.len() - 1)],
        }
    }

    fn clamped(mut self) -> Self {
        for v in &mut self.curve {
            *v = v.max(0.0);
        }
        self
    }
}

/// Settings for the entity population stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnSettings {
    pub max_spawns_per_room: u32,
    pub spawn_density: f32,
    pub min_distance_between_spawns: i32,
    pub small_room_multiplier: f32,
    pub medium_room_multiplier: f32,
    pub large_room_multiplier: f32,
    pub density_by_distance: DistanceCurve,
    /// Bias on enemy rule weights by distance: each weight is raised to the
    /// sampled power, so values above 1.0 favor heavier rules. 1.0 is
    /// neutral.
    pub difficulty_by_distance: DistanceCurve,
    pub allow_spawns_in_starting_room: bool,
    pub items: Vec<ItemSpawnRule>,
    pub enemies: Vec<EnemySpawnRule>,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            max_spawns_per_room: DEFAULT_MAX_SPAWNS_PER_ROOM,
            spawn_density: 1.0,
            min_distance_between_spawns: DEFAULT_MIN_DISTANCE_BETWEEN_SPAWNS,
            small_room_multiplier: SMALL_ROOM_MULTIPLIER,
            medium_room_multiplier: MEDIUM_ROOM_MULTIPLIER,
            large_room_multiplier: LARGE_ROOM_MULTIPLIER,
            density_by_distance: DistanceCurve::default(),
            difficulty_by_distance: DistanceCurve { curve: vec![1.0] },
            allow_spawns_in_starting_room: false,
            items: Vec::new(),
            enemies: Vec::new(),
        }
    }
}

impl SpawnSettings {
    pub fn validated(mut self) -> Self {
        self.spawn_density = self.spawn_density.max(0.0);
        self.min_distance_between_spawns = self.min_distance_between_spawns.max(0);
        self.small_room_multiplier = self.small_room_multiplier.max(0.0);
        self.medium_room_multiplier = self.medium_room_multiplier.max(0.0);
        self.large_room_multiplier = self.large_room_multiplier.max(0.0);
        self.density_by_distance = self.density_by_distance.clamped();
        self.difficulty_by_distance = self.difficulty_by_distance.clamped();
        for rule in &mut self.items {
            rule.weight = rule.weight.max(0.0);
        }
        for rule in &mut self.enemies {
            rule.weight = rule.weight.max(0.0);
            rule.min_distance_from_other_enemies = rule.min_distance_from_other_enemies.max(0);
            if rule.is_boss {
                rule.max_per_room = rule.max_per_room.min(1);
            }
        }
        self
    }
}
