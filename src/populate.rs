//! Rule-driven entity population: weighted spawn selection per room with
//! density, spacing, and distance-from-start constraints.

use crate::constants::MAX_PLACEMENT_ATTEMPTS;
use crate::error::GenerationError;
use crate::geometry::GridPosition;
use crate::grid::GridModel;
use crate::room::{Room, SizeClass};
use crate::settings::{SpawnKind, SpawnSettings};
use crate::tile::TileType;
use rand::Rng;
use std::collections::HashMap;

/// One placed entity.
#[derive(Debug, Clone)]
pub struct SpawnPoint {
    pub position: GridPosition,
    pub entity_id: String,
    pub kind: SpawnKind,
}

/// Aggregate counts for one population pass. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnReport {
    pub items: usize,
    pub enemies: usize,
}

/// A spawn rule eligible for the current room, flattened over both rule
/// kinds so one weighted draw covers items and enemies.
struct Candidate<'a> {
    id: &'a str,
    kind: SpawnKind,
    weight: f32,
    enemy_spacing: i32,
    is_boss: bool,
}

pub struct EntityPopulator;

impl EntityPopulator {
    /// Place spawns in every eligible room. `distances` maps each room to
    /// its hop count from the starting room (from
    /// `GridModel::room_distances`).
    pub fn populate(
        model: &GridModel,
        settings: &SpawnSettings,
        distances: &[Option<u32>],
        rng: &mut impl Rng,
    ) -> Result<(Vec<SpawnPoint>, SpawnReport), GenerationError> {
        let Some(starting_room) = model.starting_room else {
            return Err(GenerationError::StageNotReady {
                stage: "EntityPopulator",
                requirement: "a selected starting room",
            });
        };

        let mut spawns: Vec<SpawnPoint> = Vec::new();
        let mut enemy_positions: Vec<GridPosition> = Vec::new();

        for room in &model.rooms {
            if room.id == starting_room && !settings.allow_spawns_in_starting_room {
                continue;
            }
            let Some(hops) = distances.get(room.id).copied().flatten() else {
                continue;
            };
            let budget = Self::room_budget(room, hops, settings);
            Self::populate_room(
                model,
                room,
                hops,
                budget,
                settings,
                &mut spawns,
                &mut enemy_positions,
                rng,
            );
        }

        let report = SpawnReport {
            items: spawns.iter().filter(|s| s.kind == SpawnKind::Item).count(),
            enemies: spawns.iter().filter(|s| s.kind == SpawnKind::Enemy).count(),
        };
        log::info!(
            "populated {} rooms: {} items, {} enemies",
            model.rooms.len(),
            report.items,
            report.enemies
        );
        Ok((spawns, report))
    }

    /// Effective spawn budget: the per-room cap scaled by density, room
    /// size class, and distance from the start.
    fn room_budget(room: &Room, hops: u32, settings: &SpawnSettings) -> u32 {
        let size_mult = match room.size_class() {
            SizeClass::Small => settings.small_room_multiplier,
            SizeClass::Medium => settings.medium_room_multiplier,
            SizeClass::Large => settings.large_room_multiplier,
        };
        let scaled = settings.max_spawns_per_room as f32
            * settings.spawn_density
            * size_mult
            * settings.density_by_distance.sample(hops);
        scaled.floor() as u32
    }

    #[allow(clippy::too_many_arguments)]
    fn populate_room(
        model: &GridModel,
        room: &Room,
        hops: u32,
        budget: u32,
        settings: &SpawnSettings,
        spawns: &mut Vec<SpawnPoint>,
        enemy_positions: &mut Vec<GridPosition>,
        rng: &mut impl Rng,
    ) {
        let mut room_positions: Vec<GridPosition> = Vec::new();
        let mut per_id: HashMap<String, u32> = HashMap::new();
        let mut boss_placed = false;

        for _ in 0..budget {
            let candidates = Self::eligible(room, hops, settings, &per_id, boss_placed);
            let Some(pick) = Self::weighted_draw(&candidates, rng) else {
                break;
            };
            let Some(pos) = Self::sample_position(
                model,
                room,
                settings.min_distance_between_spawns,
                pick.enemy_spacing,
                &room_positions,
                enemy_positions,
                pick.kind,
                rng,
            ) else {
                // Retries exhausted: skip this attempt, never fatal.
                log::debug!("spawn placement exhausted in room {}", room.id);
                continue;
            };

            room_positions.push(pos);
            if pick.kind == SpawnKind::Enemy {
                enemy_positions.push(pos);
            }
            if pick.is_boss {
                boss_placed = true;
            }
            *per_id.entry(pick.id.to_string()).or_insert(0) += 1;
            spawns.push(SpawnPoint {
                position: pos,
                entity_id: pick.id.to_string(),
                kind: pick.kind,
            });
        }
    }

    /// Rules allowed in this room at this distance, with per-room caps
    /// still open. An empty allow-list permits every room type. Enemy
    /// weights are raised to the difficulty sampled for this distance, so
    /// farther rooms bias toward heavier rules.
    fn eligible<'a>(
        room: &Room,
        hops: u32,
        settings: &'a SpawnSettings,
        per_id: &HashMap<String, u32>,
        boss_placed: bool,
    ) -> Vec<Candidate<'a>> {
        let difficulty = settings.difficulty_by_distance.sample(hops);
        let mut out = Vec::new();
        for rule in &settings.items {
            let placed = per_id.get(&rule.id).copied().unwrap_or(0);
            if placed < rule.max_per_room
                && (rule.allowed_room_types.is_empty()
                    || rule.allowed_room_types.contains(&room.room_type))
                && hops >= rule.min_distance_from_start
                && hops <= rule.max_distance_from_start
            {
                out.push(Candidate {
                    id: &rule.id,
                    kind: SpawnKind::Item,
                    weight: rule.weight,
                    enemy_spacing: 0,
                    is_boss: false,
                });
            }
        }
        for rule in &settings.enemies {
            let placed = per_id.get(&rule.id).copied().unwrap_or(0);
            let cap = if rule.is_boss { 1 } else { rule.max_per_room };
            if placed < cap
                && !(rule.is_boss && boss_placed)
                && (rule.allowed_room_types.is_empty()
                    || rule.allowed_room_types.contains(&room.room_type))
                && hops >= rule.min_distance_from_start
                && hops <= rule.max_distance_from_start
            {
                out.push(Candidate {
                    id: &rule.id,
                    kind: SpawnKind::Enemy,
                    weight: if rule.weight > 0.0 {
                        rule.weight.powf(difficulty)
                    } else {
                        0.0
                    },
                    enemy_spacing: rule.min_distance_from_other_enemies,
                    is_boss: rule.is_boss,
                });
            }
        }
        out
    }

    /// Cumulative-weight draw over the eligible rules.
    fn weighted_draw<'a, 'b>(
        candidates: &'b [Candidate<'a>],
        rng: &mut impl Rng,
    ) -> Option<&'b Candidate<'a>> {
        let total: f32 = candidates.iter().map(|c| c.weight).sum();
        if total <= 0.0 {
            return None;
        }
        let roll = rng.gen::<f32>() * total;
        let mut cumulative = 0.0;
        for candidate in candidates {
            cumulative += candidate.weight;
            if roll < cumulative {
                return Some(candidate);
            }
        }
        candidates.last()
    }

    /// Rejection-sample a floor cell satisfying the pairwise spacing rules.
    /// Bounded by `MAX_PLACEMENT_ATTEMPTS` to guarantee termination.
    #[allow(clippy::too_many_arguments)]
    fn sample_position(
        model: &GridModel,
        room: &Room,
        min_spacing: i32,
        enemy_spacing: i32,
        room_positions: &[GridPosition],
        enemy_positions: &[GridPosition],
        kind: SpawnKind,
        rng: &mut impl Rng,
    ) -> Option<GridPosition> {
        let b = room.bounds;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let pos = GridPosition::new(
                rng.gen_range(b.x..b.x + b.width),
                rng.gen_range(b.y..b.y + b.height),
            );
            if model.get(pos.x, pos.y) != Some(TileType::Floor) {
                continue;
            }
            if room_positions.iter().any(|p| p.chebyshev(pos) < min_spacing) {
                continue;
            }
            if kind == SpawnKind::Enemy
                && enemy_positions
                    .iter()
                    .any(|p| p.chebyshev(pos) < enemy_spacing)
            {
                continue;
            }
            return Some(pos);
        }
        None
    }
}
