//! Starting-room selection: score every room against the configured
//! criteria and commit the dungeon entrance.
//!
//! Runs after room connection; committing the entrance here completes the
//! two-phase entrance marking the connector deliberately leaves open.

use crate::error::GenerationError;
use crate::geometry::GridPosition;
use crate::grid::{Door, GridModel};
use crate::room::{Room, RoomId};
use crate::settings::{CompassEdge, StartingPointCriteria};
use crate::tile::{DoorOrientation, TileType};

/// Gap (in tiles) between a room's wall ring and the grid border below
/// which the room counts as touching that edge.
const EDGE_TOUCH_TOLERANCE: i32 = 2;
/// Gap below which two perpendicular edges make a room a corner room.
const CORNER_PROXIMITY: i32 = 4;

pub struct StartingPointSelector;

impl StartingPointSelector {
    /// Pick the highest-scoring room, set it on the model, and flag exactly
    /// one entrance door. Never returns no room when rooms exist: if the
    /// hard constraints eliminate every candidate the raw best scorer is
    /// used instead.
    pub fn select(
        model: &mut GridModel,
        criteria: &StartingPointCriteria,
    ) -> Result<RoomId, GenerationError> {
        if model.rooms.is_empty() {
            return Err(GenerationError::StageNotReady {
                stage: "StartingPointSelector",
                requirement: "a partitioned room list",
            });
        }

        let eligible: Vec<RoomId> = model
            .rooms
            .iter()
            .filter(|r| Self::passes_hard_constraints(r, model, criteria))
            .map(|r| r.id)
            .collect();

        let winner = if eligible.is_empty() {
            log::warn!("no room satisfies the starting-point constraints; falling back to best raw score");
            Self::best_by_score(model, criteria, model.rooms.iter().map(|r| r.id))
        } else {
            Self::best_by_score(model, criteria, eligible.into_iter())
        };

        model.starting_room = Some(winner);
        Self::commit_entrance(model, winner, criteria);
        log::info!(
            "starting room {} at {:?}, entrance at {:?}",
            winner,
            model.rooms[winner].bounds,
            model.entrance().map(|d| d.position)
        );
        Ok(winner)
    }

    fn passes_hard_constraints(
        room: &Room,
        model: &GridModel,
        criteria: &StartingPointCriteria,
    ) -> bool {
        let connections = room.connection_count();
        if connections < criteria.min_connections || connections > criteria.max_connections {
            return false;
        }
        if room.area() < criteria.min_room_area {
            return false;
        }
        if !criteria.allow_corners && Self::is_corner_room(room, model) {
            return false;
        }
        true
    }

    fn best_by_score(
        model: &GridModel,
        criteria: &StartingPointCriteria,
        candidates: impl Iterator<Item = RoomId>,
    ) -> RoomId {
        candidates
            .map(|id| (id, Self::score(&model.rooms[id], model, criteria)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
            .unwrap_or(0)
    }

    /// Additive score. Edge proximity is scaled by the preference strength;
    /// the preferred compass edge dominates when configured.
    fn score(room: &Room, model: &GridModel, criteria: &StartingPointCriteria) -> f32 {
        let longest = model.width().max(model.height()) as f32;
        let mut score = 0.0;

        if criteria.prefer_map_edge {
            let min_gap = Self::edge_gaps(room, model).into_iter().min().unwrap_or(0);
            score += criteria.edge_preference_strength * (1.0 - min_gap as f32 / longest);
        }
        if let Some(edge) = criteria.preferred_edge {
            let gap = Self::edge_gap(room, model, edge);
            score +=
                criteria.edge_preference_strength * 4.0 * (1.0 - gap as f32 / longest);
        }
        if criteria.allow_corners && Self::is_corner_room(room, model) {
            score -= criteria.edge_preference_strength * 0.5;
        }
        score
    }

    /// Distance from the room's wall ring to the grid border on one edge.
    fn edge_gap(room: &Room, model: &GridModel, edge: CompassEdge) -> i32 {
        let b = room.bounds;
        match edge {
            CompassEdge::North => b.y - 1,
            CompassEdge::South => model.height() - (b.y + b.height) - 1,
            CompassEdge::West => b.x - 1,
            CompassEdge::East => model.width() - (b.x + b.width) - 1,
        }
    }

    fn edge_gaps(room: &Room, model: &GridModel) -> [i32; 4] {
        [
            Self::edge_gap(room, model, CompassEdge::North),
            Self::edge_gap(room, model, CompassEdge::South),
            Self::edge_gap(room, model, CompassEdge::East),
            Self::edge_gap(room, model, CompassEdge::West),
        ]
    }

    fn is_corner_room(room: &Room, model: &GridModel) -> bool {
        let horizontal = Self::edge_gap(room, model, CompassEdge::West)
            .min(Self::edge_gap(room, model, CompassEdge::East));
        let vertical = Self::edge_gap(room, model, CompassEdge::North)
            .min(Self::edge_gap(room, model, CompassEdge::South));
        horizontal < CORNER_PROXIMITY && vertical < CORNER_PROXIMITY
    }

    /// Flag exactly one entrance door for the winning room. Prefers a
    /// carved exterior entrance when configured and the room sits close
    /// enough to the border; otherwise the room's nearest existing door
    /// becomes the entrance.
    fn commit_entrance(model: &mut GridModel, winner: RoomId, criteria: &StartingPointCriteria) {
        for door in &mut model.doors {
            door.is_entrance = false;
        }

        if criteria.create_exterior_entrance {
            let edge = criteria
                .preferred_edge
                .filter(|&e| Self::edge_gap(&model.rooms[winner], model, e) <= EDGE_TOUCH_TOLERANCE)
                .or_else(|| Self::nearest_edge(model, winner, EDGE_TOUCH_TOLERANCE));
            if let Some(edge) = edge {
                Self::carve_exterior_entrance(model, winner, edge, criteria.entrance_width);
                return;
            }
        }

        let center = model.rooms[winner].center();
        let nearest = model
            .doors
            .iter()
            .enumerate()
            .filter(|(_, d)| d.rooms.0 == winner || d.rooms.1 == winner)
            .min_by_key(|(_, d)| d.position.dist_sq(center));
        if let Some((idx, _)) = nearest {
            model.doors[idx].is_entrance = true;
        } else if let Some(edge) = Self::nearest_edge(model, winner, i32::MAX) {
            // Single-room dungeon with no doors at all: tunnel out anyway so
            // a starting room always has an entrance on its boundary.
            Self::carve_exterior_entrance(model, winner, edge, criteria.entrance_width);
        }
    }

    fn nearest_edge(model: &GridModel, room: RoomId, tolerance: i32) -> Option<CompassEdge> {
        let room = &model.rooms[room];
        [
            CompassEdge::North,
            CompassEdge::South,
            CompassEdge::East,
            CompassEdge::West,
        ]
        .into_iter()
        .map(|e| (e, Self::edge_gap(room, model, e)))
        .filter(|&(_, gap)| gap <= tolerance)
        .min_by_key(|&(_, gap)| gap)
        .map(|(e, _)| e)
    }

    /// Carve a door through the room's boundary-facing wall and a short
    /// passage out to the grid border. North/south walls yield Horizontal
    /// doors, east/west walls Vertical ones.
    fn carve_exterior_entrance(
        model: &mut GridModel,
        room_id: RoomId,
        edge: CompassEdge,
        entrance_width: i32,
    ) {
        let bounds = model.rooms[room_id].bounds;
        let center = bounds.center();
        let (door_pos, step, orientation) = match edge {
            CompassEdge::North => (
                GridPosition::new(center.x, bounds.y - 1),
                (0, -1),
                DoorOrientation::Horizontal,
            ),
            CompassEdge::South => (
                GridPosition::new(center.x, bounds.y + bounds.height),
                (0, 1),
                DoorOrientation::Horizontal,
            ),
            CompassEdge::West => (
                GridPosition::new(bounds.x - 1, center.y),
                (-1, 0),
                DoorOrientation::Vertical,
            ),
            CompassEdge::East => (
                GridPosition::new(bounds.x + bounds.width, center.y),
                (1, 0),
                DoorOrientation::Vertical,
            ),
        };

        // Widen along the wall axis, centered on the door cell.
        for i in 0..entrance_width {
            let offset = (i + 1) / 2 * if i % 2 == 1 { 1 } else { -1 };
            let (x, y) = match orientation {
                DoorOrientation::Horizontal => (door_pos.x + offset, door_pos.y),
                DoorOrientation::Vertical => (door_pos.x, door_pos.y + offset),
            };
            if model.in_bounds(x, y) {
                model.set(x, y, TileType::Door);
            }
        }

        // Tunnel from the door out to the border.
        let (mut x, mut y) = (door_pos.x + step.0, door_pos.y + step.1);
        while model.in_bounds(x, y) {
            if model.get(x, y) != Some(TileType::Door) {
                model.set(x, y, TileType::Corridor);
            }
            x += step.0;
            y += step.1;
        }

        // Re-selecting the same room re-flags the existing door.
        if let Some(existing) = model.doors.iter().position(|d| d.position == door_pos) {
            model.doors[existing].is_entrance = true;
            return;
        }
        model.doors.push(Door {
            position: door_pos,
            orientation,
            rooms: (room_id, room_id),
            is_entrance: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::SpacePartitioner;
    use crate::connector::RoomConnector;
    use crate::settings::GenerationSettings;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn connected_model(seed: u64) -> GridModel {
        let settings = GenerationSettings {
            seed,
            ..Default::default()
        }
        .validated();
        let mut model = GridModel::new(settings.width, settings.height);
        let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
        let tree = SpacePartitioner::partition(&mut model, &settings, &mut rng).unwrap();
        RoomConnector::connect(&mut model, &tree, &settings, &mut rng).unwrap();
        model
    }

    fn entrance_count(model: &GridModel) -> usize {
        model.doors.iter().filter(|d| d.is_entrance).count()
    }

    #[test]
    fn test_always_selects_a_room() {
        let mut model = connected_model(5);
        let criteria = StartingPointCriteria::default().validated();
        let winner = StartingPointSelector::select(&mut model, &criteria).unwrap();
        assert_eq!(model.starting_room, Some(winner));
    }

    #[test]
    fn test_exactly_one_entrance() {
        for seed in [1, 2, 3, 12345] {
            let mut model = connected_model(seed);
            let criteria = StartingPointCriteria::default().validated();
            StartingPointSelector::select(&mut model, &criteria).unwrap();
            assert_eq!(entrance_count(&model), 1, "seed {seed}");
        }
    }

    #[test]
    fn test_reselection_moves_the_entrance() {
        let mut model = connected_model(9);
        let criteria = StartingPointCriteria::default().validated();
        StartingPointSelector::select(&mut model, &criteria).unwrap();
        StartingPointSelector::select(&mut model, &criteria).unwrap();
        assert_eq!(entrance_count(&model), 1);
    }

    #[test]
    fn test_impossible_constraints_fall_back() {
        let mut model = connected_model(13);
        let criteria = StartingPointCriteria {
            min_connections: 50,
            max_connections: 60,
            min_room_area: 1_000_000,
            ..Default::default()
        }
        .validated();
        let winner = StartingPointSelector::select(&mut model, &criteria);
        assert!(winner.is_ok());
        assert!(model.starting_room.is_some());
    }

    #[test]
    fn test_south_rooms_outscore_north_rooms() {
        let model = {
            let mut m = GridModel::new(60, 60);
            m.rooms.push(Room::new(
                0,
                crate::geometry::Rect::new(25, 2, 8, 8),
                crate::room::RoomType::MediumRoom,
            ));
            m.rooms.push(Room::new(
                1,
                crate::geometry::Rect::new(25, 50, 8, 8),
                crate::room::RoomType::MediumRoom,
            ));
            m
        };
        let criteria = StartingPointCriteria {
            prefer_map_edge: true,
            preferred_edge: Some(CompassEdge::South),
            edge_preference_strength: 100.0,
            ..Default::default()
        }
        .validated();
        let north = StartingPointSelector::score(&model.rooms[0], &model, &criteria);
        let south = StartingPointSelector::score(&model.rooms[1], &model, &criteria);
        assert!(south > north);
    }

    /// One room flush against the south border, one in the interior.
    fn south_edge_model() -> GridModel {
        let mut model = GridModel::new(40, 40);
        for room in [
            Room::new(0, crate::geometry::Rect::new(5, 5, 8, 8), crate::room::RoomType::MediumRoom),
            Room::new(1, crate::geometry::Rect::new(20, 31, 8, 8), crate::room::RoomType::MediumRoom),
        ] {
            for p in room.bounds.cells() {
                model.set(p.x, p.y, TileType::Floor);
            }
            model.rooms.push(room);
        }
        model.rooms[0].add_connection(1);
        model.rooms[1].add_connection(0);
        model
    }

    fn south_edge_criteria() -> StartingPointCriteria {
        StartingPointCriteria {
            prefer_map_edge: true,
            preferred_edge: Some(CompassEdge::South),
            create_exterior_entrance: true,
            edge_preference_strength: 100.0,
            allow_corners: true,
            min_connections: 0,
            max_connections: usize::MAX,
            min_room_area: 1,
            ..Default::default()
        }
        .validated()
    }

    #[test]
    fn test_south_touching_winner_gets_horizontal_exterior_entrance() {
        // The south-flush room must win and receive a Horizontal entrance
        // tunnelled out through the south wall.
        let mut model = south_edge_model();
        let criteria = south_edge_criteria();
        let winner = StartingPointSelector::select(&mut model, &criteria).unwrap();
        assert_eq!(winner, 1);

        let start = model.starting_room().unwrap().clone();
        assert_eq!(
            StartingPointSelector::edge_gap(&start, &model, CompassEdge::South),
            0
        );
        let door = model.entrance().expect("entrance exists").clone();
        assert_eq!(door.orientation, DoorOrientation::Horizontal);
        assert_eq!(door.position.y, start.bounds.y + start.bounds.height);
        // Everything between the door and the border is walkable.
        for y in door.position.y..model.height() {
            assert!(model
                .get(door.position.x, y)
                .map(|t| t.is_walkable())
                .unwrap_or(false));
        }
    }

    #[test]
    fn test_reselection_does_not_duplicate_exterior_door() {
        let mut model = south_edge_model();
        let criteria = south_edge_criteria();
        StartingPointSelector::select(&mut model, &criteria).unwrap();
        let doors_after_first = model.doors.len();
        StartingPointSelector::select(&mut model, &criteria).unwrap();
        assert_eq!(model.doors.len(), doors_after_first);
        assert_eq!(entrance_count(&model), 1);
    }

    #[test]
    fn test_select_requires_rooms() {
        let mut model = GridModel::new(30, 30);
        let criteria = StartingPointCriteria::default().validated();
        let err = StartingPointSelector::select(&mut model, &criteria).unwrap_err();
        assert!(matches!(err, GenerationError::StageNotReady { .. }));
    }
}
