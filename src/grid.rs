//! The grid data model: tiles, rooms, doors, and the starting room.
//!
//! Pure data plus invariant-preserving accessors. Stages of the pipeline
//! transform this model in place; no stage re-reads settings consumed by a
//! prior stage.

use crate::geometry::{bresenham_line, GridPosition};
use crate::room::{Room, RoomId};
use crate::tile::{DoorOrientation, TileType};
use std::collections::VecDeque;

/// A door carved at a room/corridor boundary. References the two rooms it
/// connects by id; rooms own no doors.
#[derive(Debug, Clone)]
pub struct Door {
    pub position: GridPosition,
    pub orientation: DoorOrientation,
    pub rooms: (RoomId, RoomId),
    /// At most one door per dungeon carries this flag.
    pub is_entrance: bool,
}

/// The tile grid, room list, and door list for one generated dungeon.
#[derive(Debug, Clone)]
pub struct GridModel {
    width: i32,
    height: i32,
    tiles: Vec<TileType>,
    pub rooms: Vec<Room>,
    pub doors: Vec<Door>,
    pub starting_room: Option<RoomId>,
}

impl GridModel {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0);
        Self {
            width,
            height,
            tiles: vec![TileType::Empty; (width * height) as usize],
            rooms: Vec::new(),
            doors: Vec::new(),
            starting_room: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<TileType> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    pub fn set(&mut self, x: i32, y: i32, tile: TileType) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    /// Set a tile only if the cell currently holds `Empty`. Keeps carved
    /// floors and doors intact when laying walls around corridors.
    pub fn set_if_empty(&mut self, x: i32, y: i32, tile: TileType) {
        if let Some(i) = self.index(x, y) {
            if self.tiles[i] == TileType::Empty {
                self.tiles[i] = tile;
            }
        }
    }

    /// Raw row-major tile slice, for renderers and byte-level comparisons.
    pub fn tiles(&self) -> &[TileType] {
        &self.tiles
    }

    /// The room whose interior contains (x, y), if any. Room bounds never
    /// overlap, so at most one matches.
    pub fn room_at(&self, x: i32, y: i32) -> Option<RoomId> {
        self.rooms.iter().find(|r| r.bounds.contains(x, y)).map(|r| r.id)
    }

    pub fn starting_room(&self) -> Option<&Room> {
        self.starting_room.map(|id| &self.rooms[id])
    }

    /// The entrance door, if one has been committed.
    pub fn entrance(&self) -> Option<&Door> {
        self.doors.iter().find(|d| d.is_entrance)
    }

    /// Whether the undirected room graph (rooms as nodes, doors as edges)
    /// is a single connected component. This is the central post-condition
    /// of room connection and is checked independently of how connection
    /// was performed.
    pub fn are_all_rooms_connected(&self) -> bool {
        if self.rooms.len() <= 1 {
            return true;
        }
        let mut seen = vec![false; self.rooms.len()];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        let mut count = 1;
        while let Some(id) = queue.pop_front() {
            for &next in &self.rooms[id].connections {
                if !seen[next] {
                    seen[next] = true;
                    count += 1;
                    queue.push_back(next);
                }
            }
        }
        count == self.rooms.len()
    }

    /// BFS hop distance from `from` to every room over the room graph.
    /// Unreachable rooms get `None` (cannot happen once connection holds).
    pub fn room_distances(&self, from: RoomId) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.rooms.len()];
        if from >= self.rooms.len() {
            return dist;
        }
        dist[from] = Some(0);
        let mut queue = VecDeque::from([from]);
        while let Some(id) = queue.pop_front() {
            let d = dist[id].unwrap_or(0);
            for &next in &self.rooms[id].connections {
                if dist[next].is_none() {
                    dist[next] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    /// Bresenham line of sight: true when no vision-blocking tile lies
    /// strictly between the two positions.
    pub fn line_of_sight(&self, from: GridPosition, to: GridPosition) -> bool {
        let line = bresenham_line(from, to);
        for p in &line[..line.len().saturating_sub(1)] {
            if *p == from {
                continue;
            }
            match self.get(p.x, p.y) {
                Some(t) if !t.blocks_vision() => {}
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::room::RoomType;

    fn model_with_rooms(edges: &[(RoomId, RoomId)], count: usize) -> GridModel {
        let mut model = GridModel::new(50, 50);
        for id in 0..count {
            model
                .rooms
                .push(Room::new(id, Rect::new(id as i32 * 8, 1, 5, 5), RoomType::SmallRoom));
        }
        for &(a, b) in edges {
            model.rooms[a].add_connection(b);
            model.rooms[b].add_connection(a);
        }
        model
    }

    #[test]
    fn test_get_out_of_bounds_is_none() {
        let model = GridModel::new(10, 10);
        assert_eq!(model.get(-1, 0), None);
        assert_eq!(model.get(0, 10), None);
        assert_eq!(model.get(5, 5), Some(TileType::Empty));
    }

    #[test]
    fn test_set_if_empty_preserves_floor() {
        let mut model = GridModel::new(10, 10);
        model.set(3, 3, TileType::Floor);
        model.set_if_empty(3, 3, TileType::Wall);
        assert_eq!(model.get(3, 3), Some(TileType::Floor));
        model.set_if_empty(4, 4, TileType::Wall);
        assert_eq!(model.get(4, 4), Some(TileType::Wall));
    }

    #[test]
    fn test_connectivity_chain() {
        let model = model_with_rooms(&[(0, 1), (1, 2), (2, 3)], 4);
        assert!(model.are_all_rooms_connected());
    }

    #[test]
    fn test_connectivity_detects_split_graph() {
        let model = model_with_rooms(&[(0, 1), (2, 3)], 4);
        assert!(!model.are_all_rooms_connected());
    }

    #[test]
    fn test_room_distances_hops() {
        let model = model_with_rooms(&[(0, 1), (1, 2), (2, 3)], 4);
        let dist = model.room_distances(0);
        assert_eq!(dist, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_single_room_is_connected() {
        let model = model_with_rooms(&[], 1);
        assert!(model.are_all_rooms_connected());
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let mut model = GridModel::new(10, 10);
        for x in 0..10 {
            for y in 0..10 {
                model.set(x, y, TileType::Floor);
            }
        }
        assert!(model.line_of_sight(GridPosition::new(1, 1), GridPosition::new(8, 1)));
        model.set(4, 1, TileType::Wall);
        assert!(!model.line_of_sight(GridPosition::new(1, 1), GridPosition::new(8, 1)));
    }

    #[test]
    fn test_room_at_finds_containing_room() {
        let model = model_with_rooms(&[], 2);
        assert_eq!(model.room_at(2, 2), Some(0));
        assert_eq!(model.room_at(9, 2), Some(1));
        assert_eq!(model.room_at(40, 40), None);
    }
}
