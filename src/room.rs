//! Rooms: bounds, type tags, size classes, and connection bookkeeping.

use crate::geometry::{GridPosition, Rect};
use serde::{Deserialize, Serialize};

/// Index of a room in `GridModel::rooms`. Rooms and doors reference each
/// other by id, never by owning pointers.
pub type RoomId = usize;

/// Functional category assigned to a room during partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    SmallRoom,
    MediumRoom,
    LargeRoom,
    Corridor,
    TreasureRoom,
    GuardRoom,
    Laboratory,
    BossRoom,
}

/// Area-based size bucket, used to scale spawn budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn of_area(area: i32) -> Self {
        use crate::constants::{LARGE_ROOM_AREA, MEDIUM_ROOM_AREA};
        if area >= LARGE_ROOM_AREA {
            SizeClass::Large
        } else if area >= MEDIUM_ROOM_AREA {
            SizeClass::Medium
        } else {
            SizeClass::Small
        }
    }
}

/// A carved room. Created by the partitioner, annotated by the connector
/// (connections) and the starting-point selector; read-only once entity
/// population begins.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub bounds: Rect,
    pub room_type: RoomType,
    /// Ids of rooms reachable through a door from this one.
    pub connections: Vec<RoomId>,
}

impl Room {
    pub fn new(id: RoomId, bounds: Rect, room_type: RoomType) -> Self {
        Self {
            id,
            bounds,
            room_type,
            connections: Vec::new(),
        }
    }

    pub fn center(&self) -> GridPosition {
        self.bounds.center()
    }

    pub fn area(&self) -> i32 {
        self.bounds.area()
    }

    pub fn size_class(&self) -> SizeClass {
        SizeClass::of_area(self.area())
    }

    /// Graph degree: how many distinct rooms this one connects to.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn add_connection(&mut self, other: RoomId) {
        if !self.connections.contains(&other) {
            self.connections.push(other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_class_thresholds() {
        assert_eq!(SizeClass::of_area(20), SizeClass::Small);
        assert_eq!(SizeClass::of_area(60), SizeClass::Medium);
        assert_eq!(SizeClass::of_area(150), SizeClass::Large);
    }

    #[test]
    fn test_add_connection_deduplicates() {
        let mut room = Room::new(0, Rect::new(0, 0, 5, 5), RoomType::SmallRoom);
        room.add_connection(1);
        room.add_connection(1);
        room.add_connection(2);
        assert_eq!(room.connection_count(), 2);
    }
}
