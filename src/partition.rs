//! BSP space partitioning: recursively split the grid into regions and
//! carve one room inside each leaf.
//!
//! The seed fully determines the partition tree and all room placements:
//! the same seed and settings always reproduce the identical room list in
//! the identical order.

use crate::constants::*;
use crate::error::GenerationError;
use crate::geometry::{GridPosition, Rect};
use crate::grid::GridModel;
use crate::room::{Room, RoomId, RoomType, SizeClass};
use crate::settings::GenerationSettings;
use crate::tile::TileType;
use rand::Rng;

/// A node in the BSP tree. Either a leaf (carries a room id) or an internal
/// node with two children. The tree outlives partitioning because the
/// connector derives room adjacency from its sibling structure.
#[derive(Debug)]
pub struct BspNode {
    pub region: Rect,
    pub room: Option<RoomId>,
    pub left: Option<Box<BspNode>>,
    pub right: Option<Box<BspNode>>,
}

impl BspNode {
    fn new(region: Rect) -> Self {
        Self {
            region,
            room: None,
            left: None,
            right: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Recursively split along the longer axis until leaves are room-sized,
    /// with a depth-scaled chance to stop early.
    fn split(&mut self, min_leaf: i32, depth: u32, rng: &mut impl Rng) {
        let can_split_v = self.region.width >= min_leaf * 2;
        let can_split_h = self.region.height >= min_leaf * 2;
        if !can_split_v && !can_split_h {
            return;
        }

        if depth >= SPLIT_MIN_DEPTH {
            let stop_chance =
                (depth - SPLIT_MIN_DEPTH + 1) as f64 * SPLIT_STOP_CHANCE_PER_DEPTH;
            if rng.gen_bool(stop_chance.min(0.9)) {
                return;
            }
        }

        // Prefer the longer axis; fall back to whichever direction fits.
        let split_vertical = if can_split_v && can_split_h {
            if self.region.width > self.region.height {
                true
            } else if self.region.height > self.region.width {
                false
            } else {
                rng.gen_bool(0.5)
            }
        } else {
            can_split_v
        };

        if split_vertical {
            let split_x = rng.gen_range(min_leaf..=self.region.width - min_leaf);
            let left = Rect::new(self.region.x, self.region.y, split_x, self.region.height);
            let right = Rect::new(
                self.region.x + split_x,
                self.region.y,
                self.region.width - split_x,
                self.region.height,
            );
            self.left = Some(Box::new(BspNode::new(left)));
            self.right = Some(Box::new(BspNode::new(right)));
        } else {
            let split_y = rng.gen_range(min_leaf..=self.region.height - min_leaf);
            let top = Rect::new(self.region.x, self.region.y, self.region.width, split_y);
            let bottom = Rect::new(
                self.region.x,
                self.region.y + split_y,
                self.region.width,
                self.region.height - split_y,
            );
            self.left = Some(Box::new(BspNode::new(top)));
            self.right = Some(Box::new(BspNode::new(bottom)));
        }

        if let Some(ref mut left) = self.left {
            left.split(min_leaf, depth + 1, rng);
        }
        if let Some(ref mut right) = self.right {
            right.split(min_leaf, depth + 1, rng);
        }
    }

    /// Any room id from this subtree, left-most leaf first.
    pub fn any_room(&self) -> Option<RoomId> {
        if let Some(id) = self.room {
            return Some(id);
        }
        if let Some(ref left) = self.left {
            if let Some(id) = left.any_room() {
                return Some(id);
            }
        }
        if let Some(ref right) = self.right {
            if let Some(id) = right.any_room() {
                return Some(id);
            }
        }
        None
    }

    /// Collect all room ids in this subtree, in traversal order.
    pub fn collect_rooms(&self, out: &mut Vec<RoomId>) {
        if let Some(id) = self.room {
            out.push(id);
        }
        if let Some(ref left) = self.left {
            left.collect_rooms(out);
        }
        if let Some(ref right) = self.right {
            right.collect_rooms(out);
        }
    }

    /// Centroid of all room centers in this subtree. Used by the connector
    /// to pick short corridors between sibling subtrees.
    pub fn centroid(&self, model: &GridModel) -> Option<GridPosition> {
        let mut ids = Vec::new();
        self.collect_rooms(&mut ids);
        if ids.is_empty() {
            return None;
        }
        let (mut sx, mut sy) = (0i64, 0i64);
        for &id in &ids {
            let c = model.rooms[id].center();
            sx += c.x as i64;
            sy += c.y as i64;
        }
        let n = ids.len() as i64;
        Some(GridPosition::new((sx / n) as i32, (sy / n) as i32))
    }
}

/// Splits the grid into regions and carves one room per leaf.
pub struct SpacePartitioner;

impl SpacePartitioner {
    /// Partition the grid and carve rooms into `model`. Returns the BSP
    /// tree used to derive adjacency during connection.
    ///
    /// Fails with `InsufficientSpace` when not even one room of
    /// `min_room_size` fits.
    pub fn partition(
        model: &mut GridModel,
        settings: &GenerationSettings,
        rng: &mut impl Rng,
    ) -> Result<BspNode, GenerationError> {
        let min_leaf = settings.min_room_size + ROOM_MARGIN * 2;
        if model.width() < min_leaf || model.height() < min_leaf {
            return Err(GenerationError::InsufficientSpace {
                width: model.width(),
                height: model.height(),
                min_room_size: settings.min_room_size,
            });
        }

        let mut root = BspNode::new(Rect::new(0, 0, model.width(), model.height()));
        root.split(min_leaf, 0, rng);
        Self::create_rooms(&mut root, model, settings, rng);

        if model.rooms.is_empty() {
            return Err(GenerationError::InsufficientSpace {
                width: model.width(),
                height: model.height(),
                min_room_size: settings.min_room_size,
            });
        }

        log::debug!(
            "partitioned {}x{} grid into {} rooms",
            model.width(),
            model.height(),
            model.rooms.len()
        );
        Ok(root)
    }

    /// Carve a room strictly inside each leaf region, leaving a wall margin.
    fn create_rooms(
        node: &mut BspNode,
        model: &mut GridModel,
        settings: &GenerationSettings,
        rng: &mut impl Rng,
    ) {
        if node.is_leaf() {
            let max_width = (node.region.width - ROOM_MARGIN * 2).min(settings.max_room_size);
            let max_height = (node.region.height - ROOM_MARGIN * 2).min(settings.max_room_size);
            if max_width < settings.min_room_size || max_height < settings.min_room_size {
                return;
            }

            let room_width = rng.gen_range(settings.min_room_size..=max_width);
            let room_height = rng.gen_range(settings.min_room_size..=max_height);
            let slack_x = node.region.width - ROOM_MARGIN * 2 - room_width;
            let slack_y = node.region.height - ROOM_MARGIN * 2 - room_height;
            let room_x = node.region.x + ROOM_MARGIN + rng.gen_range(0..=slack_x);
            let room_y = node.region.y + ROOM_MARGIN + rng.gen_range(0..=slack_y);

            let bounds = Rect::new(room_x, room_y, room_width, room_height);
            let id = model.rooms.len();
            let room_type = Self::draw_room_type(id, &bounds, settings, rng);
            Self::carve_room(model, &bounds);
            model.rooms.push(Room::new(id, bounds, room_type));
            node.room = Some(id);
            return;
        }

        if let Some(ref mut left) = node.left {
            Self::create_rooms(left, model, settings, rng);
        }
        if let Some(ref mut right) = node.right {
            Self::create_rooms(right, model, settings, rng);
        }
    }

    /// Weighted draw over special types, falling back to a size-based tag.
    /// The first room in traversal order stays plain; it is the default
    /// starting-room candidate and should not double as a boss room.
    fn draw_room_type(
        id: RoomId,
        bounds: &Rect,
        settings: &GenerationSettings,
        rng: &mut impl Rng,
    ) -> RoomType {
        let chances = &settings.room_type_chances;
        if id > 0 {
            let roll: f32 = rng.gen();
            let mut threshold = chances.treasure;
            if roll < threshold {
                return RoomType::TreasureRoom;
            }
            threshold += chances.guard;
            if roll < threshold {
                return RoomType::GuardRoom;
            }
            threshold += chances.laboratory;
            if roll < threshold {
                return RoomType::Laboratory;
            }
            threshold += chances.boss;
            if roll < threshold {
                return RoomType::BossRoom;
            }
        }
        match SizeClass::of_area(bounds.area()) {
            SizeClass::Small => RoomType::SmallRoom,
            SizeClass::Medium => RoomType::MediumRoom,
            SizeClass::Large => RoomType::LargeRoom,
        }
    }

    /// Floor for the interior, a wall ring just outside the bounds.
    fn carve_room(model: &mut GridModel, bounds: &Rect) {
        for p in bounds.cells() {
            model.set(p.x, p.y, TileType::Floor);
        }
        for p in bounds.perimeter() {
            model.set_if_empty(p.x, p.y, TileType::Wall);
        }
    }
}
