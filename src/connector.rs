//! Room connection: walk the BSP tree bottom-up, carve corridors between
//! sibling subtrees, and place doors where corridors cross room walls.
//!
//! The partition tree is binary and fully joins at the root, so connecting
//! every pair of sibling subtrees yields a spanning tree over all rooms by
//! construction. `GridModel::are_all_rooms_connected` is still checked as
//! an independent post-condition.

use crate::error::GenerationError;
use crate::geometry::GridPosition;
use crate::grid::{Door, GridModel};
use crate::partition::BspNode;
use crate::room::RoomId;
use crate::settings::GenerationSettings;
use crate::tile::{DoorOrientation, TileType};
use rand::Rng;

pub struct RoomConnector;

impl RoomConnector {
    /// Connect all rooms into a single graph. Requires a non-empty room
    /// list; no entrance is flagged here (the starting-point selector
    /// commits the entrance once the starting room is known).
    pub fn connect(
        model: &mut GridModel,
        tree: &BspNode,
        settings: &GenerationSettings,
        rng: &mut impl Rng,
    ) -> Result<(), GenerationError> {
        if model.rooms.is_empty() {
            return Err(GenerationError::StageNotReady {
                stage: "RoomConnector",
                requirement: "a non-empty room list",
            });
        }

        Self::connect_node(model, tree, settings, rng);
        Self::wall_off_corridors(model);

        if !model.are_all_rooms_connected() {
            // Spanning connection is by construction; a failure here means
            // the partition tree and the room list disagree.
            log::warn!("room graph is not fully connected after connection pass");
        }
        log::debug!(
            "connected {} rooms with {} doors",
            model.rooms.len(),
            model.doors.len()
        );
        Ok(())
    }

    /// Bottom-up: connect children first, then join the two subtrees.
    fn connect_node(
        model: &mut GridModel,
        node: &BspNode,
        settings: &GenerationSettings,
        rng: &mut impl Rng,
    ) {
        if node.is_leaf() {
            return;
        }
        if let Some(ref left) = node.left {
            Self::connect_node(model, left, settings, rng);
        }
        if let Some(ref right) = node.right {
            Self::connect_node(model, right, settings, rng);
        }

        let (Some(left), Some(right)) = (&node.left, &node.right) else {
            return;
        };
        let (Some(left_anchor), Some(right_anchor)) =
            (Self::pick_anchor(model, left, right), Self::pick_anchor(model, right, left))
        else {
            return;
        };
        Self::carve_corridor(model, left_anchor, right_anchor, settings, rng);
    }

    /// The room in `from` whose center lies closest to the centroid of
    /// `toward`. Keeps corridors short and avoids pathological zig-zags.
    fn pick_anchor(model: &GridModel, from: &BspNode, toward: &BspNode) -> Option<RoomId> {
        let target = toward.centroid(model)?;
        let mut ids = Vec::new();
        from.collect_rooms(&mut ids);
        ids.into_iter()
            .min_by_key(|&id| model.rooms[id].center().dist_sq(target))
    }

    /// Carve an L-shaped (or straight) corridor between two room centers,
    /// placing doors at every wall crossing along the way.
    fn carve_corridor(
        model: &mut GridModel,
        from: RoomId,
        to: RoomId,
        settings: &GenerationSettings,
        rng: &mut impl Rng,
    ) {
        let a = model.rooms[from].center();
        let b = model.rooms[to].center();

        // Randomly bend horizontal-then-vertical or vertical-then-horizontal.
        let path = if rng.gen_bool(0.5) {
            Self::l_path(a, b, true)
        } else {
            Self::l_path(a, b, false)
        };

        // Rooms crossed along the path, in order. Consecutive crossings
        // become graph edges; wall crossings become doors. A corridor may
        // cut through intermediate rooms, which then join the chain.
        let mut last_room: Option<RoomId> = model.room_at(a.x, a.y);
        let mut last_visited: RoomId = from;
        let mut pending_exit: Option<usize> = None;
        let mut grazing: Option<RoomId> = None;
        let mut prev_pos = a;
        for &pos in &path {
            let here = model.room_at(pos.x, pos.y);
            match (last_room, here) {
                (Some(exited), None) => {
                    // Stepping out of a room: this cell sits on its wall ring.
                    // The far side is unknown until the next room is entered.
                    pending_exit = Self::place_door(model, pos, prev_pos, exited, to);
                }
                (None, Some(entered)) => {
                    // Stepping into a room: the previous cell was its ring.
                    if let Some(door) = pending_exit.take() {
                        model.doors[door].rooms.1 = entered;
                    }
                    let _ = Self::place_door(model, prev_pos, pos, entered, last_visited);
                    Self::link(model, last_visited, entered);
                    last_visited = entered;
                }
                _ => {}
            }
            grazing = if here.is_none() {
                Self::carve_outside_cell(model, pos, prev_pos, grazing, last_visited, settings)
            } else {
                None
            };
            last_room = here;
            prev_pos = pos;
        }
    }

    /// Carve one path cell lying outside every room interior. A cell on a
    /// room's wall ring is never overwritten with corridor: it becomes a
    /// door instead, so a corridor running along a wall cannot open a
    /// doorless gap into the room. Returns the ring-owning room while the
    /// path rides a wall, so a run of grazed cells yields one door record.
    fn carve_outside_cell(
        model: &mut GridModel,
        pos: GridPosition,
        prev: GridPosition,
        grazing: Option<RoomId>,
        last_visited: RoomId,
        settings: &GenerationSettings,
    ) -> Option<RoomId> {
        if model.get(pos.x, pos.y) == Some(TileType::Wall) {
            if let Some(owner) = Self::ring_owner(model, pos) {
                if let Some(interior) = Self::interior_neighbor(model, owner, pos) {
                    if grazing == Some(owner) {
                        // Continuing along the same wall: widen the doorway.
                        model.set(pos.x, pos.y, TileType::Door);
                    } else {
                        let _ = Self::place_door(model, pos, interior, owner, last_visited);
                        Self::link(model, last_visited, owner);
                    }
                    return Some(owner);
                }
            }
        }
        Self::carve_corridor_cell(model, pos, prev, settings.corridor_width);
        None
    }

    /// The room whose one-tile wall ring contains `pos`, if any. Rings of
    /// distinct rooms never share a cell: leaf margins keep interiors at
    /// least three cells apart.
    fn ring_owner(model: &GridModel, pos: GridPosition) -> Option<RoomId> {
        model
            .rooms
            .iter()
            .find(|r| {
                let b = r.bounds;
                pos.x >= b.x - 1
                    && pos.x <= b.x + b.width
                    && pos.y >= b.y - 1
                    && pos.y <= b.y + b.height
                    && !b.contains(pos.x, pos.y)
            })
            .map(|r| r.id)
    }

    /// The interior cell orthogonally adjacent to a ring cell. Corner ring
    /// cells have none and expose no interior.
    fn interior_neighbor(
        model: &GridModel,
        room: RoomId,
        pos: GridPosition,
    ) -> Option<GridPosition> {
        let b = model.rooms[room].bounds;
        [(0, -1), (0, 1), (-1, 0), (1, 0)]
            .into_iter()
            .map(|(dx, dy)| GridPosition::new(pos.x + dx, pos.y + dy))
            .find(|p| b.contains(p.x, p.y))
    }

    /// An L-shaped path of adjacent cells from `a` to `b`.
    fn l_path(a: GridPosition, b: GridPosition, horizontal_first: bool) -> Vec<GridPosition> {
        let mut path = Vec::new();
        let elbow = if horizontal_first {
            GridPosition::new(b.x, a.y)
        } else {
            GridPosition::new(a.x, b.y)
        };
        Self::push_segment(&mut path, a, elbow);
        Self::push_segment(&mut path, elbow, b);
        path
    }

    fn push_segment(path: &mut Vec<GridPosition>, from: GridPosition, to: GridPosition) {
        let step_x = (to.x - from.x).signum();
        let step_y = (to.y - from.y).signum();
        let (mut x, mut y) = (from.x, from.y);
        loop {
            if path.last() != Some(&GridPosition::new(x, y)) {
                path.push(GridPosition::new(x, y));
            }
            if x == to.x && y == to.y {
                break;
            }
            x += step_x;
            y += step_y;
        }
    }

    /// Mark a wall-ring cell as a door, returning its index in the door
    /// list. Orientation follows the approach axis: a corridor arriving
    /// vertically pierces a horizontal wall run, so the door spans
    /// `Horizontal`, and vice versa.
    fn place_door(
        model: &mut GridModel,
        pos: GridPosition,
        neighbor: GridPosition,
        room: RoomId,
        other: RoomId,
    ) -> Option<usize> {
        if let Some(existing) = model.doors.iter().position(|d| d.position == pos) {
            return Some(existing);
        }
        let orientation = if pos.x == neighbor.x {
            DoorOrientation::Horizontal
        } else {
            DoorOrientation::Vertical
        };
        model.set(pos.x, pos.y, TileType::Door);
        model.doors.push(Door {
            position: pos,
            orientation,
            rooms: (room, other),
            is_entrance: false,
        });
        Some(model.doors.len() - 1)
    }

    /// Carve one corridor cell, widened perpendicular to travel.
    fn carve_corridor_cell(
        model: &mut GridModel,
        pos: GridPosition,
        prev: GridPosition,
        width: i32,
    ) {
        if model.get(pos.x, pos.y) != Some(TileType::Door) {
            model.set(pos.x, pos.y, TileType::Corridor);
        }
        let travel_horizontal = pos.y == prev.y;
        for i in 1..width {
            let offset = (i + 1) / 2 * if i % 2 == 1 { 1 } else { -1 };
            let (wx, wy) = if travel_horizontal {
                (pos.x, pos.y + offset)
            } else {
                (pos.x + offset, pos.y)
            };
            if model.room_at(wx, wy).is_none()
                && model.get(wx, wy) != Some(TileType::Door)
                && model.get(wx, wy) != Some(TileType::Wall)
                && model.in_bounds(wx, wy)
            {
                model.set(wx, wy, TileType::Corridor);
            }
        }
    }

    fn link(model: &mut GridModel, a: RoomId, b: RoomId) {
        if a == b {
            return;
        }
        model.rooms[a].add_connection(b);
        model.rooms[b].add_connection(a);
    }

    /// Surround every corridor and door cell with walls where nothing has
    /// been carved yet.
    fn wall_off_corridors(model: &mut GridModel) {
        let mut edges = Vec::new();
        for y in 0..model.height() {
            for x in 0..model.width() {
                if matches!(model.get(x, y), Some(TileType::Corridor) | Some(TileType::Door)) {
                    for dy in -1..=1 {
                        for dx in -1..=1 {
                            if dx != 0 || dy != 0 {
                                edges.push((x + dx, y + dy));
                            }
                        }
                    }
                }
            }
        }
        for (x, y) in edges {
            model.set_if_empty(x, y, TileType::Wall);
        }
    }
}
