//! Tile types and their walkability / vision / display properties.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileType {
    #[default]
    Empty,
    Floor,
    Wall,
    Door,
    Corridor,
}

impl TileType {
    pub fn is_walkable(&self) -> bool {
        matches!(self, TileType::Floor | TileType::Door | TileType::Corridor)
    }

    pub fn blocks_vision(&self) -> bool {
        matches!(self, TileType::Wall | TileType::Empty)
    }

    /// Character used by the ASCII renderer.
    pub fn glyph(&self) -> char {
        match self {
            TileType::Empty => ' ',
            TileType::Floor => '.',
            TileType::Wall => '#',
            TileType::Door => '+',
            TileType::Corridor => ',',
        }
    }
}

/// Which axis a door spans; determines its rotation when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorOrientation {
    Horizontal,
    Vertical,
}
