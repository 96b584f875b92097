//! Shared spatial primitives: rectangles, grid positions, distances,
//! and a Bresenham line-of-sight walk.

use serde::{Deserialize, Serialize};

/// An integer grid coordinate. Equality and hashing are by coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    pub fn manhattan(&self, other: GridPosition) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev (chessboard) distance to another position.
    pub fn chebyshev(&self, other: GridPosition) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Squared Euclidean distance, for comparisons without sqrt.
    pub fn dist_sq(&self, other: GridPosition) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

/// A rectangle representing a room or region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> GridPosition {
        GridPosition::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Check if a point is inside this rectangle
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Check if this rectangle shares any cell with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Iterate the cells forming the one-tile ring just outside the bounds.
    pub fn perimeter(&self) -> impl Iterator<Item = GridPosition> + '_ {
        let top = (self.x - 1..=self.x + self.width).map(move |x| GridPosition::new(x, self.y - 1));
        let bottom =
            (self.x - 1..=self.x + self.width).map(move |x| GridPosition::new(x, self.y + self.height));
        let left = (self.y..self.y + self.height).map(move |y| GridPosition::new(self.x - 1, y));
        let right =
            (self.y..self.y + self.height).map(move |y| GridPosition::new(self.x + self.width, y));
        top.chain(bottom).chain(left).chain(right)
    }

    /// Iterate every cell inside the bounds, row by row.
    pub fn cells(&self) -> impl Iterator<Item = GridPosition> + '_ {
        let (x0, y0, w) = (self.x, self.y, self.width);
        (0..self.width * self.height).map(move |i| GridPosition::new(x0 + i % w, y0 + i / w))
    }
}

/// Walk a Bresenham line from `from` to `to`, inclusive of both endpoints.
pub fn bresenham_line(from: GridPosition, to: GridPosition) -> Vec<GridPosition> {
    let mut points = Vec::new();
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);

    loop {
        points.push(GridPosition::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_center() {
        let rect = Rect::new(0, 0, 10, 10);
        assert_eq!(rect.center(), GridPosition::new(5, 5));

        let rect2 = Rect::new(5, 5, 4, 6);
        assert_eq!(rect2.center(), GridPosition::new(7, 8));
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(4, 4, 5, 5);
        let c = Rect::new(5, 0, 5, 5);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c)); // edge-adjacent, no shared cell
    }

    #[test]
    fn test_perimeter_surrounds_bounds() {
        let r = Rect::new(2, 2, 3, 3);
        let ring: Vec<_> = r.perimeter().collect();
        // 5x5 outer box minus 3x3 interior
        assert_eq!(ring.len(), 16);
        for p in &ring {
            assert!(!r.contains(p.x, p.y));
        }
    }

    #[test]
    fn test_bresenham_straight_and_diagonal() {
        let line = bresenham_line(GridPosition::new(0, 0), GridPosition::new(3, 0));
        assert_eq!(line.len(), 4);
        assert_eq!(line[0], GridPosition::new(0, 0));
        assert_eq!(line[3], GridPosition::new(3, 0));

        let diag = bresenham_line(GridPosition::new(0, 0), GridPosition::new(3, 3));
        assert_eq!(diag.len(), 4);
        assert!(diag.contains(&GridPosition::new(2, 2)));
    }

    #[test]
    fn test_bresenham_endpoints_inclusive_reversed() {
        let line = bresenham_line(GridPosition::new(5, 2), GridPosition::new(1, 7));
        assert_eq!(*line.first().unwrap(), GridPosition::new(5, 2));
        assert_eq!(*line.last().unwrap(), GridPosition::new(1, 7));
    }
}
