//! Renderer boundary. The core walks the finished grid and hands each tile
//! and door to a `VisualFactory`; what the factory builds is its own
//! business. One failing instantiation is logged and skipped, never fatal
//! to the rest of the pass.

use crate::grid::{Door, GridModel};
use crate::tile::TileType;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("failed to instantiate visual for {what} at ({x}, {y})")]
    InstantiationFailed { what: &'static str, x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    /// Skip `Empty` cells entirely instead of passing them to the factory.
    pub skip_empty: bool,
    /// Hand doors to the factory after the tile pass.
    pub include_doors: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            skip_empty: true,
            include_doors: true,
        }
    }
}

/// Counts from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub tiles: usize,
    pub doors: usize,
    pub failures: usize,
}

/// The boundary the core drives. Implementations map tiles and doors onto
/// whatever visual representation they own.
pub trait VisualFactory {
    fn instantiate_tile(&mut self, x: i32, y: i32, tile: TileType) -> Result<(), RenderError>;
    fn instantiate_door(&mut self, door: &Door) -> Result<(), RenderError>;
}

/// Walk the model and drive the factory. Failures are isolated per tile.
pub fn render_model(
    model: &GridModel,
    factory: &mut dyn VisualFactory,
    settings: &RenderSettings,
) -> RenderStats {
    let mut stats = RenderStats::default();
    for y in 0..model.height() {
        for x in 0..model.width() {
            let tile = model.get(x, y).unwrap_or_default();
            if settings.skip_empty && tile == TileType::Empty {
                continue;
            }
            match factory.instantiate_tile(x, y, tile) {
                Ok(()) => stats.tiles += 1,
                Err(err) => {
                    log::warn!("render: {err}");
                    stats.failures += 1;
                }
            }
        }
    }
    if settings.include_doors {
        for door in &model.doors {
            match factory.instantiate_door(door) {
                Ok(()) => stats.doors += 1,
                Err(err) => {
                    log::warn!("render: {err}");
                    stats.failures += 1;
                }
            }
        }
    }
    stats
}

/// Opaque handle to a pooled visual object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(u64);

/// Arena of reusable visual handles keyed by tile type. `acquire` reuses a
/// released handle when one is available and allocates otherwise;
/// `release` restores the handle to an inactive, reusable state.
#[derive(Default)]
pub struct VisualPool {
    free: HashMap<TileType, Vec<VisualHandle>>,
    next: u64,
    live: usize,
}

impl VisualPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, kind: TileType) -> VisualHandle {
        self.live += 1;
        if let Some(handle) = self.free.get_mut(&kind).and_then(Vec::pop) {
            return handle;
        }
        let handle = VisualHandle(self.next);
        self.next += 1;
        handle
    }

    pub fn release(&mut self, kind: TileType, handle: VisualHandle) {
        self.live = self.live.saturating_sub(1);
        self.free.entry(kind).or_default().push(handle);
    }

    /// Handles currently checked out.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Total handles ever allocated.
    pub fn allocated(&self) -> u64 {
        self.next
    }
}

/// Text rendering of the grid: one glyph per tile, doors overlaid, the
/// entrance marked with `E`.
pub struct AsciiRenderer {
    width: i32,
    height: i32,
    glyphs: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            glyphs: vec![' '; (width * height) as usize],
        }
    }

    pub fn as_text(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.glyphs[(y * self.width + x) as usize]);
            }
            out.push('\n');
        }
        out
    }

    fn put(&mut self, x: i32, y: i32, glyph: char) {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            self.glyphs[(y * self.width + x) as usize] = glyph;
        }
    }
}

impl VisualFactory for AsciiRenderer {
    fn instantiate_tile(&mut self, x: i32, y: i32, tile: TileType) -> Result<(), RenderError> {
        self.put(x, y, tile.glyph());
        Ok(())
    }

    fn instantiate_door(&mut self, door: &Door) -> Result<(), RenderError> {
        let glyph = if door.is_entrance { 'E' } else { '+' };
        self.put(door.position.x, door.position.y, glyph);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridPosition;
    use crate::tile::DoorOrientation;

    /// Fails every other tile, to exercise per-tile isolation.
    struct FlakyFactory {
        calls: usize,
        succeeded: usize,
    }

    impl VisualFactory for FlakyFactory {
        fn instantiate_tile(&mut self, x: i32, y: i32, _tile: TileType) -> Result<(), RenderError> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                return Err(RenderError::InstantiationFailed {
                    what: "tile",
                    x,
                    y,
                });
            }
            self.succeeded += 1;
            Ok(())
        }

        fn instantiate_door(&mut self, _door: &Door) -> Result<(), RenderError> {
            Ok(())
        }
    }

    fn small_model() -> GridModel {
        let mut model = GridModel::new(8, 8);
        for x in 1..7 {
            for y in 1..7 {
                model.set(x, y, TileType::Floor);
            }
        }
        model.doors.push(Door {
            position: GridPosition::new(3, 0),
            orientation: DoorOrientation::Horizontal,
            rooms: (0, 0),
            is_entrance: true,
        });
        model
    }

    #[test]
    fn test_failures_do_not_abort_the_pass() {
        let model = small_model();
        let mut factory = FlakyFactory {
            calls: 0,
            succeeded: 0,
        };
        let stats = render_model(&model, &mut factory, &RenderSettings::default());
        assert_eq!(stats.tiles, factory.succeeded);
        assert!(stats.failures > 0);
        assert_eq!(stats.doors, 1);
    }

    #[test]
    fn test_ascii_renderer_marks_entrance() {
        let model = small_model();
        let mut ascii = AsciiRenderer::new(model.width(), model.height());
        render_model(&model, &mut ascii, &RenderSettings::default());
        let text = ascii.as_text();
        assert!(text.contains('E'));
        assert!(text.contains('.'));
    }

    #[test]
    fn test_pool_reuses_released_handles() {
        let mut pool = VisualPool::new();
        let a = pool.acquire(TileType::Floor);
        let b = pool.acquire(TileType::Floor);
        assert_ne!(a, b);
        pool.release(TileType::Floor, a);
        let c = pool.acquire(TileType::Floor);
        assert_eq!(a, c);
        assert_eq!(pool.allocated(), 2);
        assert_eq!(pool.live_count(), 2);
    }

    #[test]
    fn test_pool_falls_back_to_allocation_per_type() {
        let mut pool = VisualPool::new();
        let wall = pool.acquire(TileType::Wall);
        pool.release(TileType::Wall, wall);
        // A different type never reuses another type's handles.
        let floor = pool.acquire(TileType::Floor);
        assert_ne!(wall, floor);
    }
}
