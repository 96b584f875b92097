//! Procedural 2D tile-dungeon generation: BSP room partitioning, corridor
//! and door placement, starting-room selection, and rule-driven entity
//! population, all deterministic per seed.

pub mod connector;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod partition;
pub mod pipeline;
pub mod populate;
pub mod render;
pub mod room;
pub mod settings;
pub mod starting_point;
pub mod tile;

pub use error::GenerationError;
pub use grid::{Door, GridModel};
pub use pipeline::{Pipeline, SpawnObserver, Stage};
pub use populate::{SpawnPoint, SpawnReport};
pub use settings::{GenerationSettings, SpawnSettings, StartingPointCriteria};
