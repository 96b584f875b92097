//! Generation constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! Constants are split into submodules by domain for easier navigation.

mod dungeon;
mod spawning;

// Re-export all constants at the module level
pub use dungeon::*;
pub use spawning::*;
