//! Generation error taxonomy.
//!
//! `InsufficientSpace` is fatal to a pipeline run; the caller may retry
//! with a different seed. Stage-ordering mistakes surface as `StageNotReady`
//! rather than silently operating on empty data. Spawn placement exhaustion
//! and missing starting-room candidates degrade in place and never appear
//! here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error(
        "grid {width}x{height} cannot fit any room of minimum size {min_room_size}"
    )]
    InsufficientSpace {
        width: i32,
        height: i32,
        min_room_size: i32,
    },

    #[error("stage '{stage}' requires {requirement}")]
    StageNotReady {
        stage: &'static str,
        requirement: &'static str,
    },
}
