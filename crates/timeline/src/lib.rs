use thiserror::Error;

mod track;
pub use track::*;

pub mod collision;
pub mod config;
pub mod edit_operations;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod layout;
pub mod markers;
pub mod playback;
pub mod selection;
pub mod snapping;
pub mod timecode;

mod commands;
pub use commands::*;
mod persist;
pub use persist::*;
mod state;
pub use state::*;

pub use config::EngineConfig;
pub use edit_operations::{PlannedMove, ResizeEdge, MIN_RESIZE_FRAMES};
pub use history::{ActionLog, ActionRecorder, NoopRecorder};
pub use interaction::{
    hit_test, DragGhost, Hit, InteractionController, InteractionState, Modifiers, PointerEvent,
};
pub use layout::{get_next_available_row_index, DynamicRow, InsertionKind, InsertionPoint, RowBounds};
pub use markers::{Marker, MarkerCollection, MarkerId, MarkerType};
pub use playback::{PlaybackScheduler, TickOutcome};
pub use selection::{MarqueeSelection, SelectionState};
pub use snapping::SnapSettings;
pub use timecode::{Timecode, TimecodeFormat};

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid operation: {0}")]
    InvalidOp(String),
    #[error("track not found: {0}")]
    TrackNotFound(TrackId),
    #[error("track already exists: {0}")]
    TrackExists(TrackId),
    #[error("track is locked: {0}")]
    TrackLocked(TrackId),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid timecode {0}")]
    InvalidTimecode(String),
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),
    #[error("command {index} failed: {source}")]
    Script {
        index: usize,
        source: Box<TimelineError>,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Frame = i64; // 0-based frame index; ranges are half-open [start, end)

/// Latest frame a loaded timeline may reference (over 200 days at 120 fps)
pub const MAX_FRAME: Frame = i32::MAX as Frame;
