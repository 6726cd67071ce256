//! Roadgen Sim -- deterministic driving loop on top of [`roadgen_track`].
//!
//! This crate drives a vehicle along the procedurally generated road: a
//! fixed-timestep [`DriveLoop`](tick::DriveLoop) steers and moves the car,
//! checks it against the road centerline, keeps the two track segments
//! recycled ahead of the camera, and animates camera zoom and shake. Drawing
//! goes through a flat-color [`Canvas`](render::Canvas); whole runs can be
//! snapshotted, hashed and replayed.
//!
//! # Quick Start
//!
//! ```
//! use roadgen_sim::prelude::*;
//!
//! let mut drive = DriveLoop::new(SimConfig { seed: 42, ..Default::default() }).unwrap();
//! drive.set_input(InputFrame { steering: Steering::Right });
//! let events = drive.run_ticks(600);
//!
//! assert_eq!(drive.tick_count(), 600);
//! assert!(events.iter().any(|e| matches!(e, DriveEvent::LeftRoad { .. })));
//! ```

#![deny(unsafe_code)]

pub mod camera;
pub mod render;
pub mod replay;
pub mod snapshot;
pub mod tick;
pub mod vehicle;

/// Re-export the track crate for convenience.
pub use roadgen_track;

use roadgen_track::TrackError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from configuring, building or restoring a simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// The track could not be built or rasterized.
    #[error(transparent)]
    Track(#[from] TrackError),

    /// A snapshot's stored hash does not match its contents.
    #[error("snapshot hash mismatch: stored {stored} but computed {computed}")]
    SnapshotHashMismatch {
        /// Hash recorded in the snapshot.
        stored: String,
        /// Hash recomputed from the snapshot's fields.
        computed: String,
    },

    /// A simulation config value is unusable.
    #[error("invalid sim config field '{field}': {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use roadgen_track::prelude::*;

    pub use crate::camera::{Camera, Viewport};
    pub use crate::render::{draw_track, Canvas, FrameBuffer, Rect, Rgb};
    pub use crate::replay::{
        replay, ReplayDivergence, ReplayEntry, ReplayLog, ReplayRecorder, ReplayResult,
    };
    pub use crate::snapshot::SimSnapshot;
    pub use crate::tick::{DriveEvent, DriveLoop, InputFrame, SimConfig, TickDiagnostics};
    pub use crate::vehicle::{Steering, Vehicle};
    pub use crate::SimError;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_mismatch_message_names_both_hashes() {
        let err = SimError::SnapshotHashMismatch {
            stored: "aa".into(),
            computed: "bb".into(),
        };
        assert_eq!(err.to_string(), "snapshot hash mismatch: stored aa but computed bb");
    }

    #[test]
    fn config_error_names_the_field() {
        let err = SimError::InvalidConfig {
            field: "zoom_rate",
            reason: "must be positive and finite, got 0".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid sim config field 'zoom_rate': must be positive and finite, got 0"
        );
    }

    #[test]
    fn track_errors_convert_transparently() {
        let track = TrackError::InvalidConfig {
            field: "raster_step",
            reason: "too coarse".into(),
        };
        let err: SimError = track.clone().into();
        assert_eq!(err.to_string(), track.to_string());
    }
}
