//! Roadgen Track -- procedural road generation from chained cubic curves.
//!
//! This crate provides the numeric core of an endless top-down road. The road
//! is a pair of [`CurveSegment`](segment::CurveSegment)s owned by a
//! [`TrackManager`](manager::TrackManager); each segment is a restricted cubic
//! Bézier whose interior control points share the x of their endpoints. As the
//! viewport scrolls, consumed segments are rerolled into new random
//! continuations chained from the other segment's end.
//!
//! Two queries are answered against the curves:
//!
//! - **Rasterization** ([`raster`]): one x-offset per integer scanline, used to
//!   draw the road.
//! - **Closest point** ([`locate`]): the curve's x nearest to an arbitrary y,
//!   used for off-road detection.
//!
//! # Quick Start
//!
//! ```
//! use roadgen_track::prelude::*;
//!
//! let config = TrackConfig::default();
//! let mut rng = SeededSource::new(7);
//! let track = TrackManager::new(config, Point2::new(0.0, 14.4), &mut rng).unwrap();
//!
//! let (_, segment) = track.active_segment_at(0.0);
//! assert!(segment.contains_y(0.0));
//!
//! let x = track.closest_x(0.0);
//! assert!(x.is_finite());
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod locate;
pub mod manager;
pub mod random;
pub mod raster;
pub mod sampler;
pub mod segment;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by track construction and rasterization.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackError {
    /// The rasterizer step skipped a whole scanline: the step is too coarse
    /// for the segment's curvature.
    #[error("rasterizer step too coarse: scanline {scanline} received no sample (next sample at y = {sample_y})")]
    StepTooCoarse {
        /// The scanline that received no sample.
        scanline: i64,
        /// The y of the sample that jumped past it.
        sample_y: f64,
    },

    /// Two explicit segments do not form a usable track.
    #[error("invalid track: {reason}")]
    InvalidTrack {
        /// What is wrong with the pair.
        reason: String,
    },

    /// A configuration value is unusable.
    #[error("invalid track config field '{field}': {reason}")]
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
    pub use crate::config::TrackConfig;
    pub use crate::locate::closest_x;
    pub use crate::manager::{SegmentSlot, TrackManager};
    pub use crate::random::{FixedSource, SeededSource, UniformSource};
    pub use crate::raster::{scanlines, Scanline, Scanlines};
    pub use crate::sampler::evaluate;
    pub use crate::segment::{CurveSegment, Point2};
    pub use crate::TrackError;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
