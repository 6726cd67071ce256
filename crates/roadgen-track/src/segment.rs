//! Road segments: restricted cubic Bézier curves chained end to start.
//!
//! A [`CurveSegment`] runs from `origin` upward (decreasing y) to `end`. Its
//! two interior control points sit directly above/below their endpoints, so a
//! segment is described by the two endpoints plus the two control-point y
//! values. Segments are value types: the [`TrackManager`](crate::manager::TrackManager)
//! keeps two of them and rerolls each in place when it scrolls out of view.

use serde::{Deserialize, Serialize};

use crate::config::TrackConfig;
use crate::random::UniformSource;

// ---------------------------------------------------------------------------
// Point2
// ---------------------------------------------------------------------------

/// A point in logical track coordinates. Y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point2 {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// CurveSegment
// ---------------------------------------------------------------------------

/// One chained piece of road.
///
/// A zeroed segment (`CurveSegment::default()`) is only a placeholder; call
/// [`reroll`](Self::reroll) before querying it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveSegment {
    /// Start point, shared with the end of the previous segment.
    pub origin: Point2,
    /// Generated terminus. Always above the origin (`end.y < origin.y`).
    pub end: Point2,
    /// Y of the control point at `(origin.x, origin_control_y)`.
    pub origin_control_y: f64,
    /// Y of the control point at `(end.x, end_control_y)`.
    pub end_control_y: f64,
}

impl CurveSegment {
    /// Build a segment already rerolled from `origin`.
    pub fn rerolled(origin: Point2, config: &TrackConfig, rng: &mut impl UniformSource) -> Self {
        let mut segment = Self::default();
        segment.reroll(origin, config, rng);
        segment
    }

    /// Regenerate this segment as a random continuation starting at `origin`.
    ///
    /// Draws four uniform values in a fixed order: end x, end y, origin
    /// control, end control. The new segment always spans more than one
    /// viewport height, and each control point is pulled 30-75% of the span
    /// toward the opposite end.
    pub fn reroll(&mut self, origin: Point2, config: &TrackConfig, rng: &mut impl UniformSource) {
        let h = config.viewport_height;
        let lateral = config.lateral_range;

        self.origin = origin;
        self.end.x = origin.x + rng.next_unit() * 2.0 * lateral - lateral;
        self.end.y = origin.y - (h + 2.0 + ((h / 3.0) * rng.next_unit()).floor());

        let dy = self.origin.y - self.end.y;
        self.origin_control_y = self.origin.y - (dy * 0.3 + dy * rng.next_unit() * 0.45);
        self.end_control_y = self.end.y + (dy * 0.3 + dy * rng.next_unit() * 0.45);
    }

    /// Whether `y` lies within the segment's closed vertical range.
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.end.y && y <= self.origin.y
    }

    /// Vertical distance from `y` to the segment's range; zero inside it.
    pub fn distance_to_y(&self, y: f64) -> f64 {
        if y > self.origin.y {
            y - self.origin.y
        } else if y < self.end.y {
            self.end.y - y
        } else {
            0.0
        }
    }

    /// Vertical span `origin.y - end.y`.
    pub fn span(&self) -> f64 {
        self.origin.y - self.end.y
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
