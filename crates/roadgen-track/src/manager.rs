//! The two-segment track state machine.
//!
//! A [`TrackManager`] owns exactly two [`CurveSegment`]s. One of them is
//! chained from the other's end at all times. When a segment's end scrolls
//! past the reroll cutoff it has been fully consumed, and it is regenerated
//! as a new continuation of the other segment. Recycling the pair
//! indefinitely makes the road endless.

use serde::{Deserialize, Serialize};

use crate::config::TrackConfig;
use crate::locate::closest_x;
use crate::random::UniformSource;
use crate::raster::{scanlines, Scanlines};
use crate::segment::{CurveSegment, Point2};
use crate::TrackError;

// ---------------------------------------------------------------------------
// SegmentSlot
// ---------------------------------------------------------------------------

/// Which of the two segments a query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentSlot {
    /// The first segment. Wins ties.
    A,
    /// The second segment.
    B,
}

impl SegmentSlot {
    /// The other slot.
    pub fn other(self) -> Self {
        match self {
            SegmentSlot::A => SegmentSlot::B,
            SegmentSlot::B => SegmentSlot::A,
        }
    }

    fn index(self) -> usize {
        match self {
            SegmentSlot::A => 0,
            SegmentSlot::B => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// TrackManager
// ---------------------------------------------------------------------------

/// Owns the two live segments and recycles them as the view scrolls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackManager {
    config: TrackConfig,
    segments: [CurveSegment; 2],
}

impl TrackManager {
    /// Build a track starting at `start`.
    ///
    /// Segment A is rerolled from `start` with its end pinned straight above
    /// the start, then segment B is chained from A's end. Both segments are
    /// rasterized once so a step/curvature mismatch aborts construction
    /// instead of surfacing mid-frame.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidConfig`] if the config does not validate,
    /// or [`TrackError::StepTooCoarse`] if either initial segment cannot be
    /// rasterized.
    pub fn new(
        config: TrackConfig,
        start: Point2,
        rng: &mut impl UniformSource,
    ) -> Result<Self, TrackError> {
        config.validate()?;

        let mut a = CurveSegment::rerolled(start, &config, rng);
        a.end.x = start.x;
        let b = CurveSegment::rerolled(a.end, &config, rng);

        let track = Self {
            config,
            segments: [a, b],
        };
        for line in track.scanlines() {
            line?;
        }

        tracing::debug!(
            start_x = start.x,
            start_y = start.y,
            a_end_y = track.segments[0].end.y,
            b_end_y = track.segments[1].end.y,
            "track initialized"
        );
        Ok(track)
    }

    /// Build a track from two explicit segments, e.g. when restoring state.
    ///
    /// The pair gets the same checks as a generated track: each segment must
    /// run upward with finite coordinates, one must chain from the other's
    /// end, and both must rasterize with the configured step.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidConfig`] if the config does not validate,
    /// [`TrackError::InvalidTrack`] if the segments are malformed or detached,
    /// or [`TrackError::StepTooCoarse`] if either cannot be rasterized.
    pub fn from_segments(
        config: TrackConfig,
        a: CurveSegment,
        b: CurveSegment,
    ) -> Result<Self, TrackError> {
        config.validate()?;

        for (slot, segment) in [(SegmentSlot::A, &a), (SegmentSlot::B, &b)] {
            let finite = [
                segment.origin.x,
                segment.origin.y,
                segment.end.x,
                segment.end.y,
                segment.origin_control_y,
                segment.end_control_y,
            ]
            .iter()
            .all(|v| v.is_finite());
            if !finite {
                return Err(invalid_track(format!(
                    "segment {slot:?} has a non-finite coordinate"
                )));
            }
            if segment.end.y >= segment.origin.y {
                return Err(invalid_track(format!(
                    "segment {slot:?} ends at y = {} which is not above its origin y = {}",
                    segment.end.y, segment.origin.y
                )));
            }
        }
        if a.end != b.origin && b.end != a.origin {
            return Err(invalid_track(
                "neither segment starts at the other's end".to_owned(),
            ));
        }

        let track = Self {
            config,
            segments: [a, b],
        };
        for line in track.scanlines() {
            line?;
        }
        Ok(track)
    }

    // -- queries -----------------------------------------------------------

    /// The segment that contains `y`.
    ///
    /// Segment A is checked first. If neither contains `y` (the agent can sit
    /// a tiny numeric distance outside both ranges for a tick), the segment
    /// whose range is nearest wins, again preferring A on ties.
    pub fn active_segment_at(&self, y: f64) -> (SegmentSlot, &CurveSegment) {
        for slot in [SegmentSlot::A, SegmentSlot::B] {
            let segment = self.segment(slot);
            if segment.contains_y(y) {
                return (slot, segment);
            }
        }

        let da = self.segments[0].distance_to_y(y);
        let db = self.segments[1].distance_to_y(y);
        let slot = if db < da { SegmentSlot::B } else { SegmentSlot::A };
        tracing::warn!(
            y,
            distance = da.min(db),
            ?slot,
            "no segment contains y, using the nearest"
        );
        (slot, self.segment(slot))
    }

    /// Road centerline x at `y`, taken from the active segment.
    pub fn closest_x(&self, y: f64) -> f64 {
        let (_, segment) = self.active_segment_at(y);
        closest_x(segment, y, self.config.locate_step)
    }

    /// Scanlines of segment A followed by those of segment B.
    pub fn scanlines(&self) -> std::iter::Chain<Scanlines, Scanlines> {
        let step = self.config.raster_step;
        scanlines(&self.segments[0], step).chain(scanlines(&self.segments[1], step))
    }

    // -- lifecycle ---------------------------------------------------------

    /// Reroll a consumed segment if one has scrolled past `cutoff_y`.
    ///
    /// If A's end lies below the cutoff (`end.y > cutoff_y`), A is rerolled
    /// from B's end; otherwise the same check is made for B. At most one
    /// segment is rerolled per call. Returns the rerolled slot.
    pub fn advance_if_needed(
        &mut self,
        cutoff_y: f64,
        rng: &mut impl UniformSource,
    ) -> Option<SegmentSlot> {
        let slot = [SegmentSlot::A, SegmentSlot::B]
            .into_iter()
            .find(|slot| self.segment(*slot).end.y > cutoff_y)?;

        let origin = self.segment(slot.other()).end;
        let segment = &mut self.segments[slot.index()];
        segment.reroll(origin, &self.config, rng);

        tracing::debug!(
            ?slot,
            origin_x = origin.x,
            origin_y = origin.y,
            end_x = segment.end.x,
            end_y = segment.end.y,
            "segment rerolled"
        );
        Some(slot)
    }

    // -- accessors ---------------------------------------------------------

    /// The segment in `slot`.
    pub fn segment(&self, slot: SegmentSlot) -> &CurveSegment {
        &self.segments[slot.index()]
    }

    /// Both segments, A first.
    pub fn segments(&self) -> &[CurveSegment; 2] {
        &self.segments
    }

    /// The generation config.
    pub fn config(&self) -> &TrackConfig {
        &self.config
    }
}

fn invalid_track(reason: String) -> TrackError {
    tracing::warn!(%reason, "rejected explicit segments");
    TrackError::InvalidTrack { reason }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FixedSource, SeededSource};

    fn new_track(seed: u64) -> (TrackManager, SeededSource) {
        let mut rng = SeededSource::new(seed);
        let track =
            TrackManager::new(TrackConfig::default(), Point2::new(0.0, 14.4), &mut rng).unwrap();
        (track, rng)
    }

    // -- 1. Construction ----------------------------------------------------

    #[test]
    fn initial_segments_are_chained() {
        let (track, _) = new_track(1);
        let a = track.segment(SegmentSlot::A);
        let b = track.segment(SegmentSlot::B);
        assert_eq!(a.origin, Point2::new(0.0, 14.4));
        assert_eq!(a.end.x, 0.0);
        assert_eq!(b.origin, a.end);
    }

    #[test]
    fn invalid_config_aborts_construction() {
        let config = TrackConfig {
            viewport_height: 480.0,
            ..Default::default()
        };
        let err = TrackManager::new(config, Point2::default(), &mut FixedSource::new(0.5))
            .unwrap_err();
        assert!(matches!(err, TrackError::InvalidConfig { field: "raster_step", .. }));
    }

    #[test]
    fn from_segments_accepts_a_generated_pair() {
        let (track, _) = new_track(9);
        let [a, b] = *track.segments();
        let rebuilt = TrackManager::from_segments(TrackConfig::default(), a, b).unwrap();
        assert_eq!(rebuilt, track);

        // Either order of chaining is a valid track.
        assert!(TrackManager::from_segments(TrackConfig::default(), b, a).is_ok());
    }

    #[test]
    fn from_segments_rejects_detached_pair() {
        let (track, _) = new_track(10);
        let [a, mut b] = *track.segments();
        b.origin.y += 0.5;
        let err = TrackManager::from_segments(TrackConfig::default(), a, b).unwrap_err();
        assert!(matches!(err, TrackError::InvalidTrack { .. }));
    }

    #[test]
    fn from_segments_rejects_downward_segment() {
        let (track, _) = new_track(11);
        let [mut a, b] = *track.segments();
        std::mem::swap(&mut a.origin, &mut a.end);
        let err = TrackManager::from_segments(TrackConfig::default(), a, b).unwrap_err();
        assert!(err.to_string().contains("segment A ends at"));
    }

    #[test]
    fn from_segments_rejects_non_finite_points() {
        let (track, _) = new_track(12);
        let [a, mut b] = *track.segments();
        b.end_control_y = f64::NAN;
        let err = TrackManager::from_segments(TrackConfig::default(), a, b).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn from_segments_rejects_unrasterizable_pair() {
        let (track, _) = new_track(13);
        let [a, mut b] = *track.segments();
        // A segment far taller than any reroll outruns the raster step.
        b.end.y = b.origin.y - 5_000.0;
        b.origin_control_y = b.origin.y - 3_500.0;
        b.end_control_y = b.end.y + 3_500.0;
        let err = TrackManager::from_segments(TrackConfig::default(), a, b).unwrap_err();
        assert!(matches!(err, TrackError::StepTooCoarse { .. }));
    }

    // -- 2. Active segment --------------------------------------------------

    #[test]
    fn active_segment_prefers_a_at_the_junction() {
        let (track, _) = new_track(2);
        let junction = track.segment(SegmentSlot::A).end.y;
        assert_eq!(track.active_segment_at(junction).0, SegmentSlot::A);
        assert_eq!(track.active_segment_at(junction - 1.0).0, SegmentSlot::B);
        assert_eq!(track.active_segment_at(junction + 1.0).0, SegmentSlot::A);
    }

    #[test]
    fn active_segment_outside_both_ranges_uses_nearest() {
        let (track, _) = new_track(3);
        let top = track.segment(SegmentSlot::B).end.y;
        let bottom = track.segment(SegmentSlot::A).origin.y;
        assert_eq!(track.active_segment_at(top - 0.01).0, SegmentSlot::B);
        assert_eq!(track.active_segment_at(bottom + 0.01).0, SegmentSlot::A);
    }

    #[test]
    fn closest_x_at_start_is_start_x() {
        let (track, _) = new_track(4);
        assert_eq!(track.closest_x(14.4), 0.0);
    }

    // -- 3. Advancing -------------------------------------------------------

    #[test]
    fn no_reroll_while_both_ends_are_above_cutoff() {
        let (mut track, mut rng) = new_track(5);
        let before = track.clone();
        assert_eq!(track.advance_if_needed(100.0, &mut rng), None);
        assert_eq!(track, before);
    }

    #[test]
    fn consumed_segment_is_chained_from_the_other() {
        let (mut track, mut rng) = new_track(6);
        let a_end = track.segment(SegmentSlot::A).end.y;

        let rerolled = track.advance_if_needed(a_end - 0.5, &mut rng);
        assert_eq!(rerolled, Some(SegmentSlot::A));

        let a = track.segment(SegmentSlot::A);
        let b = track.segment(SegmentSlot::B);
        assert_eq!(a.origin, b.end);
        assert!(a.end.y < b.end.y);
    }

    #[test]
    fn only_one_segment_rerolls_per_call() {
        let (mut track, mut rng) = new_track(7);
        let b_before = *track.segment(SegmentSlot::B);
        // Both ends are below this cutoff; only A may move.
        assert_eq!(track.advance_if_needed(-10_000.0, &mut rng), Some(SegmentSlot::A));
        assert_eq!(*track.segment(SegmentSlot::B), b_before);
    }

    #[test]
    fn ping_pong_keeps_junctions_exact() {
        let (mut track, mut rng) = new_track(8);
        let mut cutoff = 0.0;
        let mut rerolls = Vec::new();
        for _ in 0..2_000 {
            cutoff -= 1.0;
            if let Some(slot) = track.advance_if_needed(cutoff, &mut rng) {
                let seg = track.segment(slot);
                let other = track.segment(slot.other());
                assert_eq!(seg.origin, other.end);
                rerolls.push(slot);
            }
        }
        assert!(rerolls.len() >= 10);
        for pair in rerolls.windows(2) {
            assert_ne!(pair[0], pair[1], "segments must alternate");
        }
    }
}
