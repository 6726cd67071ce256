//! Scanline rasterization of a [`CurveSegment`].
//!
//! Scanline `n` covers `[n, n + 1)` and is centered at `n + 0.5`. For every
//! scanline from `ceil(origin.y)` down to `floor(end.y)` the rasterizer emits
//! the x of the sampled curve point nearest to that scanline's center. The
//! renderer turns each x into a horizontal road span.
//!
//! # Algorithm
//!
//! The curve is walked at a fixed parameter step through a two-slot sliding
//! window:
//!
//! - slot `a` holds the best sample so far for the scanline being finalized;
//! - slot `b` holds the best sample so far for the scanline below it.
//!
//! A sample that improves `a` is adopted by `a` and carried into `b`. The
//! first sample that does not improve `a` finalizes it: `a` is emitted, the
//! sample is offered to `b`, `b` becomes the new `a`, and a fresh `b` is
//! seeded from the sample for the next scanline down.
//!
//! Segments are strictly monotonic in y, so the window only ever moves down,
//! one scanline per rejected sample. The window may trail the samples by a
//! line at the top of the range and catches up as long as every scanline
//! receives at least one sample. When two consecutive samples straddle a
//! whole scanline the step is too coarse for the segment's curvature: the
//! walk stops with [`TrackError::StepTooCoarse`].

use std::iter::FusedIterator;

use crate::sampler::evaluate;
use crate::segment::{CurveSegment, Point2};
use crate::TrackError;

// ---------------------------------------------------------------------------
// Scanline
// ---------------------------------------------------------------------------

/// The road centerline x on one integer scanline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scanline {
    /// Curve x nearest to the scanline center.
    pub x: f64,
    /// Scanline index.
    pub y: i64,
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// Best sample so far for one scanline.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    line: i64,
    x: f64,
    dist: f64,
}

impl Candidate {
    fn seeded(line: i64, p: Point2) -> Self {
        Self {
            line,
            x: p.x,
            dist: (center(line) - p.y).abs(),
        }
    }

    /// Adopt `p` if it is at least as close to this scanline's center.
    fn offer(&mut self, p: Point2) -> bool {
        let dist = (center(self.line) - p.y).abs();
        if dist <= self.dist {
            self.x = p.x;
            self.dist = dist;
            true
        } else {
            false
        }
    }

    fn adopt(&mut self, p: Point2) {
        self.x = p.x;
        self.dist = (center(self.line) - p.y).abs();
    }

    fn emit(&self) -> Scanline {
        Scanline {
            x: self.x,
            y: self.line,
        }
    }
}

fn center(line: i64) -> f64 {
    line as f64 + 0.5
}

// ---------------------------------------------------------------------------
// Scanlines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    /// Sampling the curve through the window.
    Walking,
    /// Sampling finished above the last scanline; the rest get `end.x`.
    Draining { next_line: i64 },
    Done,
}

/// Lazy iterator over the scanlines of one segment, top of the range last.
///
/// Yields `Ok(Scanline)` in strictly decreasing `y`, or a single
/// `Err(TrackError::StepTooCoarse)` after which it is exhausted. Create a new
/// iterator with [`scanlines`] to restart.
#[derive(Debug, Clone)]
pub struct Scanlines {
    segment: CurveSegment,
    steps: u32,
    next_step: u32,
    prev_y: f64,
    last_line: i64,
    a: Candidate,
    b: Candidate,
    state: WalkState,
}

/// Rasterize `segment` with parameter step `step`.
///
/// `step` is rounded to the nearest `1/n`, so the walk always ends exactly on
/// `t = 1`.
pub fn scanlines(segment: &CurveSegment, step: f64) -> Scanlines {
    let steps = (1.0 / step).round().max(1.0) as u32;
    let first_line = segment.origin.y.ceil() as i64;
    Scanlines {
        segment: *segment,
        steps,
        next_step: 1,
        prev_y: segment.origin.y,
        last_line: segment.end.y.floor() as i64,
        a: Candidate::seeded(first_line, segment.origin),
        b: Candidate::seeded(first_line - 1, segment.origin),
        state: WalkState::Walking,
    }
}

/// Rasterize `segment` eagerly.
///
/// # Errors
///
/// Returns [`TrackError::StepTooCoarse`] if `step` skips a scanline.
pub fn collect_scanlines(segment: &CurveSegment, step: f64) -> Result<Vec<Scanline>, TrackError> {
    scanlines(segment, step).collect()
}

impl CurveSegment {
    /// See [`scanlines`].
    pub fn scanlines(&self, step: f64) -> Scanlines {
        scanlines(self, step)
    }
}

impl Scanlines {
    /// Finalize `a` and slide the window down by one scanline.
    fn roll(&mut self, p: Point2) -> Scanline {
        let out = self.a.emit();
        self.b.offer(p);
        self.a = self.b;
        self.b = Candidate::seeded(self.a.line - 1, p);
        out
    }

    /// Fail if no sample landed on some scanline between `prev_y` and `y`.
    fn check_gap(&self, y: f64) -> Result<(), TrackError> {
        let skipped = self.prev_y.floor() - 1.0;
        if y < skipped {
            tracing::warn!(
                scanline = skipped as i64,
                sample_y = y,
                steps = self.steps,
                "rasterizer step skipped a whole scanline"
            );
            return Err(TrackError::StepTooCoarse {
                scanline: skipped as i64,
                sample_y: y,
            });
        }
        Ok(())
    }
}

impl Iterator for Scanlines {
    type Item = Result<Scanline, TrackError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                WalkState::Done => return None,
                WalkState::Draining { next_line } => {
                    if next_line < self.last_line {
                        self.state = WalkState::Done;
                        return None;
                    }
                    self.state = WalkState::Draining {
                        next_line: next_line - 1,
                    };
                    return Some(Ok(Scanline {
                        x: self.segment.end.x,
                        y: next_line,
                    }));
                }
                WalkState::Walking => {}
            }

            if self.next_step > self.steps {
                let out = self.a.emit();
                self.state = if self.a.line > self.last_line {
                    WalkState::Draining {
                        next_line: self.a.line - 1,
                    }
                } else {
                    WalkState::Done
                };
                return Some(Ok(out));
            }

            let t = f64::from(self.next_step) / f64::from(self.steps);
            self.next_step += 1;
            let p = evaluate(&self.segment, t);
            if let Err(e) = self.check_gap(p.y) {
                self.state = WalkState::Done;
                return Some(Err(e));
            }
            self.prev_y = p.y;

            if self.a.offer(p) {
                self.b.adopt(p);
                continue;
            }

            if self.a.line <= self.last_line {
                self.state = WalkState::Done;
                return Some(Ok(self.a.emit()));
            }

            return Some(Ok(self.roll(p)));
        }
    }
}

impl FusedIterator for Scanlines {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackConfig;
    use crate::random::{FixedSource, SeededSource};

    const STEP: f64 = 0.002;

    fn segment_from(origin: Point2, seed: u64) -> CurveSegment {
        CurveSegment::rerolled(origin, &TrackConfig::default(), &mut SeededSource::new(seed))
    }

    fn assert_covers_range(segment: &CurveSegment, lines: &[Scanline]) {
        let first = segment.origin.y.ceil() as i64;
        let last = segment.end.y.floor() as i64;
        let ys: Vec<i64> = lines.iter().map(|l| l.y).collect();
        let expected: Vec<i64> = (last..=first).rev().collect();
        assert_eq!(ys, expected);
    }

    #[test]
    fn covers_every_scanline_once() {
        for seed in 0..40 {
            let s = segment_from(Point2::new(0.0, 14.4), seed);
            let lines = collect_scanlines(&s, STEP).unwrap();
            assert_covers_range(&s, &lines);
        }
    }

    #[test]
    fn integer_origin_starts_on_its_own_scanline() {
        let s = segment_from(Point2::new(2.0, 0.0), 1);
        let lines = collect_scanlines(&s, STEP).unwrap();
        assert_eq!(lines[0], Scanline { x: 2.0, y: 0 });
        assert_covers_range(&s, &lines);
    }

    #[test]
    fn endpoints_emit_endpoint_x() {
        let s = segment_from(Point2::new(-7.0, 30.25), 9);
        let lines = collect_scanlines(&s, STEP).unwrap();
        assert_eq!(lines.first().unwrap().x, s.origin.x);
        let last = lines.last().unwrap();
        assert!((last.x - s.end.x).abs() < 0.5);
    }

    #[test]
    fn straight_segment_emits_constant_x() {
        let s = CurveSegment::rerolled(
            Point2::new(5.0, 0.0),
            &TrackConfig::default(),
            &mut FixedSource::new(0.5),
        );
        let lines = collect_scanlines(&s, STEP).unwrap();
        assert_eq!(lines.len(), 87);
        assert!(lines.iter().all(|l| l.x == 5.0));
    }

    #[test]
    fn emitted_x_is_near_the_curve_at_the_center() {
        let s = segment_from(Point2::new(0.0, 0.0), 17);
        for line in collect_scanlines(&s, STEP).unwrap() {
            let c = line.y as f64 + 0.5;
            if !s.contains_y(c) {
                continue;
            }
            let reference = crate::locate::closest_x(&s, c, 0.0001);
            assert!(
                (line.x - reference).abs() < 0.2,
                "scanline {} x {} vs {}",
                line.y,
                line.x,
                reference
            );
        }
    }

    #[test]
    fn origin_just_above_a_scanline_boundary() {
        // The window starts a line behind the samples here and must catch up.
        for seed in 0..20 {
            let s = segment_from(Point2::new(0.0, 14.05), seed);
            let lines = collect_scanlines(&s, STEP).unwrap();
            assert_covers_range(&s, &lines);
            assert_eq!(lines[0].x, s.origin.x);
            assert_eq!(lines[1].x, s.origin.x);
        }
    }

    #[test]
    fn restartable() {
        let s = segment_from(Point2::new(1.0, 3.0), 2);
        let first: Vec<_> = s.scanlines(STEP).collect();
        let second: Vec<_> = s.scanlines(STEP).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn coarse_step_is_reported_once() {
        let s = segment_from(Point2::new(0.0, 0.0), 3);
        let results: Vec<_> = s.scanlines(0.1).collect();
        let last = results.last().unwrap();
        assert!(matches!(last, Err(TrackError::StepTooCoarse { .. })));
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);

        let mut iter = s.scanlines(0.1);
        for r in iter.by_ref() {
            if r.is_err() {
                break;
            }
        }
        assert!(iter.next().is_none());
    }
}
