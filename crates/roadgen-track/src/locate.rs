//! Closest-point queries used for off-road detection.
//!
//! Segments are strictly monotonic in y, so a brute-force scan over evenly
//! spaced parameter samples has a single global minimum to find. A finer step
//! trades cost for accuracy predictably.

use crate::sampler::evaluate;
use crate::segment::CurveSegment;

/// X of the sampled curve point whose y is nearest to `target_y`.
///
/// Samples `t = i/n` for `i = 0..=n` with `n = round(1/step)`; the first
/// sample wins ties. `target_y` need not lie inside the segment: outside the
/// range the nearest endpoint's x is returned. Check
/// [`CurveSegment::contains_y`] first when that matters.
pub fn closest_x(segment: &CurveSegment, target_y: f64, step: f64) -> f64 {
    let steps = (1.0 / step).round().max(1.0) as u32;

    let mut best_x = segment.origin.x;
    let mut min_dist = (segment.origin.y - target_y).abs();
    for i in 1..=steps {
        let p = evaluate(segment, f64::from(i) / f64::from(steps));
        let dist = (p.y - target_y).abs();
        if dist < min_dist {
            best_x = p.x;
            min_dist = dist;
        }
    }
    best_x
}

impl CurveSegment {
    /// See [`closest_x`].
    pub fn closest_x(&self, target_y: f64, step: f64) -> f64 {
        closest_x(self, target_y, step)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
