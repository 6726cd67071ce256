//! Point evaluation on a [`CurveSegment`].

use crate::segment::{CurveSegment, Point2};

/// Evaluate `segment` at parameter `t` in `[0, 1]`.
///
/// Uses three levels of De Casteljau interpolation over the control polygon
/// `origin`, `(origin.x, origin_control_y)`, `(end.x, end_control_y)`, `end`.
/// `t = 0` yields `origin` and `t = 1` yields `end` exactly.
pub fn evaluate(segment: &CurveSegment, t: f64) -> Point2 {
    let p0 = segment.origin;
    let p1 = Point2::new(segment.origin.x, segment.origin_control_y);
    let p2 = Point2::new(segment.end.x, segment.end_control_y);
    let p3 = segment.end;

    let q0 = lerp2(p0, p1, t);
    let q1 = lerp2(p1, p2, t);
    let q2 = lerp2(p2, p3, t);

    let r0 = lerp2(q0, q1, t);
    let r1 = lerp2(q1, q2, t);

    lerp2(r0, r1, t)
}

impl CurveSegment {
    /// See [`evaluate`].
    pub fn evaluate(&self, t: f64) -> Point2 {
        evaluate(self, t)
    }
}

fn lerp2(a: Point2, b: Point2, t: f64) -> Point2 {
    Point2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

// a + t*(b - a) is exact at t = 0 but not always at t = 1.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t == 1.0 {
        b
    } else {
        a + t * (b - a)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
