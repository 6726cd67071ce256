//! Camera framing, zoom and shake state.
//!
//! The track only needs two things from a camera: the visible rectangle in
//! logical coordinates and the zoom level, from which the reroll cutoff is
//! derived. Those are exposed through the [`Viewport`] trait so a host camera
//! can stand in for [`Camera`].
//!
//! Shake is tracked as an intensity ramp only. Turning the intensity into
//! screen motion is the host renderer's job.

use roadgen_track::segment::Point2;
use serde::{Deserialize, Serialize};

use crate::render::Rect;

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// What the track needs to know about the camera.
pub trait Viewport {
    /// Visible rectangle in logical coordinates.
    fn area(&self) -> Rect;

    /// `(current, target)` zoom levels.
    fn zoom(&self) -> (f64, f64);

    /// Y past which a segment end counts as consumed.
    ///
    /// The bottom edge of the view, pushed further down while zoomed in so
    /// segments are not recycled while a zoom-out could still reveal them.
    fn reroll_cutoff(&self) -> f64 {
        let area = self.area();
        let (current, _) = self.zoom();
        area.max_y as f64 + area.height() as f64 * (current - 1.0)
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// A camera that centers on a target point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    width: u32,
    height: u32,
    target: Point2,
    zoom_current: f64,
    zoom_target: f64,
    zoom_rate: f64,
    shake: f64,
    shake_goal: f64,
    shake_step: f64,
}

impl Camera {
    /// Create a camera with a logical resolution of `width` x `height`.
    ///
    /// `zoom_rate` is how far the current zoom moves toward the target per
    /// [`update`](Self::update).
    pub fn new(width: u32, height: u32, zoom_rate: f64) -> Self {
        Self {
            width,
            height,
            target: Point2::default(),
            zoom_current: 1.0,
            zoom_target: 1.0,
            zoom_rate,
            shake: 0.0,
            shake_goal: 0.0,
            shake_step: 0.0,
        }
    }

    /// Center the view on `(x, y)`.
    pub fn notify_coordinates(&mut self, x: f64, y: f64) {
        self.target = Point2::new(x, y);
    }

    /// Start moving toward zoom level `target`.
    pub fn zoom_to(&mut self, target: f64) {
        self.zoom_target = target;
    }

    /// Ramp shake up to full intensity over `fade_ticks` updates.
    pub fn start_shake(&mut self, fade_ticks: u32) {
        self.set_shake_goal(1.0, fade_ticks);
    }

    /// Ramp shake down to zero over `fade_ticks` updates.
    pub fn end_shake(&mut self, fade_ticks: u32) {
        self.set_shake_goal(0.0, fade_ticks);
    }

    fn set_shake_goal(&mut self, goal: f64, fade_ticks: u32) {
        self.shake_goal = goal;
        self.shake_step = if fade_ticks == 0 {
            1.0
        } else {
            1.0 / f64::from(fade_ticks)
        };
    }

    /// Current shake intensity in `[0, 1]`.
    pub fn shake_intensity(&self) -> f64 {
        self.shake
    }

    /// Whether any shake is active or fading out.
    pub fn is_shaking(&self) -> bool {
        self.shake > 0.0
    }

    /// Advance zoom and shake by one tick.
    pub fn update(&mut self) {
        self.zoom_current = approach(self.zoom_current, self.zoom_target, self.zoom_rate);
        self.shake = approach(self.shake, self.shake_goal, self.shake_step);
    }
}

impl Viewport for Camera {
    fn area(&self) -> Rect {
        let w = (f64::from(self.width) / self.zoom_current).ceil() as i64;
        let h = (f64::from(self.height) / self.zoom_current).ceil() as i64;
        let min_x = (self.target.x - w as f64 / 2.0).floor() as i64;
        let min_y = (self.target.y - h as f64 / 2.0).floor() as i64;
        Rect::new(min_x, min_y, min_x + w, min_y + h)
    }

    fn zoom(&self) -> (f64, f64) {
        (self.zoom_current, self.zoom_target)
    }
}

fn approach(current: f64, goal: f64, step: f64) -> f64 {
    if current < goal {
        (current + step).min(goal)
    } else {
        (current - step).max(goal)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
