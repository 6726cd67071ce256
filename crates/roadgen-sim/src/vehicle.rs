//! The driving agent.
//!
//! The vehicle always moves forward (toward decreasing y). Steering turns a
//! wheel in `[-1, 1]`; a full turn angles the heading 45 degrees off
//! vertical. Horizontal speed is higher than vertical speed, so steering has
//! a visible effect at the small logical resolutions the track targets.

use serde::{Deserialize, Serialize};

use crate::render::Rect;

/// Wheel change per tick while a steering key is held.
pub const WHEEL_RATE: f64 = 0.01;
/// Distance covered per tick along x at a heading of 0 degrees.
pub const SPEED_X: f64 = 0.4;
/// Distance covered per tick along y at a heading of 90 degrees.
pub const SPEED_Y: f64 = 0.23;
/// Half of the vehicle body's width.
pub const HALF_WIDTH: f64 = 3.0;
/// Half of the vehicle body's height.
pub const HALF_HEIGHT: f64 = 4.0;

// ---------------------------------------------------------------------------
// Steering
// ---------------------------------------------------------------------------

/// Steering input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Steering {
    /// No key held; the wheel keeps its position.
    #[default]
    None,
    /// Turn the wheel left.
    Left,
    /// Turn the wheel right.
    Right,
}

// ---------------------------------------------------------------------------
// Vehicle
// ---------------------------------------------------------------------------

/// Position and wheel state of the car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Center x.
    pub cx: f64,
    /// Center y.
    pub cy: f64,
    /// Wheel position in `[-1, 1]`; negative steers left.
    pub wheel: f64,
}

impl Vehicle {
    /// A vehicle at `(cx, cy)` with a centered wheel.
    pub fn new(cx: f64, cy: f64) -> Self {
        Self { cx, cy, wheel: 0.0 }
    }

    /// Apply one tick of steering input.
    pub fn steer(&mut self, steering: Steering) {
        match steering {
            Steering::None => {}
            Steering::Left => self.wheel = (self.wheel - WHEEL_RATE).max(-1.0),
            Steering::Right => self.wheel = (self.wheel + WHEEL_RATE).min(1.0),
        }
    }

    /// Heading in degrees; 90 is straight up the track.
    pub fn heading_degrees(&self) -> f64 {
        90.0 - self.wheel * 45.0
    }

    /// Move one tick along the current heading.
    pub fn advance(&mut self) {
        let (dy, dx) = self.heading_degrees().to_radians().sin_cos();
        self.cx += dx * SPEED_X;
        self.cy -= dy * SPEED_Y;
    }

    /// Body rectangle in canvas coordinates relative to `area`.
    pub fn body_rect(&self, area: Rect) -> Rect {
        let left = (self.cx - HALF_WIDTH).round() as i64 - area.min_x;
        let top = (self.cy - HALF_HEIGHT).round() as i64 - area.min_y;
        Rect::new(
            left,
            top,
            left + (2.0 * HALF_WIDTH) as i64,
            top + (2.0 * HALF_HEIGHT) as i64,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
