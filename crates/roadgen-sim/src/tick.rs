//! Tick-based drive loop.
//!
//! The [`DriveLoop`] owns the track, the vehicle, the camera and the seeded
//! random source. Each [`tick`](DriveLoop::tick):
//!
//! 1. The current [`InputFrame`] steers the vehicle, which then moves.
//! 2. The camera is pointed slightly ahead of the vehicle.
//! 3. The road centerline at the vehicle's y decides on-road/off-road; going
//!    off-road starts the camera shake, coming back ends it.
//! 4. A segment whose end has scrolled past the camera's reroll cutoff is
//!    regenerated ahead of the view.
//! 5. Every `zoom_period_ticks` ticks the target zoom toggles.
//! 6. Camera zoom and shake advance, and the tick counter increments.
//!
//! Rendering is separate: [`render`](DriveLoop::render) draws the current
//! state onto any [`Canvas`] and can be called at any frame rate.
//!
//! All randomness comes from a [`SeededSource`] stored in the loop, so the
//! same seed and the same inputs always produce the same track and the same
//! events.
//!
//! # Example
//!
//! ```
//! use roadgen_sim::prelude::*;
//!
//! let mut drive = DriveLoop::new(SimConfig::default()).unwrap();
//! drive.set_input(InputFrame { steering: Steering::Left });
//! drive.run_ticks(120);
//! assert_eq!(drive.tick_count(), 120);
//! assert!(drive.vehicle().cy < 0.0);
//! ```

use std::time::{Duration, Instant};

use roadgen_track::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Viewport};
use crate::render::{draw_track, Canvas, Rgb};
use crate::vehicle::{Steering, Vehicle};
use crate::SimError;

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Configuration for the drive loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Logical resolution width.
    pub width: u32,
    /// Logical resolution height. `track.viewport_height` must match it;
    /// [`with_resolution`](Self::with_resolution) keeps the two in sync.
    pub height: u32,
    /// Road width in logical units.
    pub road_width: f64,
    /// Extra clearance added to the vehicle's offset before the off-road test.
    pub vehicle_margin: f64,
    /// Ticks between zoom toggles. Zero disables the schedule.
    pub zoom_period_ticks: u64,
    /// The two zoom levels the schedule alternates between.
    pub zoom_levels: (f64, f64),
    /// Zoom change per tick while approaching a new target.
    pub zoom_rate: f64,
    /// Ticks for the shake to fade in or out.
    pub shake_fade_ticks: u32,
    /// Seed of the track generator.
    pub seed: u64,
    /// Track generation parameters.
    pub track: TrackConfig,
}

impl Default for SimConfig {
    /// 128x72 logical pixels, a 16-unit road.
    fn default() -> Self {
        Self {
            width: 128,
            height: 72,
            road_width: 16.0,
            vehicle_margin: 2.5,
            zoom_period_ticks: 600,
            zoom_levels: (1.0, 1.4),
            zoom_rate: 0.01,
            shake_fade_ticks: 20,
            seed: 0,
            track: TrackConfig::default(),
        }
    }
}

impl SimConfig {
    /// Default config at another resolution, with track curvature scaled to
    /// the new height.
    pub fn with_resolution(width: u32, height: u32) -> Self {
        let defaults = Self::default();
        Self {
            width,
            height,
            track: TrackConfig {
                viewport_height: f64::from(height),
                ..defaults.track.clone()
            },
            ..defaults
        }
    }

    /// Where the road starts: a fifth of the view height below the vehicle.
    pub fn track_start(&self) -> Point2 {
        Point2::new(0.0, f64::from(self.height) / 5.0)
    }

    /// Check every field, then the track config.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first bad field, or
    /// [`SimError::Track`] if the track config does not validate.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid(
                "width/height",
                format!("resolution must be non-zero, got {}x{}", self.width, self.height),
            ));
        }
        if !(self.road_width > 0.0 && self.road_width.is_finite()) {
            return Err(invalid(
                "road_width",
                format!("must be positive and finite, got {}", self.road_width),
            ));
        }
        if !(self.vehicle_margin >= 0.0 && self.vehicle_margin.is_finite()) {
            return Err(invalid(
                "vehicle_margin",
                format!("must be non-negative and finite, got {}", self.vehicle_margin),
            ));
        }
        let (near, far) = self.zoom_levels;
        for (field, value) in [
            ("zoom_levels", near),
            ("zoom_levels", far),
            ("zoom_rate", self.zoom_rate),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(invalid(
                    field,
                    format!("must be positive and finite, got {value}"),
                ));
            }
        }
        if self.track.viewport_height != f64::from(self.height) {
            return Err(invalid(
                "track.viewport_height",
                format!(
                    "must equal height {}, got {}",
                    self.height, self.track.viewport_height
                ),
            ));
        }
        self.track.validate()?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> SimError {
    SimError::InvalidConfig { field, reason }
}

// ---------------------------------------------------------------------------
// InputFrame
// ---------------------------------------------------------------------------

/// Input for a single tick, recorded for replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Steering held during this tick.
    pub steering: Steering,
}

// ---------------------------------------------------------------------------
// DriveEvent
// ---------------------------------------------------------------------------

/// Something notable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriveEvent {
    /// The vehicle left the drivable lane.
    LeftRoad {
        /// Tick at which it happened.
        tick: u64,
        /// Horizontal distance from the centerline.
        offset: f64,
    },
    /// The vehicle is back on the road.
    ReturnedToRoad {
        /// Tick at which it happened.
        tick: u64,
    },
    /// A consumed segment was regenerated ahead of the view.
    SegmentRerolled {
        /// Tick at which it happened.
        tick: u64,
        /// The slot that was rerolled.
        slot: SegmentSlot,
    },
    /// The zoom schedule picked a new target.
    ZoomChanged {
        /// Tick at which it happened.
        tick: u64,
        /// The new target zoom.
        target: f64,
    },
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing diagnostics for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per phase, in execution order.
    pub phase_times: Vec<(&'static str, Duration)>,
    /// Total time for the tick.
    pub total_time: Duration,
}

// ---------------------------------------------------------------------------
// DriveLoop
// ---------------------------------------------------------------------------

/// The deterministic driving simulation.
pub struct DriveLoop {
    pub(crate) config: SimConfig,
    pub(crate) track: TrackManager,
    pub(crate) rng: SeededSource,
    pub(crate) vehicle: Vehicle,
    pub(crate) camera: Camera,
    pub(crate) tick_counter: u64,
    pub(crate) off_road: bool,
    pub(crate) current_input: InputFrame,
    pub(crate) last_diagnostics: TickDiagnostics,
}

impl DriveLoop {
    /// Create a drive loop from `config`.
    ///
    /// The vehicle starts at the origin and the road a fifth of the view
    /// height below it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] or [`SimError::Track`] if the
    /// config does not validate, or [`SimError::Track`] if the initial track
    /// cannot be rasterized.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mut rng = SeededSource::new(config.seed);
        let track = TrackManager::new(config.track.clone(), config.track_start(), &mut rng)?;
        let camera = Camera::new(config.width, config.height, config.zoom_rate);

        Ok(Self {
            track,
            rng,
            vehicle: Vehicle::new(0.0, 0.0),
            camera,
            tick_counter: 0,
            off_road: false,
            current_input: InputFrame::default(),
            last_diagnostics: TickDiagnostics::default(),
            config,
        })
    }

    /// Execute one simulation tick and return the events it produced.
    pub fn tick(&mut self) -> Vec<DriveEvent> {
        let tick_start = Instant::now();
        let tick = self.tick_counter;
        let mut events = Vec::new();
        let mut phase_times = Vec::with_capacity(4);

        // Phase 1: steer and move.
        let phase = Instant::now();
        self.vehicle.steer(self.current_input.steering);
        self.vehicle.advance();
        let lead = f64::from(self.config.height) / 6.0;
        self.camera
            .notify_coordinates(self.vehicle.cx, self.vehicle.cy - lead);
        phase_times.push(("movement", phase.elapsed()));

        // Phase 2: off-road detection.
        let phase = Instant::now();
        let offset = (self.track.closest_x(self.vehicle.cy) - self.vehicle.cx).abs();
        let off_road = offset + self.config.vehicle_margin > self.config.road_width / 2.0;
        if off_road {
            self.camera.start_shake(self.config.shake_fade_ticks);
        } else {
            self.camera.end_shake(self.config.shake_fade_ticks);
        }
        if off_road != self.off_road {
            if off_road {
                tracing::info!(tick, offset, "vehicle left the road");
                events.push(DriveEvent::LeftRoad { tick, offset });
            } else {
                tracing::info!(tick, "vehicle back on the road");
                events.push(DriveEvent::ReturnedToRoad { tick });
            }
            self.off_road = off_road;
        }
        phase_times.push(("off_road", phase.elapsed()));

        // Phase 3: recycle consumed segments.
        let phase = Instant::now();
        let cutoff = self.camera.reroll_cutoff();
        if let Some(slot) = self.track.advance_if_needed(cutoff, &mut self.rng) {
            events.push(DriveEvent::SegmentRerolled { tick, slot });
        }
        phase_times.push(("reroll", phase.elapsed()));

        // Phase 4: zoom schedule and camera animation.
        let phase = Instant::now();
        let period = self.config.zoom_period_ticks;
        if period > 0 && tick > 0 && tick % period == 0 {
            let (near, far) = self.config.zoom_levels;
            let (_, current_target) = self.camera.zoom();
            let target = if current_target == near { far } else { near };
            self.camera.zoom_to(target);
            tracing::debug!(tick, target, "zoom target changed");
            events.push(DriveEvent::ZoomChanged { tick, target });
        }
        self.camera.update();
        phase_times.push(("camera", phase.elapsed()));

        self.tick_counter += 1;
        self.last_diagnostics = TickDiagnostics {
            phase_times,
            total_time: tick_start.elapsed(),
        };

        events
    }

    /// Run `count` ticks with the current input. Returns all events in order.
    pub fn run_ticks(&mut self, count: u64) -> Vec<DriveEvent> {
        let mut events = Vec::new();
        for _ in 0..count {
            events.extend(self.tick());
        }
        events
    }

    /// Draw the visible road and the vehicle onto `canvas`.
    ///
    /// The canvas is addressed relative to the camera's visible area.
    ///
    /// # Errors
    ///
    /// Propagates [`TrackError::StepTooCoarse`] from the rasterizer.
    pub fn render(&self, canvas: &mut impl Canvas) -> Result<(), TrackError> {
        let area = self.camera.area();
        canvas.fill(Rgb::BACKGROUND);
        draw_track(
            &self.track,
            area,
            self.config.road_width,
            Rgb::ROAD,
            canvas,
        )?;
        canvas.fill_rect(self.vehicle.body_rect(area), Rgb::VEHICLE);
        Ok(())
    }

    // -- accessors ----------------------------------------------------------

    /// The number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// The loop configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The live track.
    pub fn track(&self) -> &TrackManager {
        &self.track
    }

    /// The vehicle.
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Whether the vehicle was off-road at the end of the last tick.
    pub fn is_off_road(&self) -> bool {
        self.off_road
    }

    /// Set the input frame used by subsequent ticks.
    pub fn set_input(&mut self, input: InputFrame) {
        self.current_input = input;
    }

    /// The input frame used by the next tick.
    pub fn current_input(&self) -> &InputFrame {
        &self.current_input
    }

    /// Diagnostics from the last tick.
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
