//! Track generation parameters.
//!
//! [`TrackConfig`] ties the shape of generated segments to the logical
//! viewport height and fixes the sampling steps used by the rasterizer and
//! the closest-point locator. The viewport height is a parameter rather than
//! a constant so curvature can follow the runtime resolution.

use serde::{Deserialize, Serialize};

use crate::TrackError;

/// Largest `|dy/dt|` of a segment per unit of vertical span.
///
/// A cubic Bézier derivative is bounded by three times its largest control
/// polygon leg, and rerolled control points are at most 75% of the span away
/// from their neighbours.
pub(crate) const MAX_SLOPE_PER_SPAN: f64 = 3.0 * 0.75;

// ---------------------------------------------------------------------------
// TrackConfig
// ---------------------------------------------------------------------------

/// Configuration for segment generation and sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Viewport height in logical units. Every segment spans more than this.
    pub viewport_height: f64,
    /// Maximum lateral offset of a segment end relative to its origin.
    pub lateral_range: f64,
    /// Parameter step of the scanline rasterizer.
    pub raster_step: f64,
    /// Parameter step of the closest-point locator.
    pub locate_step: f64,
}

impl Default for TrackConfig {
    /// A 72-unit-tall viewport with the reference sampling steps.
    fn default() -> Self {
        Self {
            viewport_height: 72.0,
            lateral_range: 24.0,
            raster_step: 0.002,
            locate_step: 0.003,
        }
    }
}

impl TrackConfig {
    /// Parse a config from JSON. Missing fields take their default values.
    ///
    /// The parsed config is validated before it is returned.
    pub fn from_json_str(json: &str) -> Result<Self, TrackError> {
        let config: TrackConfig =
            serde_json::from_str(json).map_err(|e| TrackError::InvalidConfig {
                field: "json",
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// The largest vertical span a rerolled segment can have.
    pub fn max_segment_span(&self) -> f64 {
        let h = self.viewport_height;
        h + 2.0 + (h / 3.0).floor()
    }

    /// Check that every field is usable and that the rasterizer step is fine
    /// enough for the steepest segment this config can generate.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), TrackError> {
        if !(self.viewport_height > 0.0 && self.viewport_height.is_finite()) {
            return Err(invalid(
                "viewport_height",
                format!("must be positive and finite, got {}", self.viewport_height),
            ));
        }
        if !(self.lateral_range >= 0.0 && self.lateral_range.is_finite()) {
            return Err(invalid(
                "lateral_range",
                format!("must be non-negative and finite, got {}", self.lateral_range),
            ));
        }
        for (field, step) in [
            ("raster_step", self.raster_step),
            ("locate_step", self.locate_step),
        ] {
            if !(step > 0.0 && step <= 1.0) {
                return Err(invalid(field, format!("must be in (0, 1], got {step}")));
            }
        }

        // One raster step must never move the curve by a whole scanline.
        let max_dy_per_step = MAX_SLOPE_PER_SPAN * self.max_segment_span() * self.raster_step;
        if max_dy_per_step >= 1.0 {
            return Err(invalid(
                "raster_step",
                format!(
                    "step {} can move {max_dy_per_step:.3} scanlines per sample for a viewport height of {}",
                    self.raster_step, self.viewport_height
                ),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> TrackError {
    TrackError::InvalidConfig { field, reason }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
