//! Flat-color drawing of the road onto a [`Canvas`].
//!
//! The simulation never talks to a GPU. Drawing goes through the [`Canvas`]
//! trait, which only needs to fill integer rectangles with a flat color. The
//! host supplies a canvas sized to the camera's visible area; coordinates
//! passed to it are relative to that area's top-left corner.
//!
//! [`FrameBuffer`] is a software canvas used by tests and the headless demo.
//!
//! # Colors
//!
//! | Element | Color |
//! |---------|-------|
//! | Background | Green (#7EE081) |
//! | Road | Near-black (#191516) |
//! | Vehicle | Red (#FF1654) |

use roadgen_track::manager::TrackManager;
use roadgen_track::raster::Scanline;
use roadgen_track::TrackError;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rgb
// ---------------------------------------------------------------------------

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Grass around the road.
    pub const BACKGROUND: Rgb = Rgb(126, 224, 129);
    /// Asphalt.
    pub const ROAD: Rgb = Rgb(25, 21, 22);
    /// The player's vehicle.
    pub const VEHICLE: Rgb = Rgb(255, 22, 84);
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An integer rectangle; `min` is inclusive and `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub min_x: i64,
    /// Top edge.
    pub min_y: i64,
    /// Right edge (exclusive).
    pub max_x: i64,
    /// Bottom edge (exclusive).
    pub max_y: i64,
}

impl Rect {
    /// Create a rectangle from its edges.
    pub const fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Horizontal extent.
    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    /// Vertical extent.
    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }

    /// Whether the rectangle covers no cells.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Overlap of two rectangles (possibly empty).
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// A drawing target that can fill rectangles with a flat color.
pub trait Canvas {
    /// Fill `rect` with `color`. Parts outside the canvas are ignored.
    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    /// Fill the whole canvas with `color`.
    fn fill(&mut self, color: Rgb);
}

// ---------------------------------------------------------------------------
// FrameBuffer
// ---------------------------------------------------------------------------

/// Row-major software canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl FrameBuffer {
    /// Create a buffer filled with [`Rgb::BACKGROUND`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BACKGROUND; (width as usize) * (height as usize)],
        }
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The color at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Number of cells with `color`.
    pub fn count(&self, color: Rgb) -> usize {
        self.pixels.iter().filter(|p| **p == color).count()
    }

    /// One row of the buffer.
    pub fn row(&self, y: u32) -> &[Rgb] {
        let start = (y * self.width) as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// Render as text, one character per cell. Unknown colors print as `?`.
    pub fn to_ascii(&self, legend: &[(Rgb, char)]) -> String {
        let mut out = String::with_capacity(self.pixels.len() + self.height as usize);
        for y in 0..self.height {
            for pixel in self.row(y) {
                let ch = legend
                    .iter()
                    .find(|(color, _)| color == pixel)
                    .map_or('?', |(_, ch)| *ch);
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

impl Canvas for FrameBuffer {
    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let bounds = Rect::new(0, 0, i64::from(self.width), i64::from(self.height));
        let clipped = rect.intersect(&bounds);
        if clipped.is_empty() {
            return;
        }
        for y in clipped.min_y..clipped.max_y {
            let row = (y as usize) * (self.width as usize);
            self.pixels[row + clipped.min_x as usize..row + clipped.max_x as usize].fill(color);
        }
    }

    fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }
}

// ---------------------------------------------------------------------------
// Road drawing
// ---------------------------------------------------------------------------

/// Draw both live segments of `track` as rows of `road_width` cells.
///
/// Only scanlines inside `area` are drawn; each one becomes the row
/// `round(x - road_width/2) .. + road_width`, offset by `area`'s top-left
/// corner. Returns the number of rows drawn.
///
/// # Errors
///
/// Propagates [`TrackError::StepTooCoarse`] from the rasterizer.
pub fn draw_track(
    track: &TrackManager,
    area: Rect,
    road_width: f64,
    color: Rgb,
    canvas: &mut impl Canvas,
) -> Result<usize, TrackError> {
    let mut drawn = 0;
    for line in track.scanlines() {
        if let Some(rect) = scanline_rect(line?, area, road_width) {
            canvas.fill_rect(rect, color);
            drawn += 1;
        }
    }
    Ok(drawn)
}

/// Canvas rectangle for one scanline, or `None` if it lies outside `area`.
pub fn scanline_rect(line: Scanline, area: Rect, road_width: f64) -> Option<Rect> {
    if line.y < area.min_y || line.y >= area.max_y {
        return None;
    }
    let left = (line.x - road_width / 2.0).round() as i64 - area.min_x;
    let top = line.y - area.min_y;
    Some(Rect::new(
        left,
        top,
        left + road_width.round() as i64,
        top + 1,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
