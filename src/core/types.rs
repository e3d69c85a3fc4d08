use serde::{Deserialize, Serialize};

use crate::error::{VizError, VizResult};

/// Pixel size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn validated(self) -> VizResult<Self> {
        if !self.is_valid() {
            return Err(VizError::InvalidCanvas {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }

    #[must_use]
    pub fn width_px(self) -> f64 {
        f64::from(self.width)
    }

    #[must_use]
    pub fn height_px(self) -> f64 {
        f64::from(self.height)
    }

    /// Returns `true` when the point lies inside `[0,width]x[0,height]`.
    #[must_use]
    pub fn contains(self, point: ScreenPoint) -> bool {
        (0.0..=self.width_px()).contains(&point.x) && (0.0..=self.height_px()).contains(&point.y)
    }
}

/// Point in data space (Y-up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Point in screen space (Y-down, pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Screen pixels per data unit on each axis of the current view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelScale {
    pub x: f64,
    pub y: f64,
}

impl PixelScale {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Uniform scale, for views where both axes share a unit.
    #[must_use]
    pub fn uniform(pixels_per_unit: f64) -> Self {
        Self::new(pixels_per_unit, pixels_per_unit)
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x >= 0.0 && self.y >= 0.0
    }

    /// Pixel distance between two data points under this scale.
    #[must_use]
    pub fn distance(self, a: DataPoint, b: DataPoint) -> f64 {
        ((a.x - b.x) * self.x).hypot((a.y - b.y) * self.y)
    }
}

/// Closed interval on one data axis, serialized as `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct AxisRange {
    pub start: f64,
    pub end: f64,
}

impl AxisRange {
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    /// `start <= end` with both ends finite.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        self.is_finite() && self.start <= self.end
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        (self.start..=self.end).contains(&value)
    }

    #[must_use]
    pub fn translated(self, delta: f64) -> Self {
        Self::new(self.start + delta, self.end + delta)
    }

    /// Moves both endpoints toward `anchor` by factor `t` (`t*anchor + (1-t)*old`).
    #[must_use]
    pub fn pulled_toward(self, anchor: f64, t: f64) -> Self {
        Self::new(
            t * anchor + (1.0 - t) * self.start,
            t * anchor + (1.0 - t) * self.end,
        )
    }

    #[must_use]
    pub fn clamped_to(self, outer: AxisRange) -> Self {
        Self::new(
            self.start.clamp(outer.start, outer.end),
            self.end.clamp(outer.start, outer.end),
        )
    }
}

impl From<[f64; 2]> for AxisRange {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<AxisRange> for [f64; 2] {
    fn from(value: AxisRange) -> Self {
        [value.start, value.end]
    }
}
