//! Bidirectional mapping between data space and screen space.
//!
//! X maps `[x0, x1] -> [0, width]`. Y maps `[y0, y1] -> [height, 0]` because data
//! space has its origin at the bottom while the raster surface has it at the top.

use serde::{Deserialize, Serialize};

use crate::core::types::{AxisRange, CanvasSize, DataPoint, PixelScale, ScreenPoint};

#[must_use]
pub fn to_screen(
    point: DataPoint,
    x_range: AxisRange,
    y_range: AxisRange,
    size: CanvasSize,
) -> ScreenPoint {
    ScreenPoint::new(
        normalize(point.x, x_range) * size.width_px(),
        size.height_px() - normalize(point.y, y_range) * size.height_px(),
    )
}

#[must_use]
pub fn to_data(
    point: ScreenPoint,
    x_range: AxisRange,
    y_range: AxisRange,
    size: CanvasSize,
) -> DataPoint {
    DataPoint::new(
        denormalize(ratio(point.x, size.width_px()), x_range),
        denormalize(ratio(size.height_px() - point.y, size.height_px()), y_range),
    )
}

// Degenerate ranges collapse onto the range start instead of dividing by zero.
fn normalize(value: f64, range: AxisRange) -> f64 {
    let span = range.width();
    if span == 0.0 {
        return 0.0;
    }
    (value - range.start) / span
}

fn denormalize(normalized: f64, range: AxisRange) -> f64 {
    range.start + normalized * range.width()
}

fn ratio(pixel: f64, extent: f64) -> f64 {
    if extent == 0.0 {
        return 0.0;
    }
    pixel / extent
}

/// Snapshot of ranges plus surface size for repeated projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    pub size: CanvasSize,
}

impl Transform {
    #[must_use]
    pub fn new(x_range: AxisRange, y_range: AxisRange, size: CanvasSize) -> Self {
        Self {
            x_range,
            y_range,
            size,
        }
    }

    #[must_use]
    pub fn to_screen(&self, point: DataPoint) -> ScreenPoint {
        to_screen(point, self.x_range, self.y_range, self.size)
    }

    #[must_use]
    pub fn to_data(&self, point: ScreenPoint) -> DataPoint {
        to_data(point, self.x_range, self.y_range, self.size)
    }

    #[must_use]
    pub fn x_to_screen(&self, x: f64) -> f64 {
        normalize(x, self.x_range) * self.size.width_px()
    }

    #[must_use]
    pub fn y_to_screen(&self, y: f64) -> f64 {
        self.size.height_px() - normalize(y, self.y_range) * self.size.height_px()
    }

    /// Projects a flat `[x0, y0, x1, y1, ...]` buffer into screen points.
    ///
    /// A trailing odd coordinate is ignored.
    #[must_use]
    pub fn project_flat(&self, coords: &[f64]) -> Vec<ScreenPoint> {
        coords
            .chunks_exact(2)
            .map(|pair| self.to_screen(DataPoint::new(pair[0], pair[1])))
            .collect()
    }

    /// Pixels per data unit on each axis. A degenerate range scales to zero.
    #[must_use]
    pub fn pixel_scale(&self) -> PixelScale {
        PixelScale::new(
            ratio(self.size.width_px(), self.x_range.width().abs()),
            ratio(self.size.height_px(), self.y_range.width().abs()),
        )
    }
}
