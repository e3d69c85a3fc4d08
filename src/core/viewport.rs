use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::transform::Transform;
use crate::core::types::{AxisRange, CanvasSize, DataPoint};
use crate::error::{VizError, VizResult};

/// Wheel delta units that move an endpoint all the way to the pointer.
pub const DEFAULT_ZOOM_SENSITIVITY: f64 = 1000.0;
/// Pixel movement that pans by one full range width.
pub const DEFAULT_PAN_DIVISOR: f64 = 1000.0;

/// Fixed outer limits of the data space for the current specification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl ViewportBounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> VizResult<Self> {
        let bounds = Self {
            min_x,
            max_x,
            min_y,
            max_y,
        };
        if !bounds.x_range().is_ordered() || !bounds.y_range().is_ordered() {
            return Err(VizError::InvalidData(format!(
                "viewport bounds must be finite with min <= max, got [{min_x}, {max_x}, {min_y}, {max_y}]"
            )));
        }
        Ok(bounds)
    }

    /// Builds bounds from the `[minX, maxX, minY, maxY]` layout used by view options.
    pub fn from_array(values: [f64; 4]) -> VizResult<Self> {
        Self::new(values[0], values[1], values[2], values[3])
    }

    #[must_use]
    pub fn to_array(self) -> [f64; 4] {
        [self.min_x, self.max_x, self.min_y, self.max_y]
    }

    #[must_use]
    pub fn x_range(self) -> AxisRange {
        AxisRange::new(self.min_x, self.max_x)
    }

    #[must_use]
    pub fn y_range(self) -> AxisRange {
        AxisRange::new(self.min_y, self.max_y)
    }
}

/// How pan treats the outer bounds. Zoom always clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanBoundsPolicy {
    /// Pan may move the window past the outer bounds.
    #[default]
    Unbounded,
    /// The window is slid back inside the bounds, keeping its width.
    ShiftIntoBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomOutcome {
    ZoomIn,
    ZoomOut,
    /// Every axis was locked, reverted, or the delta was zero.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanOutcome {
    Moved,
    Rejected,
}

/// Serializable view of the viewport, pushed to the render worker and carried by events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSnapshot {
    #[serde(flatten)]
    pub bounds: ViewportBounds,
    pub current_x_range: AxisRange,
    pub current_y_range: AxisRange,
}

/// Outer bounds plus the mutable view window.
///
/// Every mutation validates the result and restores the previous range when it
/// would be inverted, degenerate, non-finite or outside the outer bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    bounds: ViewportBounds,
    current_x: AxisRange,
    current_y: AxisRange,
    locked_x: bool,
    locked_y: bool,
    zoom_sensitivity: f64,
    pan_divisor: f64,
    pan_policy: PanBoundsPolicy,
}

impl ViewportState {
    #[must_use]
    pub fn new(bounds: ViewportBounds) -> Self {
        Self {
            bounds,
            current_x: bounds.x_range(),
            current_y: bounds.y_range(),
            locked_x: false,
            locked_y: false,
            zoom_sensitivity: DEFAULT_ZOOM_SENSITIVITY,
            pan_divisor: DEFAULT_PAN_DIVISOR,
            pan_policy: PanBoundsPolicy::default(),
        }
    }

    pub fn with_tuning(
        mut self,
        zoom_sensitivity: f64,
        pan_divisor: f64,
        pan_policy: PanBoundsPolicy,
    ) -> VizResult<Self> {
        if !zoom_sensitivity.is_finite() || zoom_sensitivity <= 0.0 {
            return Err(VizError::InvalidData(
                "zoom sensitivity must be finite and > 0".to_owned(),
            ));
        }
        if !pan_divisor.is_finite() || pan_divisor <= 0.0 {
            return Err(VizError::InvalidData(
                "pan divisor must be finite and > 0".to_owned(),
            ));
        }
        self.zoom_sensitivity = zoom_sensitivity;
        self.pan_divisor = pan_divisor;
        self.pan_policy = pan_policy;
        Ok(self)
    }

    #[must_use]
    pub fn bounds(&self) -> ViewportBounds {
        self.bounds
    }

    #[must_use]
    pub fn current_x_range(&self) -> AxisRange {
        self.current_x
    }

    #[must_use]
    pub fn current_y_range(&self) -> AxisRange {
        self.current_y
    }

    #[must_use]
    pub fn locked_x(&self) -> bool {
        self.locked_x
    }

    #[must_use]
    pub fn locked_y(&self) -> bool {
        self.locked_y
    }

    pub fn set_locked_x(&mut self, locked: bool) {
        self.locked_x = locked;
    }

    pub fn set_locked_y(&mut self, locked: bool) {
        self.locked_y = locked;
    }

    #[must_use]
    pub fn pan_policy(&self) -> PanBoundsPolicy {
        self.pan_policy
    }

    #[must_use]
    pub fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot {
            bounds: self.bounds,
            current_x_range: self.current_x,
            current_y_range: self.current_y,
        }
    }

    #[must_use]
    pub fn transform(&self, size: CanvasSize) -> Transform {
        Transform::new(self.current_x, self.current_y, size)
    }

    /// Replaces the outer bounds and pulls the current window inside them.
    ///
    /// Falls back to the full bounds when the clamped window would be degenerate.
    pub fn set_bounds(&mut self, bounds: ViewportBounds) {
        self.bounds = bounds;
        self.current_x = fit_inside(self.current_x, bounds.x_range());
        self.current_y = fit_inside(self.current_y, bounds.y_range());
    }

    pub fn set_current_x_range(&mut self, range: AxisRange) -> VizResult<()> {
        self.current_x = validate_external_range(range, self.bounds.x_range(), "currentXRange")?;
        Ok(())
    }

    pub fn set_current_y_range(&mut self, range: AxisRange) -> VizResult<()> {
        self.current_y = validate_external_range(range, self.bounds.y_range(), "currentYRange")?;
        Ok(())
    }

    /// Zooms each unlocked axis toward `pointer` by `t = -delta / sensitivity`.
    ///
    /// Endpoints are clamped to the outer bounds; an axis whose result is inverted
    /// or degenerate keeps its previous range.
    pub fn zoom(&mut self, delta: f64, pointer: DataPoint) -> ZoomOutcome {
        if !delta.is_finite() || delta == 0.0 || !pointer.is_finite() {
            return ZoomOutcome::Rejected;
        }
        let t = -delta / self.zoom_sensitivity;

        let mut changed = false;
        if !self.locked_x {
            let candidate = self
                .current_x
                .pulled_toward(pointer.x, t)
                .clamped_to(self.bounds.x_range());
            changed |= accept_zoom(&mut self.current_x, candidate, "x");
        }
        if !self.locked_y {
            let candidate = self
                .current_y
                .pulled_toward(pointer.y, t)
                .clamped_to(self.bounds.y_range());
            changed |= accept_zoom(&mut self.current_y, candidate, "y");
        }

        match (changed, delta < 0.0) {
            (false, _) => ZoomOutcome::Rejected,
            (true, true) => ZoomOutcome::ZoomIn,
            (true, false) => ZoomOutcome::ZoomOut,
        }
    }

    /// Translates the window by `movement * (range_width / pan_divisor)`.
    ///
    /// X moves against the pointer and Y with it, so content follows the drag on a
    /// Y-down surface.
    pub fn pan(&mut self, movement_x: f64, movement_y: f64) -> PanOutcome {
        if !movement_x.is_finite() || !movement_y.is_finite() {
            return PanOutcome::Rejected;
        }

        let mut moved = false;
        if !self.locked_x && movement_x != 0.0 {
            let delta = -movement_x * self.current_x.width() / self.pan_divisor;
            let candidate = self.apply_pan_policy(
                self.current_x.translated(delta),
                self.bounds.x_range(),
            );
            moved |= accept_pan(&mut self.current_x, candidate, "x");
        }
        if !self.locked_y && movement_y != 0.0 {
            let delta = movement_y * self.current_y.width() / self.pan_divisor;
            let candidate = self.apply_pan_policy(
                self.current_y.translated(delta),
                self.bounds.y_range(),
            );
            moved |= accept_pan(&mut self.current_y, candidate, "y");
        }

        if moved {
            PanOutcome::Moved
        } else {
            PanOutcome::Rejected
        }
    }

    fn apply_pan_policy(&self, candidate: AxisRange, outer: AxisRange) -> AxisRange {
        match self.pan_policy {
            PanBoundsPolicy::Unbounded => candidate,
            PanBoundsPolicy::ShiftIntoBounds => shift_inside(candidate, outer),
        }
    }
}

fn accept_zoom(current: &mut AxisRange, candidate: AxisRange, axis: &str) -> bool {
    if !candidate.is_finite() || candidate.start >= candidate.end {
        trace!(axis, start = candidate.start, end = candidate.end, "zoom reverted");
        return false;
    }
    let changed = candidate != *current;
    *current = candidate;
    changed
}

fn accept_pan(current: &mut AxisRange, candidate: AxisRange, axis: &str) -> bool {
    if !candidate.is_finite() || candidate.start > candidate.end {
        trace!(axis, start = candidate.start, end = candidate.end, "pan reverted");
        return false;
    }
    let changed = candidate != *current;
    *current = candidate;
    changed
}

fn shift_inside(range: AxisRange, outer: AxisRange) -> AxisRange {
    if range.width() >= outer.width() {
        return outer;
    }
    if range.start < outer.start {
        return range.translated(outer.start - range.start);
    }
    if range.end > outer.end {
        return range.translated(outer.end - range.end);
    }
    range
}

fn fit_inside(range: AxisRange, outer: AxisRange) -> AxisRange {
    let clamped = range.clamped_to(outer);
    if clamped.start < clamped.end {
        clamped
    } else {
        outer
    }
}

fn validate_external_range(range: AxisRange, bounds: AxisRange, name: &str) -> VizResult<AxisRange> {
    if !range.is_ordered() {
        return Err(VizError::InvalidData(format!(
            "{name} must be finite with start <= end, got [{}, {}]",
            range.start, range.end
        )));
    }
    if range.start < bounds.start || range.end > bounds.end {
        return Err(VizError::InvalidData(format!(
            "{name} [{}, {}] lies outside the viewport bounds [{}, {}]",
            range.start, range.end, bounds.start, bounds.end
        )));
    }
    Ok(range)
}
