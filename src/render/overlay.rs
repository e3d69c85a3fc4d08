use serde::{Deserialize, Serialize};

use crate::core::{CanvasSize, ScreenPoint, Transform};
use crate::render::labels::{LabelLayout, PlacedLabel};
use crate::render::ticks::{AXIS_X_TARGET_SPACING_PX, AXIS_Y_TARGET_SPACING_PX, axis_ticks};
use crate::render::{
    Color, LinePrimitive, OverlayFrame, PolylinePrimitive, RectPrimitive, TextHAlign,
    TextPrimitive,
};
use crate::spec::{Margins, Specification, XAxisPlacement, YAxisPlacement};

/// Cosmetic parameters for the vector overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub font_size_px: f64,
    pub tick_length_px: f64,
    pub stroke_width: f64,
    pub axis_color: Color,
    pub label_color: Color,
    pub selection_stroke: Color,
    pub selection_fill: Color,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font_size_px: 11.0,
            tick_length_px: 5.0,
            stroke_width: 1.0,
            axis_color: Color::rgb(0.2, 0.2, 0.2),
            label_color: Color::rgb(0.1, 0.1, 0.1),
            selection_stroke: Color::rgb(0.1, 0.4, 0.9),
            selection_fill: Color::rgba(0.1, 0.4, 0.9, 0.15),
        }
    }
}

/// Axis ticks, data labels and the selection outline drawn over the surface.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    style: OverlayStyle,
    size: CanvasSize,
    margins: Margins,
    x_axis: XAxisPlacement,
    y_axis: YAxisPlacement,
    labels: LabelLayout,
    placed: Vec<PlacedLabel>,
    selection: Option<Vec<f64>>,
}

impl OverlayRenderer {
    #[must_use]
    pub fn new(size: CanvasSize, style: OverlayStyle) -> Self {
        Self {
            style,
            size,
            margins: Margins::default(),
            x_axis: XAxisPlacement::None,
            y_axis: YAxisPlacement::None,
            labels: LabelLayout::default(),
            placed: Vec::new(),
            selection: None,
        }
    }

    pub fn set_specification(&mut self, specification: &Specification) {
        self.margins = specification.margins;
        self.x_axis = specification.x_axis;
        self.y_axis = specification.y_axis;
        self.labels = LabelLayout::new(specification.labels.clone());
        self.placed.clear();
        self.selection = None;
    }

    pub fn resize(&mut self, size: CanvasSize) {
        self.size = size;
    }

    #[must_use]
    pub fn size(&self) -> CanvasSize {
        self.size
    }

    #[must_use]
    pub fn style(&self) -> OverlayStyle {
        self.style
    }

    /// Sets the outline to draw: 4 numbers for a box, 6 or more for a lasso.
    pub fn set_selection_outline(&mut self, bounds: Option<Vec<f64>>) {
        self.selection = bounds;
    }

    #[must_use]
    pub fn selection_outline(&self) -> Option<&[f64]> {
        self.selection.as_deref()
    }

    /// Labels kept by the last [`compose`](Self::compose).
    #[must_use]
    pub fn placed_labels(&self) -> &[PlacedLabel] {
        &self.placed
    }

    /// Topmost visible label under a canvas-space point.
    #[must_use]
    pub fn label_at(&self, point: ScreenPoint) -> Option<&PlacedLabel> {
        self.placed
            .iter()
            .rev()
            .find(|placed| placed.hit(point, self.style.font_size_px))
    }

    /// Rebuilds the whole overlay for the given transform.
    pub fn compose(&mut self, transform: &Transform) -> OverlayFrame {
        let mut frame = OverlayFrame::new(self.size, (self.margins.left, self.margins.top));
        self.push_x_axis(&mut frame, transform);
        self.push_y_axis(&mut frame, transform);

        self.placed = self.labels.layout(transform);
        for placed in &self.placed {
            let at = self.offset(placed.position);
            frame.texts.push(TextPrimitive::new(
                placed.label.text.clone(),
                at.x,
                at.y,
                self.style.font_size_px,
                self.style.label_color,
                TextHAlign::Center,
            ));
        }

        self.push_selection(&mut frame, transform);
        frame
    }

    fn offset(&self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(point.x + self.margins.left, point.y + self.margins.top)
    }

    fn push_x_axis(&self, frame: &mut OverlayFrame, transform: &Transform) {
        let height = self.size.height_px();
        let (axis_y, direction) = match self.x_axis {
            XAxisPlacement::None => return,
            XAxisPlacement::Bottom => (height, 1.0),
            XAxisPlacement::Top => (0.0, -1.0),
            XAxisPlacement::Center => (height / 2.0, 1.0),
            XAxisPlacement::Zero => (transform.y_to_screen(0.0).clamp(0.0, height), 1.0),
        };

        let start = self.offset(ScreenPoint::new(0.0, axis_y));
        let end = self.offset(ScreenPoint::new(self.size.width_px(), axis_y));
        frame.lines.push(self.axis_line(start, end));

        let tick_length = self.style.tick_length_px * direction;
        let text_offset = if direction > 0.0 {
            tick_length + self.style.font_size_px
        } else {
            tick_length - 2.0
        };
        for tick in axis_ticks(transform.x_range, self.size.width_px(), AXIS_X_TARGET_SPACING_PX) {
            let at = self.offset(ScreenPoint::new(transform.x_to_screen(tick.value), axis_y));
            frame.lines.push(self.axis_line(at, ScreenPoint::new(at.x, at.y + tick_length)));
            frame.texts.push(TextPrimitive::new(
                tick.label,
                at.x,
                at.y + text_offset,
                self.style.font_size_px,
                self.style.axis_color,
                TextHAlign::Center,
            ));
        }
    }

    fn push_y_axis(&self, frame: &mut OverlayFrame, transform: &Transform) {
        let width = self.size.width_px();
        let (axis_x, direction, align) = match self.y_axis {
            YAxisPlacement::None => return,
            YAxisPlacement::Left => (0.0, -1.0, TextHAlign::Right),
            YAxisPlacement::Right => (width, 1.0, TextHAlign::Left),
            YAxisPlacement::Center => (width / 2.0, -1.0, TextHAlign::Right),
            YAxisPlacement::Zero => (
                transform.x_to_screen(0.0).clamp(0.0, width),
                -1.0,
                TextHAlign::Right,
            ),
        };

        let start = self.offset(ScreenPoint::new(axis_x, 0.0));
        let end = self.offset(ScreenPoint::new(axis_x, self.size.height_px()));
        frame.lines.push(self.axis_line(start, end));

        let tick_length = self.style.tick_length_px * direction;
        for tick in axis_ticks(transform.y_range, self.size.height_px(), AXIS_Y_TARGET_SPACING_PX) {
            let at = self.offset(ScreenPoint::new(axis_x, transform.y_to_screen(tick.value)));
            frame.lines.push(self.axis_line(at, ScreenPoint::new(at.x + tick_length, at.y)));
            frame.texts.push(TextPrimitive::new(
                tick.label,
                at.x + tick_length * 1.5,
                at.y,
                self.style.font_size_px,
                self.style.axis_color,
                align,
            ));
        }
    }

    fn push_selection(&self, frame: &mut OverlayFrame, transform: &Transform) {
        let Some(bounds) = self.selection.as_deref() else {
            return;
        };
        let points: Vec<ScreenPoint> = transform
            .project_flat(bounds)
            .into_iter()
            .map(|point| self.offset(point))
            .collect();

        match points.len() {
            2 if bounds.len() == 4 => frame.rects.push(
                RectPrimitive::from_corners(
                    points[0],
                    points[1],
                    self.style.stroke_width,
                    self.style.selection_stroke,
                )
                .with_fill(self.style.selection_fill),
            ),
            n if n >= 3 => frame.polylines.push(
                PolylinePrimitive::closed(
                    points,
                    self.style.stroke_width,
                    self.style.selection_stroke,
                )
                .with_fill(self.style.selection_fill),
            ),
            _ => {}
        }
    }

    fn axis_line(&self, from: ScreenPoint, to: ScreenPoint) -> LinePrimitive {
        LinePrimitive::new(
            from.x,
            from.y,
            to.x,
            to.y,
            self.style.stroke_width,
            self.style.axis_color,
        )
    }
}
