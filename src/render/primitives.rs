use serde::{Deserialize, Serialize};

use crate::core::ScreenPoint;
use crate::error::{VizError, VizResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub fn validate(self) -> VizResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(VizError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

fn validate_stroke(stroke_width: f64, what: &str) -> VizResult<()> {
    if !stroke_width.is_finite() || stroke_width <= 0.0 {
        return Err(VizError::InvalidData(format!(
            "{what} stroke width must be finite and > 0"
        )));
    }
    Ok(())
}

/// Draw command for one line segment in overlay pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    pub color: Color,
}

impl LinePrimitive {
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64, stroke_width: f64, color: Color) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            stroke_width,
            color,
        }
    }

    pub fn validate(self) -> VizResult<()> {
        if !self.x1.is_finite()
            || !self.y1.is_finite()
            || !self.x2.is_finite()
            || !self.y2.is_finite()
        {
            return Err(VizError::InvalidData(
                "line coordinates must be finite".to_owned(),
            ));
        }
        validate_stroke(self.stroke_width, "line")?;
        self.color.validate()
    }
}

/// Stroked, optionally filled axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub stroke_width: f64,
    pub stroke: Color,
    pub fill: Option<Color>,
}

impl RectPrimitive {
    /// Normalizes two arbitrary corners into a positive-size rectangle.
    #[must_use]
    pub fn from_corners(a: ScreenPoint, b: ScreenPoint, stroke_width: f64, stroke: Color) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
            stroke_width,
            stroke,
            fill: None,
        }
    }

    #[must_use]
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn validate(self) -> VizResult<()> {
        if !self.x.is_finite()
            || !self.y.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
        {
            return Err(VizError::InvalidData(
                "rect geometry must be finite".to_owned(),
            ));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(VizError::InvalidData(
                "rect size must be >= 0".to_owned(),
            ));
        }
        validate_stroke(self.stroke_width, "rect")?;
        self.stroke.validate()?;
        if let Some(fill) = self.fill {
            fill.validate()?;
        }
        Ok(())
    }
}

/// Open or closed polyline; lasso outlines are closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylinePrimitive {
    pub points: Vec<ScreenPoint>,
    pub closed: bool,
    pub stroke_width: f64,
    pub stroke: Color,
    pub fill: Option<Color>,
}

impl PolylinePrimitive {
    #[must_use]
    pub fn closed(points: Vec<ScreenPoint>, stroke_width: f64, stroke: Color) -> Self {
        Self {
            points,
            closed: true,
            stroke_width,
            stroke,
            fill: None,
        }
    }

    #[must_use]
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn validate(&self) -> VizResult<()> {
        if self.points.len() < 2 {
            return Err(VizError::InvalidData(
                "polyline needs at least two points".to_owned(),
            ));
        }
        if self
            .points
            .iter()
            .any(|point| !point.x.is_finite() || !point.y.is_finite())
        {
            return Err(VizError::InvalidData(
                "polyline coordinates must be finite".to_owned(),
            ));
        }
        validate_stroke(self.stroke_width, "polyline")?;
        self.stroke.validate()?;
        if let Some(fill) = self.fill {
            fill.validate()?;
        }
        Ok(())
    }
}

/// Horizontal text alignment relative to `TextPrimitive::x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Draw command for one label in overlay pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size_px,
            color,
            h_align,
        }
    }

    pub fn validate(&self) -> VizResult<()> {
        if self.text.is_empty() {
            return Err(VizError::InvalidData(
                "text primitive must not be empty".to_owned(),
            ));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(VizError::InvalidData(
                "text coordinates must be finite".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(VizError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}
