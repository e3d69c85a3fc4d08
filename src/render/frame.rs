use crate::core::CanvasSize;
use crate::error::{VizError, VizResult};
use crate::render::{LinePrimitive, PolylinePrimitive, RectPrimitive, TextPrimitive};

/// Backend-agnostic overlay scene for one viewport update.
///
/// Coordinates are overlay pixels: the plot area starts at `origin` so margin
/// space around the drawing surface can hold axis text.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
    pub size: CanvasSize,
    pub origin: (f64, f64),
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub polylines: Vec<PolylinePrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl OverlayFrame {
    #[must_use]
    pub fn new(size: CanvasSize, origin: (f64, f64)) -> Self {
        Self {
            size,
            origin,
            lines: Vec::new(),
            rects: Vec::new(),
            polylines: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_line(mut self, line: LinePrimitive) -> Self {
        self.lines.push(line);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPrimitive) -> Self {
        self.texts.push(text);
        self
    }

    pub fn validate(&self) -> VizResult<()> {
        if !self.size.is_valid() {
            return Err(VizError::InvalidCanvas {
                width: self.size.width,
                height: self.size.height,
            });
        }

        for line in &self.lines {
            line.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for polyline in &self.polylines {
            polyline.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
            && self.rects.is_empty()
            && self.polylines.is_empty()
            && self.texts.is_empty()
    }
}
