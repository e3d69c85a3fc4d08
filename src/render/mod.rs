mod frame;
mod labels;
mod null_renderer;
mod overlay;
mod primitives;
mod ticks;

pub use frame::OverlayFrame;
pub use labels::{LabelLayout, PlacedLabel};
pub use null_renderer::NullOverlaySink;
pub use overlay::{OverlayRenderer, OverlayStyle};
pub use primitives::{
    Color, LinePrimitive, PolylinePrimitive, RectPrimitive, TextHAlign, TextPrimitive,
};
pub use ticks::AxisTick;

use crate::error::VizResult;

/// Contract implemented by the vector overlay backend (SVG, canvas 2D, ...).
///
/// Backends receive a fully materialized `OverlayFrame` so drawing code stays
/// isolated from viewport and gesture logic.
pub trait OverlaySink {
    fn draw(&mut self, frame: &OverlayFrame) -> VizResult<()>;
}
