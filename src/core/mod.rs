pub mod transform;
pub mod types;
pub mod viewport;

pub use transform::{Transform, to_data, to_screen};
pub use types::{AxisRange, CanvasSize, DataPoint, PixelScale, ScreenPoint};
pub use viewport::{
    DEFAULT_PAN_DIVISOR, DEFAULT_ZOOM_SENSITIVITY, PanBoundsPolicy, PanOutcome, ViewportBounds,
    ViewportSnapshot, ViewportState, ZoomOutcome,
};
