//! matrix-viz: interactive viewport and worker coordination for large matrix
//! visualizations.
//!
//! The crate keeps a single-threaded coordinator ([`Visualization`]) responsive
//! by pushing drawing to a render worker that owns the drawing surface, and
//! spatial hit-testing to a data worker that owns the point index.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod spec;
pub mod telemetry;
pub mod worker;

pub use api::{EventKind, Visualization, VisualizationConfig, VizEvent};
pub use error::{VizError, VizResult};
