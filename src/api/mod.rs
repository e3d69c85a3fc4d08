//! Host-facing coordinator and its supporting types.

mod config;
mod events;
mod highlight;
mod pointer_input;
mod view_options;
mod visualization;
mod worker_dispatch;

pub use config::VisualizationConfig;
pub use events::{EventBus, EventKind, LabelEvent, ListenerId, VizEvent};
pub use highlight::HighlightSet;
pub use view_options::ViewOptions;
pub use visualization::Visualization;
