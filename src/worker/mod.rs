//! Background workers and the message protocol they speak.
//!
//! The render worker owns the drawing surface; the data worker owns the
//! resident point set. Both run on dedicated threads and only communicate
//! through `crossbeam-channel` queues.

mod data_worker;
mod point_index;
mod protocol;
mod render_worker;
mod surface;

pub use data_worker::DataWorkerBridge;
pub use point_index::PointIndex;
pub use protocol::{
    ClosestPoint, DataQuery, DataRequest, DataResponse, QueryKind, RenderEvent, RenderMessage,
    SelectionResult,
};
pub use render_worker::RenderWorkerBridge;
pub use surface::{
    DrawingSurface, HeadlessBackend, HeadlessProbe, HeadlessStats, MarkInstance, RenderScene,
    SurfaceBackend,
};
