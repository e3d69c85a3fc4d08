use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{AxisRange, CanvasSize};
use crate::error::VizResult;

/// One projected mark, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkInstance {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub highlighted: bool,
}

/// Everything the GPU backend needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderScene {
    pub size: CanvasSize,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    pub instances: Vec<MarkInstance>,
}

/// GPU drawing backend living on the render worker thread.
pub trait SurfaceBackend: Send {
    fn configure(&mut self, size: CanvasSize) -> VizResult<()>;
    fn present(&mut self, scene: &RenderScene) -> VizResult<()>;
}

/// Drawing surface handed to the render worker.
///
/// Not `Clone`: [`RenderWorkerBridge::spawn`](super::RenderWorkerBridge::spawn)
/// takes it by value, so once transferred the coordinator has no handle left to
/// draw with.
pub struct DrawingSurface {
    backend: Box<dyn SurfaceBackend>,
    size: CanvasSize,
}

impl fmt::Debug for DrawingSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawingSurface")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl DrawingSurface {
    pub fn new(backend: impl SurfaceBackend + 'static, size: CanvasSize) -> VizResult<Self> {
        Ok(Self {
            backend: Box::new(backend),
            size: size.validated()?,
        })
    }

    #[must_use]
    pub fn size(&self) -> CanvasSize {
        self.size
    }

    pub(crate) fn configure(&mut self, size: CanvasSize) -> VizResult<()> {
        self.backend.configure(size)?;
        self.size = size;
        Ok(())
    }

    pub(crate) fn present(&mut self, scene: &RenderScene) -> VizResult<()> {
        self.backend.present(scene)
    }
}

/// What the headless backend has seen so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessStats {
    pub configured_size: Option<CanvasSize>,
    pub frames_presented: u64,
    pub last_scene: Option<RenderScene>,
}

/// Shared read handle onto a [`HeadlessBackend`]'s stats.
#[derive(Debug, Clone, Default)]
pub struct HeadlessProbe {
    stats: Arc<Mutex<HeadlessStats>>,
}

impl HeadlessProbe {
    #[must_use]
    pub fn stats(&self) -> HeadlessStats {
        self.stats.lock().clone()
    }
}

/// Backend that records scenes instead of drawing them.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    stats: Arc<Mutex<HeadlessStats>>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn with_probe() -> (Self, HeadlessProbe) {
        let stats = Arc::new(Mutex::new(HeadlessStats::default()));
        (
            Self {
                stats: Arc::clone(&stats),
            },
            HeadlessProbe { stats },
        )
    }
}

impl SurfaceBackend for HeadlessBackend {
    fn configure(&mut self, size: CanvasSize) -> VizResult<()> {
        self.stats.lock().configured_size = Some(size.validated()?);
        Ok(())
    }

    fn present(&mut self, scene: &RenderScene) -> VizResult<()> {
        let mut stats = self.stats.lock();
        stats.frames_presented += 1;
        stats.last_scene = Some(scene.clone());
        Ok(())
    }
}
