use std::collections::HashSet;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, trace, warn};

use crate::core::{CanvasSize, DataPoint, Transform, ViewportSnapshot};
use crate::error::{VizError, VizResult};
use crate::spec::Specification;

use super::protocol::{RenderEvent, RenderMessage};
use super::surface::{DrawingSurface, MarkInstance, RenderScene};

const WORKER_NAME: &str = "render";

/// Coordinator-side handle to the render worker thread.
///
/// Messages are fire-and-forget; the only traffic coming back is `tick`
/// notifications (and a terminal `failed`).
#[derive(Debug)]
pub struct RenderWorkerBridge {
    sender: Sender<RenderMessage>,
    events: Receiver<RenderEvent>,
    handle: Option<JoinHandle<()>>,
    frames_rendered: u64,
}

impl RenderWorkerBridge {
    /// Moves `surface` onto a new worker thread and sends `init`.
    pub fn spawn(surface: DrawingSurface) -> VizResult<Self> {
        let (sender, inbox) = crossbeam_channel::unbounded();
        let (outbox, events) = crossbeam_channel::unbounded();
        let size = surface.size();

        let handle = thread::Builder::new()
            .name("matrix-viz-render".to_owned())
            .spawn(move || RenderWorker::new(surface, outbox).run(&inbox))
            .map_err(|e| VizError::worker(WORKER_NAME, format!("failed to spawn thread: {e}")))?;

        let bridge = Self {
            sender,
            events,
            handle: Some(handle),
            frames_rendered: 0,
        };
        bridge.post(RenderMessage::Init { size })?;
        Ok(bridge)
    }

    pub fn post(&self, message: RenderMessage) -> VizResult<()> {
        self.sender
            .send(message)
            .map_err(|_| VizError::worker(WORKER_NAME, "worker channel closed"))
    }

    pub fn resize(&self, size: CanvasSize) -> VizResult<()> {
        self.post(RenderMessage::Resize {
            width: size.width,
            height: size.height,
        })
    }

    pub fn specification(&self, specification: &Specification) -> VizResult<()> {
        self.post(RenderMessage::Specification {
            specification: Box::new(specification.clone()),
        })
    }

    pub fn viewport(&self, viewport: ViewportSnapshot) -> VizResult<()> {
        self.post(RenderMessage::Viewport { viewport })
    }

    pub fn highlight(&self, indices: Vec<usize>) -> VizResult<()> {
        self.post(RenderMessage::Highlight { indices })
    }

    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Drains pending events without blocking.
    pub fn poll(&mut self) -> VizResult<Vec<RenderEvent>> {
        let mut drained = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(RenderEvent::Failed { message }) => {
                    return Err(VizError::worker(WORKER_NAME, message));
                }
                Ok(event) => {
                    if let RenderEvent::Tick { frame, .. } = event {
                        self.frames_rendered = frame;
                    }
                    drained.push(event);
                }
                Err(TryRecvError::Empty) => return Ok(drained),
                Err(TryRecvError::Disconnected) => {
                    return Err(VizError::worker(WORKER_NAME, "worker exited unexpectedly"));
                }
            }
        }
    }

    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.sender.send(RenderMessage::Shutdown);
        if handle.join().is_err() {
            warn!("render worker panicked before shutdown");
        }
    }
}

impl Drop for RenderWorkerBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct RenderWorker {
    surface: DrawingSurface,
    outbox: Sender<RenderEvent>,
    points: Vec<DataPoint>,
    viewport: Option<ViewportSnapshot>,
    highlighted: HashSet<usize>,
    instances: Vec<MarkInstance>,
    frame: u64,
}

/// What applying one message asks of the worker loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    Idle,
    Dirty,
    Stop,
}

impl RenderWorker {
    fn new(surface: DrawingSurface, outbox: Sender<RenderEvent>) -> Self {
        Self {
            surface,
            outbox,
            points: Vec::new(),
            viewport: None,
            highlighted: HashSet::new(),
            instances: Vec::new(),
            frame: 0,
        }
    }

    /// Applies every queued message in order, then draws at most one frame
    /// for the whole batch.
    fn run(mut self, inbox: &Receiver<RenderMessage>) {
        while let Ok(first) = inbox.recv() {
            let mut pending = Some(first);
            let mut dirty = false;
            let mut stop = false;
            let mut batch = 0usize;

            while let Some(message) = pending.take().or_else(|| inbox.try_recv().ok()) {
                batch += 1;
                match self.apply(message) {
                    Ok(Applied::Idle) => {}
                    Ok(Applied::Dirty) => dirty = true,
                    Ok(Applied::Stop) => {
                        stop = true;
                        break;
                    }
                    Err(err) => return self.fail(&err),
                }
            }

            if dirty {
                trace!(batch, "render worker coalesced messages");
                if let Err(err) = self.redraw() {
                    return self.fail(&err);
                }
            }
            if stop {
                break;
            }
        }
        debug!(frames = self.frame, "render worker exited");
    }

    fn fail(&self, err: &VizError) {
        warn!(error = %err, "render worker stopping after failure");
        let _ = self.outbox.send(RenderEvent::Failed {
            message: err.to_string(),
        });
    }

    fn apply(&mut self, message: RenderMessage) -> VizResult<Applied> {
        match message {
            RenderMessage::Init { size } => {
                self.surface.configure(size)?;
                Ok(Applied::Idle)
            }
            RenderMessage::Resize { width, height } => {
                self.surface.configure(CanvasSize::new(width, height))?;
                Ok(Applied::Dirty)
            }
            RenderMessage::Specification { specification } => {
                self.points = specification.points();
                self.highlighted.clear();
                self.viewport = None;
                debug!(points = self.points.len(), "render worker loaded specification");
                Ok(Applied::Idle)
            }
            RenderMessage::Viewport { viewport } => {
                self.viewport = Some(viewport);
                Ok(Applied::Dirty)
            }
            RenderMessage::Highlight { indices } => {
                self.highlighted = indices.into_iter().collect();
                Ok(Applied::Dirty)
            }
            RenderMessage::Shutdown => Ok(Applied::Stop),
        }
    }

    fn redraw(&mut self) -> VizResult<()> {
        let Some(viewport) = self.viewport else {
            return Ok(());
        };
        let size = self.surface.size();
        let transform = Transform::new(viewport.current_x_range, viewport.current_y_range, size);

        let mut instances = std::mem::take(&mut self.instances);
        instances.clear();
        instances.extend(
            self.points
                .iter()
                .enumerate()
                .filter(|(_, point)| point.is_finite())
                .filter_map(|(index, point)| {
                    let screen = transform.to_screen(*point);
                    size.contains(screen).then(|| MarkInstance {
                        index,
                        x: screen.x,
                        y: screen.y,
                        highlighted: self.highlighted.contains(&index),
                    })
                }),
        );

        let scene = RenderScene {
            size,
            x_range: viewport.current_x_range,
            y_range: viewport.current_y_range,
            instances,
        };
        let presented = self.surface.present(&scene);
        let count = scene.instances.len();
        self.instances = scene.instances;
        presented?;

        self.frame += 1;
        trace!(frame = self.frame, instances = count, "frame presented");
        let _ = self.outbox.send(RenderEvent::Tick {
            frame: self.frame,
            instances: count,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use crossbeam_channel::Receiver;

    use super::RenderWorkerBridge;
    use crate::core::{AxisRange, CanvasSize, ViewportBounds, ViewportSnapshot};
    use crate::error::VizResult;
    use crate::worker::surface::{
        DrawingSurface, HeadlessBackend, HeadlessProbe, RenderScene, SurfaceBackend,
    };

    /// Holds the worker inside `configure` until the gate opens.
    struct GatedBackend {
        gate: Receiver<()>,
        inner: HeadlessBackend,
    }

    impl SurfaceBackend for GatedBackend {
        fn configure(&mut self, size: CanvasSize) -> VizResult<()> {
            let _ = self.gate.recv();
            self.inner.configure(size)
        }

        fn present(&mut self, scene: &RenderScene) -> VizResult<()> {
            self.inner.present(scene)
        }
    }

    fn snapshot(step: f64) -> ViewportSnapshot {
        ViewportSnapshot {
            bounds: ViewportBounds::new(0.0, 100.0, 0.0, 100.0).expect("bounds"),
            current_x_range: AxisRange::new(step, step + 10.0),
            current_y_range: AxisRange::new(0.0, 10.0),
        }
    }

    fn wait_for_scene(recorder: &HeadlessProbe, x_range: AxisRange) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            let stats = recorder.stats();
            if stats.last_scene.is_some_and(|scene| scene.x_range == x_range) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn queued_viewports_collapse_into_one_frame() {
        let (open, gate) = crossbeam_channel::bounded(1);
        let (inner, recorder) = HeadlessBackend::with_probe();
        let surface =
            DrawingSurface::new(GatedBackend { gate, inner }, CanvasSize::new(100, 100))
                .expect("surface");
        let mut bridge = RenderWorkerBridge::spawn(surface).expect("spawn");

        for step in 0..50 {
            bridge.viewport(snapshot(f64::from(step))).expect("post");
        }
        open.send(()).expect("open gate");

        assert!(wait_for_scene(&recorder, snapshot(49.0).current_x_range));
        let presented = recorder.stats().frames_presented;
        assert!(presented >= 1 && presented < 50, "presented {presented} frames");
        bridge.shutdown();
    }
}
