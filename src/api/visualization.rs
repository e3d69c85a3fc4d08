use serde_json::Value;
use tracing::{debug, warn};

use crate::core::{CanvasSize, ViewportBounds, ViewportState};
use crate::error::{VizError, VizResult};
use crate::interaction::{InteractionController, ToolMode};
use crate::render::{OverlayRenderer, OverlaySink, PlacedLabel};
use crate::spec::{Specification, SpecificationValidator, StructuralValidator};
use crate::worker::{DataWorkerBridge, DrawingSurface, QueryKind, RenderWorkerBridge};

use super::{EventBus, EventKind, HighlightSet, ListenerId, ViewOptions, VisualizationConfig, VizEvent};

/// Bounds used when a specification has no resolvable extent on either axis.
const FALLBACK_BOUNDS: [f64; 4] = [0.0, 1.0, 0.0, 1.0];

/// Single-threaded coordinator of one matrix visualization.
///
/// Owns the viewport, the interaction controller, the overlay and both worker
/// bridges. Host input goes in through the pointer methods; worker results come
/// back through [`poll_workers`](Self::poll_workers) / [`flush`](Self::flush)
/// and reach the host as [`VizEvent`]s.
pub struct Visualization<S: OverlaySink, V: SpecificationValidator = StructuralValidator> {
    pub(super) config: VisualizationConfig,
    pub(super) size: CanvasSize,
    pub(super) validator: V,
    pub(super) sink: S,
    pub(super) overlay: OverlayRenderer,
    pub(super) controller: InteractionController,
    pub(super) viewport: Option<ViewportState>,
    pub(super) specification: Option<Specification>,
    pub(super) generation: u64,
    pub(super) locked_x: bool,
    pub(super) locked_y: bool,
    pub(super) render: RenderWorkerBridge,
    pub(super) data: DataWorkerBridge,
    pub(super) events: EventBus,
    pub(super) highlights: HighlightSet,
    pub(super) hovered_label: Option<PlacedLabel>,
    pub(super) poisoned: Option<String>,
}

impl<S: OverlaySink> Visualization<S> {
    /// Builds a visualization with the structural specification validator.
    pub fn new(
        config: VisualizationConfig,
        surface: DrawingSurface,
        sink: S,
    ) -> VizResult<Self> {
        Self::with_validator(config, surface, sink, StructuralValidator)
    }
}

impl<S: OverlaySink, V: SpecificationValidator> Visualization<S, V> {
    /// Spawns both workers and moves `surface` into the render worker.
    pub fn with_validator(
        config: VisualizationConfig,
        surface: DrawingSurface,
        sink: S,
        validator: V,
    ) -> VizResult<Self> {
        config.validate()?;
        let size = config.canvas;
        let surface_size = surface.size();

        let render = RenderWorkerBridge::spawn(surface)?;
        if surface_size != size {
            render.resize(size)?;
        }
        let data = DataWorkerBridge::spawn()?;

        let mut controller = InteractionController::new();
        controller.set_tool(config.initial_tool);

        debug!(width = size.width, height = size.height, "visualization created");
        Ok(Self {
            overlay: OverlayRenderer::new(size, config.overlay_style),
            config,
            size,
            validator,
            sink,
            controller,
            viewport: None,
            specification: None,
            generation: 0,
            locked_x: false,
            locked_y: false,
            render,
            data,
            events: EventBus::new(),
            highlights: HighlightSet::new(),
            hovered_label: None,
            poisoned: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &VisualizationConfig {
        &self.config
    }

    #[must_use]
    pub fn size(&self) -> CanvasSize {
        self.size
    }

    #[must_use]
    pub fn tool(&self) -> ToolMode {
        self.controller.tool()
    }

    #[must_use]
    pub fn viewport(&self) -> Option<&ViewportState> {
        self.viewport.as_ref()
    }

    #[must_use]
    pub fn specification(&self) -> Option<&Specification> {
        self.specification.as_ref()
    }

    /// Bumped every time a specification is accepted.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    #[must_use]
    pub fn overlay(&self) -> &OverlayRenderer {
        &self.overlay
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    #[must_use]
    pub fn requests_sent(&self, kind: QueryKind) -> u64 {
        self.data.requests_sent(kind)
    }

    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.render.frames_rendered()
    }

    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&VizEvent) + 'static,
    {
        self.events.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Validates and installs `specification`.
    ///
    /// Returns `Ok(false)` without touching current state when validation fails.
    /// On success the viewport is rebuilt from the data extent, highlights are
    /// cleared, and responses to queries issued earlier become stale.
    pub fn set_specification(&mut self, specification: Specification) -> VizResult<bool> {
        self.ensure_usable()?;

        let report = self.validator.validate(&specification);
        if !report.is_valid() {
            for diagnostic in &report.diagnostics {
                warn!(
                    path = %diagnostic.path,
                    message = %diagnostic.message,
                    "specification rejected"
                );
            }
            return Ok(false);
        }

        let bounds = match specification.data_bounds() {
            Some(bounds) => bounds,
            None => ViewportBounds::from_array(FALLBACK_BOUNDS)?,
        };
        let mut viewport = ViewportState::new(bounds).with_tuning(
            self.config.zoom_sensitivity,
            self.config.pan_divisor,
            self.config.pan_bounds_policy,
        )?;
        viewport.set_locked_x(self.locked_x);
        viewport.set_locked_y(self.locked_y);

        self.generation += 1;
        self.controller.cancel();
        self.highlights.clear();
        self.hovered_label = None;
        self.overlay.set_specification(&specification);
        self.overlay.set_selection_outline(None);

        let points = specification.points();
        debug!(
            generation = self.generation,
            points = points.len(),
            tracks = specification.tracks.len(),
            "specification accepted"
        );

        let sent = self.render.specification(&specification);
        self.poison_on_failure(sent)?;
        if let (Some(width), Some(height)) = (specification.width, specification.height) {
            let requested = CanvasSize::new(width, height);
            if requested != self.size {
                self.apply_size(requested)?;
            }
        }
        let sent = self.data.load_points(points, self.generation);
        self.poison_on_failure(sent)?;

        self.viewport = Some(viewport);
        self.specification = Some(specification);
        self.push_viewport()?;
        self.redraw_overlay()?;
        Ok(true)
    }

    pub fn set_specification_json(&mut self, input: &str) -> VizResult<bool> {
        let specification = Specification::from_json_str(input)?;
        self.set_specification(specification)
    }

    /// Applies host view options; see [`ViewOptions`] for the recognized keys.
    ///
    /// Range keys need a viewport, either from an earlier specification or from a
    /// `viewport` key in the same object, and must lie within its bounds. A rejected
    /// object leaves tool, locks and viewport untouched.
    pub fn set_view_options(&mut self, options: &Value) -> VizResult<()> {
        self.ensure_usable()?;
        let options = ViewOptions::from_json_value(options)?;

        let mut staged = self.viewport.clone();
        let mut viewport_changed = false;
        if let Some(bounds) = options.viewport {
            match staged.as_mut() {
                Some(viewport) => viewport.set_bounds(bounds),
                None => {
                    staged = Some(ViewportState::new(bounds).with_tuning(
                        self.config.zoom_sensitivity,
                        self.config.pan_divisor,
                        self.config.pan_bounds_policy,
                    )?);
                }
            }
            viewport_changed = true;
        }
        if options.current_x_range.is_some() || options.current_y_range.is_some() {
            let viewport = staged.as_mut().ok_or_else(|| {
                VizError::InvalidData(
                    "current ranges need a viewport: set a specification or `viewport` first"
                        .to_owned(),
                )
            })?;
            if let Some(range) = options.current_x_range {
                viewport.set_current_x_range(range)?;
            }
            if let Some(range) = options.current_y_range {
                viewport.set_current_y_range(range)?;
            }
            viewport_changed = true;
        }

        // Nothing below can fail, so a rejected object leaves every setting as it was.
        if let Some(tool) = options.tool {
            self.controller.set_tool(tool);
        }
        if let Some(locked) = options.locked_x {
            self.locked_x = locked;
        }
        if let Some(locked) = options.locked_y {
            self.locked_y = locked;
        }
        self.viewport = staged;
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.set_locked_x(self.locked_x);
            viewport.set_locked_y(self.locked_y);
        }
        if viewport_changed {
            self.push_viewport()?;
            self.redraw_overlay()?;
        }
        Ok(())
    }

    /// Fails with [`VizError::InvalidTool`] for anything but `pan`, `box` or `lasso`.
    pub fn set_tool(&mut self, name: &str) -> VizResult<()> {
        self.ensure_usable()?;
        self.controller.set_tool_name(name)
    }

    /// Resizes the canvas. The render worker sees the new size before any later
    /// viewport update.
    pub fn resize(&mut self, width: u32, height: u32) -> VizResult<()> {
        self.ensure_usable()?;
        let size = CanvasSize::new(width, height).validated()?;
        self.apply_size(size)?;
        if self.viewport.is_some() {
            self.push_viewport()?;
        }
        self.redraw_overlay()
    }

    /// Replaces the highlight set and pushes it to the render worker.
    pub fn set_highlights<I>(&mut self, indices: I) -> VizResult<()>
    where
        I: IntoIterator<Item = usize>,
    {
        self.ensure_usable()?;
        self.highlights.replace_with(indices);
        self.push_highlights()
    }

    pub fn clear_highlights(&mut self) -> VizResult<()> {
        self.ensure_usable()?;
        if self.highlights.clear() {
            self.push_highlights()?;
        }
        Ok(())
    }

    /// Recomposes the overlay for the current viewport and hands it to the sink.
    pub fn redraw_overlay(&mut self) -> VizResult<()> {
        let Some(viewport) = self.viewport.as_ref() else {
            return Ok(());
        };
        let transform = viewport.transform(self.size);
        let frame = self.overlay.compose(&transform);
        self.sink.draw(&frame)
    }

    /// Stops both workers. Later calls fail with [`VizError::Poisoned`].
    pub fn shutdown(&mut self) {
        self.render.shutdown();
        self.data.shutdown();
        if self.poisoned.is_none() {
            self.poisoned = Some("visualization was shut down".to_owned());
        }
    }

    pub(super) fn ensure_usable(&self) -> VizResult<()> {
        match &self.poisoned {
            Some(reason) => Err(VizError::Poisoned(reason.clone())),
            None => Ok(()),
        }
    }

    /// Records a worker failure; every later call reports [`VizError::Poisoned`].
    pub(super) fn poison_on_failure<T>(&mut self, result: VizResult<T>) -> VizResult<T> {
        if let Err(err @ VizError::WorkerFailed { .. }) = &result {
            warn!(error = %err, "worker failure, visualization poisoned");
            self.poisoned = Some(err.to_string());
        }
        result
    }

    pub(super) fn push_viewport(&mut self) -> VizResult<()> {
        let Some(snapshot) = self.viewport.as_ref().map(ViewportState::snapshot) else {
            return Ok(());
        };
        let sent = self.render.viewport(snapshot);
        self.poison_on_failure(sent)
    }

    pub(super) fn push_highlights(&mut self) -> VizResult<()> {
        let sent = self.render.highlight(self.highlights.to_vec());
        self.poison_on_failure(sent)
    }

    fn apply_size(&mut self, size: CanvasSize) -> VizResult<()> {
        self.size = size;
        self.overlay.resize(size);
        let sent = self.render.resize(size);
        self.poison_on_failure(sent)
    }
}
