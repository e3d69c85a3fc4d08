use tracing::trace;

use crate::core::PixelScale;
use crate::error::VizResult;
use crate::interaction::{
    InteractionEffect, InteractionEffects, PointerInput, SelectionKind, ViewportChange,
};
use crate::render::OverlaySink;
use crate::spec::SpecificationValidator;
use crate::worker::DataQuery;

use super::{LabelEvent, Visualization, VizEvent};

impl<S: OverlaySink, V: SpecificationValidator> Visualization<S, V> {
    pub fn pointer_down(&mut self, input: PointerInput) -> VizResult<()> {
        self.ensure_usable()?;
        let Some(viewport) = self.viewport.as_ref() else {
            return Ok(());
        };
        let effects = self.controller.pointer_down(input, viewport, self.size);
        self.apply_effects(effects)
    }

    /// Advances the active gesture, tracks label hover and issues a hover query.
    pub fn pointer_move(&mut self, input: PointerInput) -> VizResult<()> {
        self.ensure_usable()?;
        let Some(viewport) = self.viewport.as_mut() else {
            return Ok(());
        };
        let effects = self.controller.pointer_move(input, viewport, self.size);
        self.apply_effects(effects)?;
        self.update_label_hover(Some(input));
        Ok(())
    }

    pub fn pointer_up(&mut self, input: PointerInput) -> VizResult<()> {
        self.ensure_usable()?;
        let effects = self.controller.pointer_up(input);
        self.apply_effects(effects)
    }

    /// Ends any gesture in flight; box and lasso commit as on pointer up.
    pub fn pointer_leave(&mut self) -> VizResult<()> {
        self.ensure_usable()?;
        let effects = self.controller.pointer_leave();
        self.apply_effects(effects)?;
        self.update_label_hover(None);
        Ok(())
    }

    /// A click on a label fires `labelClicked`; anywhere else queries the clicked point.
    pub fn click(&mut self, input: PointerInput) -> VizResult<()> {
        self.ensure_usable()?;
        if let Some(placed) = self.overlay.label_at(input.position) {
            let event = VizEvent::LabelClicked(LabelEvent::from_label(&placed.label));
            self.events.dispatch(&event);
            return Ok(());
        }
        let Some(viewport) = self.viewport.as_ref() else {
            return Ok(());
        };
        let effects = self.controller.click(input, viewport, self.size);
        self.apply_effects(effects)
    }

    /// Zooms at the pointer; negative `delta` zooms in.
    pub fn wheel(&mut self, input: PointerInput, delta: f64) -> VizResult<()> {
        self.ensure_usable()?;
        let Some(viewport) = self.viewport.as_mut() else {
            return Ok(());
        };
        let effects = self.controller.wheel(input, delta, viewport, self.size);
        self.apply_effects(effects)
    }

    fn apply_effects(&mut self, effects: InteractionEffects) -> VizResult<()> {
        for effect in effects {
            trace!(?effect, "applying interaction effect");
            match effect {
                InteractionEffect::ViewportChanged(change) => self.on_viewport_changed(change)?,
                InteractionEffect::SelectionProgress { kind, bounds } => {
                    self.overlay.set_selection_outline(Some(bounds.clone()));
                    self.redraw_overlay()?;
                    self.events.dispatch(&VizEvent::OnSelection { kind, bounds });
                }
                InteractionEffect::SelectionCommitted { kind, bounds } => {
                    self.overlay.set_selection_outline(None);
                    self.redraw_overlay()?;
                    let query = match kind {
                        SelectionKind::Box => match <[f64; 4]>::try_from(bounds.as_slice()) {
                            Ok(bounds) => DataQuery::SelectBox { bounds },
                            Err(_) => continue,
                        },
                        SelectionKind::Lasso => DataQuery::SelectLasso { polygon: bounds },
                    };
                    self.submit(query)?;
                }
                InteractionEffect::SelectionDiscarded { kind } => {
                    trace!(?kind, "selection discarded");
                    self.overlay.set_selection_outline(None);
                    self.redraw_overlay()?;
                }
                InteractionEffect::HoverQuery(point) => {
                    let Some(scale) = self.pixel_scale() else {
                        continue;
                    };
                    self.submit(DataQuery::ClosestPoint {
                        point,
                        scale,
                        tolerance_px: self.config.hover_tolerance_px,
                    })?;
                }
                InteractionEffect::ClickQuery { data, .. } => {
                    let Some(scale) = self.pixel_scale() else {
                        continue;
                    };
                    self.submit(DataQuery::ClickPoint {
                        point: data,
                        scale,
                        tolerance_px: self.config.hover_tolerance_px,
                    })?;
                }
            }
        }
        Ok(())
    }

    fn on_viewport_changed(&mut self, change: ViewportChange) -> VizResult<()> {
        self.push_viewport()?;
        self.redraw_overlay()?;
        let Some(snapshot) = self.viewport.as_ref().map(|viewport| viewport.snapshot()) else {
            return Ok(());
        };
        let event = match change {
            ViewportChange::ZoomIn => VizEvent::ZoomIn(snapshot),
            ViewportChange::ZoomOut => VizEvent::ZoomOut(snapshot),
            ViewportChange::Pan => VizEvent::Pan(snapshot),
        };
        self.events.dispatch(&event);
        Ok(())
    }

    fn update_label_hover(&mut self, input: Option<PointerInput>) {
        let current = input
            .and_then(|input| self.overlay.label_at(input.position))
            .cloned();
        let previous_slot = self.hovered_label.as_ref().map(|placed| placed.slot);
        if previous_slot == current.as_ref().map(|placed| placed.slot) {
            return;
        }
        if let Some(previous) = self.hovered_label.take() {
            self.events
                .dispatch(&VizEvent::LabelUnhovered(LabelEvent::from_label(&previous.label)));
        }
        if let Some(placed) = &current {
            self.events
                .dispatch(&VizEvent::LabelHovered(LabelEvent::from_label(&placed.label)));
        }
        self.hovered_label = current;
    }

    fn pixel_scale(&self) -> Option<PixelScale> {
        self.viewport
            .as_ref()
            .map(|viewport| viewport.transform(self.size).pixel_scale())
    }

    fn submit(&mut self, query: DataQuery) -> VizResult<()> {
        let submitted = self.data.submit(query, self.generation);
        self.poison_on_failure(submitted).map(|_| ())
    }
}
