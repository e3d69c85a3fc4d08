use smallvec::SmallVec;
use tracing::trace;

use crate::core::{CanvasSize, DataPoint, PanOutcome, ScreenPoint, ViewportState};
use crate::error::VizResult;

use super::gesture::GestureBuffer;
use super::{GestureState, PointerButton, PointerInput, SelectionKind, ToolMode, ViewportChange};

/// Side effects a pointer event asks the coordinator to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEffect {
    /// The viewport was mutated in place and must be pushed to consumers.
    ViewportChanged(ViewportChange),
    /// Live outline of an unfinished selection gesture.
    SelectionProgress {
        kind: SelectionKind,
        bounds: Vec<f64>,
    },
    /// A finished gesture with enough points to query the data worker.
    SelectionCommitted {
        kind: SelectionKind,
        bounds: Vec<f64>,
    },
    /// A finished gesture that did not collect enough points.
    SelectionDiscarded { kind: SelectionKind },
    HoverQuery(DataPoint),
    ClickQuery { data: DataPoint, screen: ScreenPoint },
}

pub type InteractionEffects = SmallVec<[InteractionEffect; 2]>;

/// Pointer-driven state machine over pan / box / lasso tools.
///
/// The controller mutates the viewport it is handed and reports everything else
/// as [`InteractionEffect`]s; it never talks to workers or overlays itself.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    tool: ToolMode,
    state: GestureState,
    buffer: GestureBuffer,
    last_position: Option<ScreenPoint>,
}

impl InteractionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    /// Takes effect at the next gesture start; a running gesture keeps its tool.
    pub fn set_tool(&mut self, tool: ToolMode) {
        self.tool = tool;
    }

    pub fn set_tool_name(&mut self, name: &str) -> VizResult<()> {
        self.tool = name.parse()?;
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    #[must_use]
    pub fn gesture_points(&self) -> &[f64] {
        self.buffer.as_slice()
    }

    /// Drops any gesture in flight without emitting effects.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
        self.buffer.clear();
        self.last_position = None;
    }

    pub fn pointer_down(
        &mut self,
        input: PointerInput,
        viewport: &ViewportState,
        size: CanvasSize,
    ) -> InteractionEffects {
        if input.button != PointerButton::Primary {
            return InteractionEffects::new();
        }
        self.last_position = Some(input.position);
        let anchor = viewport.transform(size).to_data(input.position);

        self.state = match self.tool {
            ToolMode::Pan => {
                self.buffer.clear();
                GestureState::Panning
            }
            ToolMode::Box => {
                self.buffer.begin(anchor);
                GestureState::BoxSelecting
            }
            ToolMode::Lasso => {
                self.buffer.begin(anchor);
                GestureState::LassoSelecting
            }
        };
        trace!(state = ?self.state, "gesture started");
        InteractionEffects::new()
    }

    /// Advances the active gesture and always issues a hover query.
    pub fn pointer_move(
        &mut self,
        input: PointerInput,
        viewport: &mut ViewportState,
        size: CanvasSize,
    ) -> InteractionEffects {
        let data = viewport.transform(size).to_data(input.position);
        let (movement_x, movement_y) = input
            .movement
            .or_else(|| {
                self.last_position.map(|last| {
                    (
                        input.position.x - last.x,
                        input.position.y - last.y,
                    )
                })
            })
            .unwrap_or((0.0, 0.0));
        self.last_position = Some(input.position);

        let mut effects = InteractionEffects::new();
        match self.state {
            GestureState::Idle => {}
            GestureState::Panning => {
                if viewport.pan(movement_x, movement_y) == PanOutcome::Moved {
                    effects.push(InteractionEffect::ViewportChanged(ViewportChange::Pan));
                }
            }
            GestureState::BoxSelecting => {
                self.buffer.set_corner(data);
                effects.push(InteractionEffect::SelectionProgress {
                    kind: SelectionKind::Box,
                    bounds: self.buffer.as_slice().to_vec(),
                });
            }
            GestureState::LassoSelecting => {
                self.buffer.push(data);
                effects.push(InteractionEffect::SelectionProgress {
                    kind: SelectionKind::Lasso,
                    bounds: self.buffer.as_slice().to_vec(),
                });
            }
        }
        effects.push(InteractionEffect::HoverQuery(data));
        effects
    }

    pub fn pointer_up(&mut self, input: PointerInput) -> InteractionEffects {
        if input.button != PointerButton::Primary {
            return InteractionEffects::new();
        }
        self.finish_gesture()
    }

    /// Leaving the surface ends every gesture; panning stops instead of running away.
    pub fn pointer_leave(&mut self) -> InteractionEffects {
        self.last_position = None;
        self.finish_gesture()
    }

    pub fn click(
        &mut self,
        input: PointerInput,
        viewport: &ViewportState,
        size: CanvasSize,
    ) -> InteractionEffects {
        let data = viewport.transform(size).to_data(input.position);
        let mut effects = InteractionEffects::new();
        effects.push(InteractionEffect::ClickQuery {
            data,
            screen: input.position,
        });
        effects
    }

    pub fn wheel(
        &mut self,
        input: PointerInput,
        delta: f64,
        viewport: &mut ViewportState,
        size: CanvasSize,
    ) -> InteractionEffects {
        let pointer = viewport.transform(size).to_data(input.position);
        let outcome = viewport.zoom(delta, pointer);
        let mut effects = InteractionEffects::new();
        if let Some(change) = ViewportChange::from_zoom(outcome) {
            effects.push(InteractionEffect::ViewportChanged(change));
        }
        effects
    }

    fn finish_gesture(&mut self) -> InteractionEffects {
        let finished = std::mem::replace(&mut self.state, GestureState::Idle);
        let mut effects = InteractionEffects::new();
        let (kind, complete) = match finished {
            GestureState::Idle | GestureState::Panning => {
                self.buffer.clear();
                return effects;
            }
            GestureState::BoxSelecting => (SelectionKind::Box, self.buffer.is_complete_box()),
            GestureState::LassoSelecting => {
                (SelectionKind::Lasso, self.buffer.is_complete_lasso())
            }
        };

        if complete {
            effects.push(InteractionEffect::SelectionCommitted {
                kind,
                bounds: self.buffer.take(),
            });
        } else {
            trace!(?kind, numbers = self.buffer.len(), "selection discarded");
            self.buffer.clear();
            effects.push(InteractionEffect::SelectionDiscarded { kind });
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::{InteractionController, InteractionEffect};
    use crate::core::{AxisRange, CanvasSize, ViewportBounds, ViewportState};
    use crate::interaction::{
        GestureState, PointerButton, PointerInput, SelectionKind, ToolMode, ViewportChange,
    };

    fn setup(tool: ToolMode) -> (InteractionController, ViewportState, CanvasSize) {
        let mut controller = InteractionController::new();
        controller.set_tool(tool);
        let viewport = ViewportState::new(ViewportBounds::new(0.0, 10.0, 0.0, 10.0).expect("bounds"));
        (controller, viewport, CanvasSize::new(500, 500))
    }

    fn committed(effects: &[InteractionEffect]) -> Vec<(SelectionKind, Vec<f64>)> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                InteractionEffect::SelectionCommitted { kind, bounds } => {
                    Some((*kind, bounds.clone()))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn pan_drag_moves_viewport_and_leave_returns_to_idle() {
        let (mut controller, mut viewport, size) = setup(ToolMode::Pan);
        controller.pointer_down(PointerInput::at(100.0, 100.0), &viewport, size);
        assert_eq!(controller.state(), GestureState::Panning);

        let effects = controller.pointer_move(
            PointerInput::at(150.0, 100.0).with_movement(50.0, 0.0),
            &mut viewport,
            size,
        );
        assert!(effects.contains(&InteractionEffect::ViewportChanged(ViewportChange::Pan)));
        assert!((viewport.current_x_range().start + 0.5).abs() <= 1e-12);

        let effects = controller.pointer_leave();
        assert!(effects.is_empty());
        assert_eq!(controller.state(), GestureState::Idle);

        let before = viewport.current_x_range();
        controller.pointer_move(
            PointerInput::at(300.0, 100.0).with_movement(150.0, 0.0),
            &mut viewport,
            size,
        );
        assert_eq!(viewport.current_x_range(), before);
    }

    #[test]
    fn movement_is_derived_from_previous_sample_when_missing() {
        let (mut controller, mut viewport, size) = setup(ToolMode::Pan);
        controller.pointer_down(PointerInput::at(100.0, 100.0), &viewport, size);
        controller.pointer_move(PointerInput::at(200.0, 100.0), &mut viewport, size);

        assert_eq!(viewport.current_x_range(), AxisRange::new(-1.0, 9.0));
    }

    #[test]
    fn box_gesture_truncates_to_anchor_and_current_corner() {
        let (mut controller, mut viewport, size) = setup(ToolMode::Box);
        controller.pointer_down(PointerInput::at(0.0, 500.0), &viewport, size);
        controller.pointer_move(PointerInput::at(100.0, 400.0), &mut viewport, size);
        let effects = controller.pointer_move(PointerInput::at(250.0, 250.0), &mut viewport, size);

        assert_eq!(
            effects[0],
            InteractionEffect::SelectionProgress {
                kind: SelectionKind::Box,
                bounds: vec![0.0, 0.0, 5.0, 5.0],
            }
        );

        let effects = controller.pointer_up(PointerInput::at(250.0, 250.0));
        assert_eq!(
            committed(&effects),
            vec![(SelectionKind::Box, vec![0.0, 0.0, 5.0, 5.0])]
        );
        assert!(controller.gesture_points().is_empty());
    }

    #[test]
    fn box_gesture_without_movement_is_discarded() {
        let (mut controller, viewport, size) = setup(ToolMode::Box);
        controller.pointer_down(PointerInput::at(10.0, 10.0), &viewport, size);
        let effects = controller.pointer_up(PointerInput::at(10.0, 10.0));

        assert!(committed(&effects).is_empty());
        assert_eq!(
            effects.as_slice(),
            &[InteractionEffect::SelectionDiscarded {
                kind: SelectionKind::Box
            }]
        );
    }

    #[test]
    fn lasso_with_two_vertices_is_discarded_and_three_commits() {
        let (mut controller, mut viewport, size) = setup(ToolMode::Lasso);
        controller.pointer_down(PointerInput::at(0.0, 500.0), &viewport, size);
        controller.pointer_move(PointerInput::at(50.0, 500.0), &mut viewport, size);
        assert!(committed(&controller.pointer_up(PointerInput::at(50.0, 500.0))).is_empty());

        controller.pointer_down(PointerInput::at(0.0, 500.0), &viewport, size);
        controller.pointer_move(PointerInput::at(50.0, 500.0), &mut viewport, size);
        controller.pointer_move(PointerInput::at(50.0, 450.0), &mut viewport, size);
        let effects = controller.pointer_up(PointerInput::at(50.0, 450.0));
        assert_eq!(
            committed(&effects),
            vec![(SelectionKind::Lasso, vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0])]
        );
    }

    #[test]
    fn hover_query_fires_on_every_move_regardless_of_state() {
        let (mut controller, mut viewport, size) = setup(ToolMode::Lasso);
        let idle = controller.pointer_move(PointerInput::at(250.0, 250.0), &mut viewport, size);
        assert!(matches!(idle.last(), Some(InteractionEffect::HoverQuery(_))));

        controller.pointer_down(PointerInput::at(250.0, 250.0), &viewport, size);
        let active = controller.pointer_move(PointerInput::at(260.0, 250.0), &mut viewport, size);
        assert!(matches!(active.last(), Some(InteractionEffect::HoverQuery(_))));
    }

    #[test]
    fn secondary_button_does_not_start_a_gesture() {
        let (mut controller, viewport, size) = setup(ToolMode::Box);
        controller.pointer_down(
            PointerInput::at(10.0, 10.0).with_button(PointerButton::Secondary),
            &viewport,
            size,
        );
        assert_eq!(controller.state(), GestureState::Idle);
    }

    #[test]
    fn wheel_reports_zoom_direction() {
        let (mut controller, mut viewport, size) = setup(ToolMode::Pan);
        let effects = controller.wheel(PointerInput::at(250.0, 250.0), -100.0, &mut viewport, size);
        assert_eq!(
            effects.as_slice(),
            &[InteractionEffect::ViewportChanged(ViewportChange::ZoomIn)]
        );

        let effects = controller.wheel(PointerInput::at(250.0, 250.0), 50.0, &mut viewport, size);
        assert_eq!(
            effects.as_slice(),
            &[InteractionEffect::ViewportChanged(ViewportChange::ZoomOut)]
        );
    }

    #[test]
    fn tool_name_assignment_fails_fast() {
        let mut controller = InteractionController::new();
        assert!(controller.set_tool_name("brush").is_err());
        assert_eq!(controller.tool(), ToolMode::Pan);
    }
}
