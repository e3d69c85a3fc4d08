mod controller;
mod gesture;

pub use controller::{InteractionController, InteractionEffect, InteractionEffects};
pub use gesture::GestureBuffer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{ScreenPoint, ZoomOutcome};
use crate::error::VizError;

/// Active pointer tool. Read by the controller at the start of every gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    Pan,
    Box,
    Lasso,
}

impl ToolMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Box => "box",
            Self::Lasso => "lasso",
        }
    }
}

impl FromStr for ToolMode {
    type Err = VizError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pan" => Ok(Self::Pan),
            "box" => Ok(Self::Box),
            "lasso" => Ok(Self::Lasso),
            other => Err(VizError::InvalidTool(other.to_owned())),
        }
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureState {
    #[default]
    Idle,
    Panning,
    BoxSelecting,
    LassoSelecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Box,
    Lasso,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Which viewport mutation a gesture produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewportChange {
    ZoomIn,
    ZoomOut,
    Pan,
}

impl ViewportChange {
    #[must_use]
    pub fn from_zoom(outcome: ZoomOutcome) -> Option<Self> {
        match outcome {
            ZoomOutcome::ZoomIn => Some(Self::ZoomIn),
            ZoomOutcome::ZoomOut => Some(Self::ZoomOut),
            ZoomOutcome::Rejected => None,
        }
    }
}

/// One pointer sample on the input surface, in canvas pixels.
///
/// `movement` mirrors the per-event movement deltas browsers and windowing
/// toolkits report; when absent it is derived from the previous sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub position: ScreenPoint,
    pub movement: Option<(f64, f64)>,
    pub button: PointerButton,
}

impl PointerInput {
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: ScreenPoint::new(x, y),
            movement: None,
            button: PointerButton::Primary,
        }
    }

    #[must_use]
    pub fn with_movement(mut self, dx: f64, dy: f64) -> Self {
        self.movement = Some((dx, dy));
        self
    }

    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::ToolMode;
    use crate::error::VizError;

    #[test]
    fn tool_mode_parses_known_names() {
        assert_eq!("pan".parse::<ToolMode>().expect("pan"), ToolMode::Pan);
        assert_eq!("box".parse::<ToolMode>().expect("box"), ToolMode::Box);
        assert_eq!("lasso".parse::<ToolMode>().expect("lasso"), ToolMode::Lasso);
    }

    #[test]
    fn tool_mode_rejects_unknown_names() {
        let err = "zoom".parse::<ToolMode>().expect_err("unknown tool must fail");
        assert!(matches!(err, VizError::InvalidTool(ref name) if name == "zoom"));
    }
}
