use serde::{Deserialize, Serialize};

use crate::core::{CanvasSize, DEFAULT_PAN_DIVISOR, DEFAULT_ZOOM_SENSITIVITY, PanBoundsPolicy};
use crate::error::{VizError, VizResult};
use crate::interaction::ToolMode;
use crate::render::OverlayStyle;

/// Public visualization bootstrap configuration.
///
/// Serializable so hosts can keep interaction tuning next to their own settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualizationConfig {
    pub canvas: CanvasSize,
    #[serde(default = "default_zoom_sensitivity")]
    pub zoom_sensitivity: f64,
    #[serde(default = "default_pan_divisor")]
    pub pan_divisor: f64,
    #[serde(default)]
    pub pan_bounds_policy: PanBoundsPolicy,
    /// Pointer tolerance for hover and click hit-testing, in pixels.
    #[serde(default = "default_hover_tolerance_px")]
    pub hover_tolerance_px: f64,
    #[serde(default)]
    pub initial_tool: ToolMode,
    #[serde(default = "default_true")]
    pub highlight_on_select: bool,
    #[serde(default = "default_true")]
    pub highlight_on_click: bool,
    /// Drop query responses issued against an older specification.
    #[serde(default = "default_true")]
    pub fence_stale_responses: bool,
    #[serde(default)]
    pub overlay_style: OverlayStyle,
}

impl VisualizationConfig {
    #[must_use]
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            zoom_sensitivity: default_zoom_sensitivity(),
            pan_divisor: default_pan_divisor(),
            pan_bounds_policy: PanBoundsPolicy::default(),
            hover_tolerance_px: default_hover_tolerance_px(),
            initial_tool: ToolMode::default(),
            highlight_on_select: true,
            highlight_on_click: true,
            fence_stale_responses: true,
            overlay_style: OverlayStyle::default(),
        }
    }

    #[must_use]
    pub fn with_zoom_sensitivity(mut self, sensitivity: f64) -> Self {
        self.zoom_sensitivity = sensitivity;
        self
    }

    #[must_use]
    pub fn with_pan_divisor(mut self, divisor: f64) -> Self {
        self.pan_divisor = divisor;
        self
    }

    #[must_use]
    pub fn with_pan_bounds_policy(mut self, policy: PanBoundsPolicy) -> Self {
        self.pan_bounds_policy = policy;
        self
    }

    #[must_use]
    pub fn with_hover_tolerance_px(mut self, tolerance: f64) -> Self {
        self.hover_tolerance_px = tolerance;
        self
    }

    #[must_use]
    pub fn with_initial_tool(mut self, tool: ToolMode) -> Self {
        self.initial_tool = tool;
        self
    }

    #[must_use]
    pub fn with_highlighting(mut self, on_select: bool, on_click: bool) -> Self {
        self.highlight_on_select = on_select;
        self.highlight_on_click = on_click;
        self
    }

    #[must_use]
    pub fn with_fence_stale_responses(mut self, enabled: bool) -> Self {
        self.fence_stale_responses = enabled;
        self
    }

    #[must_use]
    pub fn with_overlay_style(mut self, style: OverlayStyle) -> Self {
        self.overlay_style = style;
        self
    }

    pub fn validate(&self) -> VizResult<()> {
        self.canvas.validated()?;
        if !self.hover_tolerance_px.is_finite() || self.hover_tolerance_px < 0.0 {
            return Err(VizError::InvalidData(
                "hover tolerance must be finite and >= 0".to_owned(),
            ));
        }
        if !self.overlay_style.font_size_px.is_finite() || self.overlay_style.font_size_px <= 0.0
        {
            return Err(VizError::InvalidData(
                "overlay font size must be finite and > 0".to_owned(),
            ));
        }
        for (name, value) in [
            ("zoom sensitivity", self.zoom_sensitivity),
            ("pan divisor", self.pan_divisor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(VizError::InvalidData(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> VizResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| VizError::InvalidData(format!("failed to serialize config: {e}")))
    }

    pub fn from_json_str(input: &str) -> VizResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| VizError::InvalidData(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_zoom_sensitivity() -> f64 {
    DEFAULT_ZOOM_SENSITIVITY
}

fn default_pan_divisor() -> f64 {
    DEFAULT_PAN_DIVISOR
}

fn default_hover_tolerance_px() -> f64 {
    5.0
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::VisualizationConfig;
    use crate::core::{CanvasSize, PanBoundsPolicy};

    #[test]
    fn minimal_json_fills_defaults() {
        let config =
            VisualizationConfig::from_json_str(r#"{"canvas": {"width": 400, "height": 300}}"#)
                .expect("parse");
        assert_eq!(config, VisualizationConfig::new(CanvasSize::new(400, 300)));
        assert!(config.fence_stale_responses);
        assert_eq!(config.hover_tolerance_px, 5.0);
    }

    #[test]
    fn json_round_trip_keeps_policy() {
        let config = VisualizationConfig::new(CanvasSize::new(10, 10))
            .with_pan_bounds_policy(PanBoundsPolicy::ShiftIntoBounds);
        let json = config.to_json_pretty().expect("serialize");
        assert!(json.contains("shiftIntoBounds"));
        assert_eq!(VisualizationConfig::from_json_str(&json).expect("parse"), config);
    }

    #[test]
    fn rejects_bad_tuning() {
        let config = VisualizationConfig::new(CanvasSize::new(10, 10)).with_pan_divisor(0.0);
        assert!(config.validate().is_err());
        let config = VisualizationConfig::new(CanvasSize::new(0, 10));
        assert!(config.validate().is_err());
    }
}
