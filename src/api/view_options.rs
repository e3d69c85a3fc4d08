use serde_json::Value;
use tracing::debug;

use crate::core::{AxisRange, ViewportBounds};
use crate::error::{VizError, VizResult};
use crate::interaction::ToolMode;

/// Host-supplied view settings, parsed from a loose JSON object.
///
/// Recognized keys: `lockedX`, `lockedY`, `tool`, `viewport`
/// (`[minX, maxX, minY, maxY]`), `currentXRange`, `currentYRange`. Anything else
/// is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewOptions {
    pub locked_x: Option<bool>,
    pub locked_y: Option<bool>,
    pub tool: Option<ToolMode>,
    pub viewport: Option<ViewportBounds>,
    pub current_x_range: Option<AxisRange>,
    pub current_y_range: Option<AxisRange>,
}

impl ViewOptions {
    pub fn from_json_value(value: &Value) -> VizResult<Self> {
        let Value::Object(entries) = value else {
            return Err(VizError::InvalidData(
                "view options must be a JSON object".to_owned(),
            ));
        };

        let mut options = Self::default();
        for (key, entry) in entries {
            match key.as_str() {
                "lockedX" => options.locked_x = Some(parse_bool(key, entry)?),
                "lockedY" => options.locked_y = Some(parse_bool(key, entry)?),
                "tool" => {
                    let name = entry
                        .as_str()
                        .ok_or_else(|| VizError::InvalidTool(entry.to_string()))?;
                    options.tool = Some(name.parse()?);
                }
                "viewport" => {
                    let values: [f64; 4] = parse_array(key, entry)?;
                    options.viewport = Some(ViewportBounds::from_array(values)?);
                }
                "currentXRange" => options.current_x_range = Some(parse_range(key, entry)?),
                "currentYRange" => options.current_y_range = Some(parse_range(key, entry)?),
                other => debug!(key = other, "ignoring unknown view option"),
            }
        }
        Ok(options)
    }

    pub fn from_json_str(input: &str) -> VizResult<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| VizError::InvalidData(format!("failed to parse view options: {e}")))?;
        Self::from_json_value(&value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_bool(key: &str, value: &Value) -> VizResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| VizError::InvalidData(format!("view option `{key}` must be a boolean")))
}

fn parse_array<const N: usize>(key: &str, value: &Value) -> VizResult<[f64; N]> {
    let invalid = || VizError::InvalidData(format!("view option `{key}` must be {N} numbers"));
    let items = value.as_array().ok_or_else(invalid)?;
    let numbers = items
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(invalid)?;
    numbers.try_into().map_err(|_| invalid())
}

fn parse_range(key: &str, value: &Value) -> VizResult<AxisRange> {
    let range = AxisRange::from(parse_array::<2>(key, value)?);
    if !range.is_ordered() {
        return Err(VizError::InvalidData(format!(
            "view option `{key}` must be a finite, ordered [start, end] pair"
        )));
    }
    Ok(range)
}
