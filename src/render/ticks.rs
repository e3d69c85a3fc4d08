use crate::core::AxisRange;

pub(crate) const AXIS_X_TARGET_SPACING_PX: f64 = 80.0;
pub(crate) const AXIS_Y_TARGET_SPACING_PX: f64 = 50.0;
const MIN_TICKS: usize = 2;
const MAX_TICKS: usize = 12;

/// One tick mark: data value plus its label.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    pub label: String,
}

pub(crate) fn axis_tick_target_count(axis_span_px: f64, target_spacing_px: f64) -> usize {
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return MIN_TICKS;
    }
    if !target_spacing_px.is_finite() || target_spacing_px <= 0.0 {
        return MIN_TICKS;
    }

    let raw = (axis_span_px / target_spacing_px).floor() as usize + 1;
    raw.clamp(MIN_TICKS, MAX_TICKS)
}

/// Step of the form 1, 2 or 5 times a power of ten closest to `span / target`.
pub(crate) fn nice_step(span: f64, target_count: usize) -> Option<f64> {
    if !span.is_finite() || span <= 0.0 || target_count == 0 {
        return None;
    }
    let rough = span / target_count as f64;
    let magnitude = 10f64.powf(rough.log10().floor());
    let normalized = rough / magnitude;
    let step = if normalized < 1.5 {
        magnitude
    } else if normalized < 3.5 {
        magnitude * 2.0
    } else if normalized < 7.5 {
        magnitude * 5.0
    } else {
        magnitude * 10.0
    };
    Some(step)
}

pub(crate) fn axis_ticks(range: AxisRange, axis_span_px: f64, target_spacing_px: f64) -> Vec<AxisTick> {
    let target = axis_tick_target_count(axis_span_px, target_spacing_px);
    let Some(step) = nice_step(range.width(), target) else {
        return Vec::new();
    };

    let first = (range.start / step).ceil() as i64;
    let last = (range.end / step).floor() as i64;
    (first..=last)
        .map(|multiple| {
            let value = multiple as f64 * step;
            AxisTick {
                value,
                label: format_tick(value, step),
            }
        })
        .collect()
}

pub(crate) fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    // Avoid "-0" for values that round to zero.
    let rounded = if value.abs() < step * 1e-6 { 0.0 } else { value };
    format!("{rounded:.decimals$}")
}
