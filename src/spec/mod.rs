//! Declarative specification object accepted by the visualization.
//!
//! Only the parts the coordination layer needs are modelled strictly: track
//! positions (for point extraction and bounds), margins, axis placement and
//! labels. Mark-specific encodings stay loosely typed so layout builders can
//! evolve without touching this crate.

mod validation;

pub use validation::{Diagnostic, SpecificationValidator, StructuralValidator, ValidationReport};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{DataPoint, ViewportBounds};
use crate::error::{VizError, VizResult};

/// Column-oriented data keyed by attribute name.
pub type DataColumns = IndexMap<String, Column>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Categorical(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric(values) => Some(values),
            Self::Categorical(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Point,
    Rect,
    Tick,
    Line,
    Area,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Quantitative,
    Categorical,
    Genomic,
    #[serde(rename = "genomicRange")]
    GenomicRange,
    Inline,
}

/// One visual encoding channel: either a data attribute or a constant value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChannelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
}

impl Channel {
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            attribute: Some(name.into()),
            kind: Some(ChannelType::Quantitative),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self {
            value: Some(serde_json::Value::from(value)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn constant_number(&self) -> Option<f64> {
        self.value.as_ref().and_then(serde_json::Value::as_f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub mark: Mark,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataColumns>,
    pub x: Channel,
    pub y: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Channel>,
}

impl Track {
    #[must_use]
    pub fn new(mark: Mark, x: Channel, y: Channel) -> Self {
        Self {
            mark,
            data: None,
            x,
            y,
            color: None,
            size: None,
            opacity: None,
            width: None,
            height: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: DataColumns) -> Self {
        self.data = Some(data);
        self
    }

    /// Own data when present, otherwise the specification-wide default data.
    #[must_use]
    pub fn resolve_data<'a>(&'a self, default_data: &'a DataColumns) -> &'a DataColumns {
        self.data.as_ref().unwrap_or(default_data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XAxisPlacement {
    #[default]
    Bottom,
    Top,
    Center,
    None,
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxisPlacement {
    #[default]
    Left,
    Right,
    Center,
    None,
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Row,
    Column,
}

/// Data label drawn in the overlay.
///
/// A fixed axis is frozen at the screen position of the first layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub fixed_x: bool,
    #[serde(default)]
    pub fixed_y: bool,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: LabelKind,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub default_data: DataColumns,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub x_axis: XAxisPlacement,
    #[serde(default)]
    pub y_axis: YAxisPlacement,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Specification {
    #[must_use]
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            default_data: DataColumns::new(),
            margins: Margins::default(),
            x_axis: XAxisPlacement::default(),
            y_axis: YAxisPlacement::default(),
            labels: Vec::new(),
            width: None,
            height: None,
        }
    }

    #[must_use]
    pub fn with_default_data(mut self, data: DataColumns) -> Self {
        self.default_data = data;
        self
    }

    #[must_use]
    pub fn with_labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = labels;
        self
    }

    pub fn from_json_value(value: serde_json::Value) -> VizResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| VizError::InvalidData(format!("failed to parse specification: {e}")))
    }

    pub fn from_json_str(input: &str) -> VizResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| VizError::InvalidData(format!("failed to parse specification: {e}")))
    }

    /// Positions of every mark, tracks concatenated in declaration order.
    ///
    /// The returned index space is the one selection and highlight indices use.
    /// Rows whose x or y cannot be resolved to a number become NaN so indices stay
    /// aligned; spatial queries skip them.
    #[must_use]
    pub fn points(&self) -> Vec<DataPoint> {
        let mut points = Vec::new();
        for track in &self.tracks {
            let data = track.resolve_data(&self.default_data);
            let rows = track_row_count(track, data);
            let xs = channel_values(&track.x, data, rows);
            let ys = channel_values(&track.y, data, rows);
            points.extend(
                xs.into_iter()
                    .zip(ys)
                    .map(|(x, y)| DataPoint::new(x, y)),
            );
        }
        points
    }

    /// Outer viewport bounds: declared channel domains first, data extent otherwise.
    ///
    /// Returns `None` when neither axis can be resolved.
    #[must_use]
    pub fn data_bounds(&self) -> Option<ViewportBounds> {
        let points = self.points();
        let x = declared_domain(self.tracks.iter().map(|track| &track.x))
            .or_else(|| extent(points.iter().map(|point| point.x)))?;
        let y = declared_domain(self.tracks.iter().map(|track| &track.y))
            .or_else(|| extent(points.iter().map(|point| point.y)))?;
        let (min_x, max_x) = padded(x);
        let (min_y, max_y) = padded(y);
        ViewportBounds::new(min_x, max_x, min_y, max_y).ok()
    }
}

fn track_row_count(track: &Track, data: &DataColumns) -> usize {
    [&track.x, &track.y]
        .into_iter()
        .filter_map(|channel| channel.attribute.as_ref())
        .filter_map(|name| data.get(name))
        .map(Column::len)
        .max()
        .unwrap_or(0)
}

fn channel_values(channel: &Channel, data: &DataColumns, rows: usize) -> Vec<f64> {
    if let Some(values) = channel
        .attribute
        .as_ref()
        .and_then(|name| data.get(name))
        .and_then(Column::as_numeric)
    {
        let mut values = values.to_vec();
        values.resize(rows, f64::NAN);
        return values;
    }
    vec![channel.constant_number().unwrap_or(f64::NAN); rows]
}

fn declared_domain<'a>(channels: impl Iterator<Item = &'a Channel>) -> Option<(f64, f64)> {
    channels
        .filter_map(|channel| channel.domain)
        .filter(|[lo, hi]| lo.is_finite() && hi.is_finite())
        .map(|[lo, hi]| (lo.min(hi), lo.max(hi)))
        .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)))
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|value| value.is_finite())
        .map(|value| (value, value))
        .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)))
}

// Zero-width extents (a single column of points) get a unit window around them.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if lo < hi {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::{Channel, Column, DataColumns, Mark, Specification, Track};

    fn columns(entries: &[(&str, Vec<f64>)]) -> DataColumns {
        entries
            .iter()
            .map(|(name, values)| ((*name).to_owned(), Column::Numeric(values.clone())))
            .collect()
    }

    #[test]
    fn points_concatenate_tracks_and_fall_back_to_default_data() {
        let spec = Specification::new(vec![
            Track::new(Mark::Point, Channel::attribute("a"), Channel::attribute("b")),
            Track::new(Mark::Tick, Channel::attribute("a"), Channel::constant(7.0))
                .with_data(columns(&[("a", vec![9.0])])),
        ])
        .with_default_data(columns(&[("a", vec![1.0, 2.0]), ("b", vec![3.0, 4.0])]));

        let points = spec.points();
        assert_eq!(points.len(), 3);
        assert_eq!((points[1].x, points[1].y), (2.0, 4.0));
        assert_eq!((points[2].x, points[2].y), (9.0, 7.0));
    }

    #[test]
    fn bounds_prefer_declared_domains() {
        let mut x = Channel::attribute("a");
        x.domain = Some([-5.0, 5.0]);
        let spec = Specification::new(vec![Track::new(Mark::Rect, x, Channel::attribute("b"))])
            .with_default_data(columns(&[("a", vec![1.0, 2.0]), ("b", vec![3.0, 4.0])]));

        let bounds = spec.data_bounds().expect("bounds");
        assert_eq!(bounds.to_array(), [-5.0, 5.0, 3.0, 4.0]);
    }

    #[test]
    fn single_value_extent_is_padded() {
        let spec = Specification::new(vec![Track::new(
            Mark::Point,
            Channel::attribute("a"),
            Channel::attribute("a"),
        )])
        .with_default_data(columns(&[("a", vec![2.0])]));

        assert_eq!(spec.data_bounds().expect("bounds").to_array(), [1.5, 2.5, 1.5, 2.5]);
    }

    #[test]
    fn parses_camel_case_json() {
        let spec = Specification::from_json_str(
            r#"{
                "tracks": [{"mark": "point", "x": {"attribute": "a", "type": "quantitative"},
                            "y": {"attribute": "b", "type": "quantitative"}}],
                "defaultData": {"a": [1, 2], "b": [3, 4], "name": ["p", "q"]},
                "margins": {"top": 10, "bottom": 20, "left": 30, "right": 5},
                "xAxis": "zero",
                "yAxis": "right",
                "labels": [{"x": 1, "y": 2, "fixedX": true, "text": "r1", "type": "row", "index": 0}]
            }"#,
        )
        .expect("spec");

        assert_eq!(spec.points().len(), 2);
        assert!(matches!(spec.default_data.get("name"), Some(Column::Categorical(_))));
        assert!(spec.labels[0].fixed_x);
        assert!(!spec.labels[0].fixed_y);
    }
}
