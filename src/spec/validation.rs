use serde::{Deserialize, Serialize};

use super::{Channel, Column, DataColumns, Specification};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// JSON-pointer-like location, for example `/tracks/0/x`.
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Accept/reject verdict plus the reasons behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    #[must_use]
    pub fn valid() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(path, message));
    }
}

/// Schema check run before a specification is installed.
///
/// Implementations may wrap a full schema engine; the coordinator only looks at
/// the verdict and logs the diagnostics.
pub trait SpecificationValidator {
    fn validate(&self, specification: &Specification) -> ValidationReport;
}

/// Structural checks the coordination layer depends on.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl SpecificationValidator for StructuralValidator {
    fn validate(&self, specification: &Specification) -> ValidationReport {
        let mut report = ValidationReport::valid();

        if specification.tracks.is_empty() {
            report.push("/tracks", "at least one track is required");
        }
        for (index, track) in specification.tracks.iter().enumerate() {
            let data = track.resolve_data(&specification.default_data);
            let path = format!("/tracks/{index}");
            validate_position_channel(&mut report, &format!("{path}/x"), &track.x, data);
            validate_position_channel(&mut report, &format!("{path}/y"), &track.y, data);
            if let Some(own) = &track.data {
                validate_columns(&mut report, &format!("{path}/data"), own);
            }
        }
        validate_columns(&mut report, "/defaultData", &specification.default_data);

        let margins = specification.margins;
        for (side, value) in [
            ("top", margins.top),
            ("bottom", margins.bottom),
            ("left", margins.left),
            ("right", margins.right),
        ] {
            if !value.is_finite() || value < 0.0 {
                report.push(format!("/margins/{side}"), "margin must be finite and >= 0");
            }
        }

        for (side, value) in [("width", specification.width), ("height", specification.height)] {
            if value == Some(0) {
                report.push(format!("/{side}"), "size must be > 0 when present");
            }
        }

        for (index, label) in specification.labels.iter().enumerate() {
            if !label.x.is_finite() || !label.y.is_finite() {
                report.push(format!("/labels/{index}"), "label position must be finite");
            }
            if label.text.is_empty() {
                report.push(format!("/labels/{index}/text"), "label text must not be empty");
            }
        }

        report
    }
}

fn validate_position_channel(
    report: &mut ValidationReport,
    path: &str,
    channel: &Channel,
    data: &DataColumns,
) {
    match (&channel.attribute, channel.constant_number()) {
        (Some(name), _) => match data.get(name) {
            Some(Column::Numeric(_)) => {}
            Some(Column::Categorical(_)) => {
                report.push(path, format!("attribute `{name}` must reference a numeric column"));
            }
            None => report.push(path, format!("attribute `{name}` not found in data")),
        },
        (None, Some(_)) => {}
        (None, None) => report.push(path, "channel needs an attribute or a numeric value"),
    }

    if let Some([lo, hi]) = channel.domain {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            report.push(format!("{path}/domain"), "domain must be finite with min <= max");
        }
    }
}

fn validate_columns(report: &mut ValidationReport, path: &str, data: &DataColumns) {
    let mut lengths = data.iter().map(|(name, column)| (name, column.len()));
    let Some((first_name, expected)) = lengths.next() else {
        return;
    };
    for (name, len) in lengths {
        if len != expected {
            report.push(
                format!("{path}/{name}"),
                format!("column has {len} rows but `{first_name}` has {expected}"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SpecificationValidator, StructuralValidator};
    use crate::spec::{Channel, Column, DataColumns, Mark, Specification, Track};

    fn data() -> DataColumns {
        [
            ("a".to_owned(), Column::Numeric(vec![1.0, 2.0])),
            ("b".to_owned(), Column::Numeric(vec![3.0, 4.0])),
            (
                "name".to_owned(),
                Column::Categorical(vec!["p".to_owned(), "q".to_owned()]),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn accepts_well_formed_specification() {
        let spec = Specification::new(vec![Track::new(
            Mark::Point,
            Channel::attribute("a"),
            Channel::attribute("b"),
        )])
        .with_default_data(data());

        assert!(StructuralValidator.validate(&spec).is_valid());
    }

    #[test]
    fn reports_missing_and_categorical_attributes() {
        let spec = Specification::new(vec![Track::new(
            Mark::Point,
            Channel::attribute("missing"),
            Channel::attribute("name"),
        )])
        .with_default_data(data());

        let report = StructuralValidator.validate(&spec);
        let paths: Vec<&str> = report.diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["/tracks/0/x", "/tracks/0/y"]);
    }

    #[test]
    fn rejects_empty_tracks_and_ragged_columns() {
        let mut data = data();
        data.insert("c".to_owned(), Column::Numeric(vec![1.0]));
        let spec = Specification::new(Vec::new()).with_default_data(data);

        let report = StructuralValidator.validate(&spec);
        assert!(!report.is_valid());
        assert!(report.diagnostics.iter().any(|d| d.path == "/tracks"));
        assert!(report.diagnostics.iter().any(|d| d.path == "/defaultData/c"));
    }
}
