use indexmap::IndexMap;
use kiddo::{ImmutableKdTree, SquaredEuclidean};

#[cfg(feature = "parallel-selection")]
use rayon::prelude::*;

use crate::core::{DataPoint, PixelScale};

use super::protocol::ClosestPoint;

const NORMALIZED_SLACK: f64 = 1e-9;

/// Resident point set owned by the data worker.
///
/// Non-finite points keep their index slot but are never returned by any query.
/// The tree holds one entry per distinct coordinate, normalized to the data
/// extent; repeated coordinates resolve to their lowest index.
pub struct PointIndex {
    points: Vec<DataPoint>,
    tree: Option<ImmutableKdTree<f64, 2>>,
    /// Point index behind each tree item.
    slots: Vec<usize>,
    origin: DataPoint,
    span_x: f64,
    span_y: f64,
}

impl PointIndex {
    #[must_use]
    pub fn build(points: Vec<DataPoint>) -> Self {
        let mut distinct: IndexMap<(u64, u64), usize> = IndexMap::new();
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for (index, point) in points.iter().enumerate() {
            if !point.is_finite() {
                continue;
            }
            // `+ 0.0` folds -0.0 into 0.0 so both share a key.
            let key = ((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits());
            distinct.entry(key).or_insert(index);
            min_x = min_x.min(point.x);
            max_x = max_x.max(point.x);
            min_y = min_y.min(point.y);
            max_y = max_y.max(point.y);
        }

        if distinct.is_empty() {
            return Self {
                points,
                tree: None,
                slots: Vec::new(),
                origin: DataPoint::new(0.0, 0.0),
                span_x: 1.0,
                span_y: 1.0,
            };
        }

        let origin = DataPoint::new(min_x, min_y);
        let span_x = normalizing_span(max_x - min_x);
        let span_y = normalizing_span(max_y - min_y);
        let slots: Vec<usize> = distinct.into_values().collect();
        let coords: Vec<[f64; 2]> = slots
            .iter()
            .map(|&index| {
                let point = points[index];
                [(point.x - origin.x) / span_x, (point.y - origin.y) / span_y]
            })
            .collect();

        Self {
            tree: Some(ImmutableKdTree::new_from_slice(&coords)),
            points,
            slots,
            origin,
            span_x,
            span_y,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct finite coordinates held by the tree.
    #[must_use]
    pub fn distinct_len(&self) -> usize {
        self.slots.len()
    }

    /// Point closest to `query` on screen, if it lies within `tolerance_px`.
    ///
    /// `scale` converts data units to pixels per axis, so the winner is the
    /// point nearest the cursor even when the axes use very different units.
    /// Ties go to the lowest index.
    #[must_use]
    pub fn closest(
        &self,
        query: DataPoint,
        scale: PixelScale,
        tolerance_px: f64,
    ) -> Option<ClosestPoint> {
        let tree = self.tree.as_ref()?;
        if !query.is_finite() || !scale.is_valid() || tolerance_px.is_nan() || tolerance_px < 0.0
        {
            return None;
        }

        // Search a circle enclosing the pixel ellipse. The slack keeps points at
        // exactly `tolerance_px` (or an exact hit at zero tolerance) inside the
        // tree's strict radius test.
        let coarsest = (scale.x * self.span_x).min(scale.y * self.span_y);
        let radius = if coarsest > 0.0 {
            tolerance_px / coarsest + NORMALIZED_SLACK
        } else {
            f64::INFINITY
        };
        let normalized = [
            (query.x - self.origin.x) / self.span_x,
            (query.y - self.origin.y) / self.span_y,
        ];

        tree.within_unsorted::<SquaredEuclidean>(&normalized, radius * radius)
            .into_iter()
            .map(|candidate| self.slots[candidate.item as usize])
            .map(|index| (index, scale.distance(self.points[index], query)))
            .filter(|&(_, distance)| distance <= tolerance_px)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(index, distance)| ClosestPoint {
                index,
                point: self.points[index],
                distance,
            })
    }

    /// Indices inside the rectangle spanned by two opposite corners, edges included.
    #[must_use]
    pub fn select_box(&self, bounds: [f64; 4]) -> Vec<usize> {
        let [x0, y0, x1, y1] = bounds;
        let (min_x, max_x) = (x0.min(x1), x0.max(x1));
        let (min_y, max_y) = (y0.min(y1), y0.max(y1));
        self.collect_matching(|point| {
            point.x >= min_x && point.x <= max_x && point.y >= min_y && point.y <= max_y
        })
    }

    /// Indices inside the flat `[x0, y0, x1, y1, ...]` polygon (even-odd rule).
    #[must_use]
    pub fn select_lasso(&self, polygon: &[f64]) -> Vec<usize> {
        if polygon.len() < 6 {
            return Vec::new();
        }
        let vertices: Vec<(f64, f64)> = polygon
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in &vertices {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        self.collect_matching(|point| {
            point.x >= min_x
                && point.x <= max_x
                && point.y >= min_y
                && point.y <= max_y
                && polygon_contains(&vertices, point)
        })
    }

    fn collect_matching<F>(&self, predicate: F) -> Vec<usize>
    where
        F: Fn(&DataPoint) -> bool + Sync,
    {
        #[cfg(feature = "parallel-selection")]
        {
            self.points
                .par_iter()
                .enumerate()
                .filter(|(_, point)| point.is_finite() && predicate(point))
                .map(|(index, _)| index)
                .collect()
        }

        #[cfg(not(feature = "parallel-selection"))]
        {
            self.points
                .iter()
                .enumerate()
                .filter(|(_, point)| point.is_finite() && predicate(point))
                .map(|(index, _)| index)
                .collect()
        }
    }
}

impl std::fmt::Debug for PointIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointIndex")
            .field("points", &self.points.len())
            .field("distinct", &self.slots.len())
            .finish()
    }
}

fn normalizing_span(span: f64) -> f64 {
    if span > 0.0 && span.is_finite() { span } else { 1.0 }
}

fn polygon_contains(vertices: &[(f64, f64)], point: &DataPoint) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if (yi > point.y) != (yj > point.y)
            && point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
