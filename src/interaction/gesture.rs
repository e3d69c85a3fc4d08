use smallvec::SmallVec;

use crate::core::DataPoint;

/// Data-space coordinates collected while a selection button is held.
///
/// Stored flat as `[x0, y0, x1, y1, ...]`, the layout the data worker expects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureBuffer {
    coords: SmallVec<[f64; 8]>,
}

impl GestureBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, anchor: DataPoint) {
        self.coords.clear();
        self.coords.extend([anchor.x, anchor.y]);
    }

    /// Keeps the anchor and replaces everything after it with `corner`.
    pub fn set_corner(&mut self, corner: DataPoint) {
        self.coords.truncate(2);
        if self.coords.len() == 2 {
            self.coords.extend([corner.x, corner.y]);
        }
    }

    pub fn push(&mut self, point: DataPoint) {
        self.coords.extend([point.x, point.y]);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.coords
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Two corners: exactly four numbers.
    #[must_use]
    pub fn is_complete_box(&self) -> bool {
        self.coords.len() == 4
    }

    /// At least three vertices.
    #[must_use]
    pub fn is_complete_lasso(&self) -> bool {
        self.coords.len() >= 6
    }

    pub fn take(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.coords).into_vec()
    }

    pub fn clear(&mut self) {
        self.coords.clear();
    }
}
