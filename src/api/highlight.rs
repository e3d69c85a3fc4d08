use std::collections::BTreeSet;

/// Highlighted point indices with a revision counter bumped on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet {
    indices: BTreeSet<usize>,
    revision: u64,
}

impl HighlightSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `index`; returns whether it is highlighted afterwards.
    pub fn toggle(&mut self, index: usize) -> bool {
        let highlighted = if self.indices.remove(&index) {
            false
        } else {
            self.indices.insert(index)
        };
        self.revision += 1;
        highlighted
    }

    pub fn replace_with<I>(&mut self, indices: I)
    where
        I: IntoIterator<Item = usize>,
    {
        self.indices = indices.into_iter().collect();
        self.revision += 1;
    }

    pub fn extend<I>(&mut self, indices: I)
    where
        I: IntoIterator<Item = usize>,
    {
        let before = self.indices.len();
        self.indices.extend(indices);
        if self.indices.len() != before {
            self.revision += 1;
        }
    }

    /// Returns `false` when the set was already empty.
    pub fn clear(&mut self) -> bool {
        if self.indices.is_empty() {
            return false;
        }
        self.indices.clear();
        self.revision += 1;
        true
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Ascending indices.
    #[must_use]
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}
