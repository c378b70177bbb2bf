//! Per-feature, append-only, geometrically-growing score storage.

use crate::error::{CollectorError, Result};

/// One `(written, value)` slot in a [`ScoreTable`], indexed by picture index.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct FeatureScoreCell {
    written: bool,
    value: f64,
}

/// Dense, append-only array of per-frame scores for a single feature.
///
/// Indices are addressed directly: `cells[i]` is the score for picture index `i`. The
/// backing storage doubles in size whenever an append targets an index past the current
/// capacity, which keeps amortized append cost O(1) given that producers append roughly
/// in picture-index order.
#[derive(Debug)]
pub(crate) struct ScoreTable {
    name: String,
    cells: Vec<FeatureScoreCell>,
}

impl ScoreTable {
    pub(crate) fn new(name: impl Into<String>, initial_capacity: u32) -> Self {
        Self {
            name: name.into(),
            cells: Vec::with_capacity(initial_capacity.max(1) as usize),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    fn grow_to_contain(&mut self, index: u32) {
        let index = index as usize;
        if index < self.cells.len() {
            return;
        }
        let mut capacity = self.cells.capacity().max(1);
        while index >= capacity {
            capacity *= 2;
        }
        self.cells.resize(capacity, FeatureScoreCell::default());
    }

    /// Writes `value` at `index`. Fails with [`CollectorError::AlreadyWritten`] if the
    /// cell already holds a value; the existing value is left untouched in that case.
    pub(crate) fn append(&mut self, index: u32, value: f64) -> Result<()> {
        self.grow_to_contain(index);
        let cell = &mut self.cells[index as usize];
        if cell.written {
            tracing::warn!(
                feature = %self.name,
                picture_index = index,
                "feature cannot be overwritten at this index"
            );
            return Err(CollectorError::AlreadyWritten {
                feature: self.name.clone(),
                index,
            });
        }
        cell.written = true;
        cell.value = value;
        Ok(())
    }

    /// Reads the value written at `index`, if any.
    pub(crate) fn get(&self, index: u32) -> Result<f64> {
        self.cells
            .get(index as usize)
            .filter(|cell| cell.written)
            .map(|cell| cell.value)
            .ok_or_else(|| {
                CollectorError::NotFound(format!(
                    "feature \"{}\" has no score at index {index}",
                    self.name
                ))
            })
    }
}
