//! Per-sequence aggregate scalars: one value per name, for the whole analyzed stream.

use crate::error::{CollectorError, Result};

#[derive(Debug, Clone)]
struct AggregateEntry {
    name: String,
    value: f64,
}

/// Ordered name -> value table for per-sequence aggregate scores.
///
/// Lookups and duplicate checks are linear scans: the expected number of aggregates per
/// run is a handful, so a hash map would only add overhead.
#[derive(Debug, Default)]
pub(crate) struct AggregateTable {
    entries: Vec<AggregateEntry>,
}

impl AggregateTable {
    pub(crate) fn with_capacity(capacity: u32) -> Self {
        Self {
            entries: Vec::with_capacity(capacity as usize),
        }
    }

    /// Appends `(name, value)`. A repeat of the same name with a bit-identical value is a
    /// successful no-op; a repeat with a different value is a [`CollectorError::Conflict`].
    pub(crate) fn append(&mut self, name: &str, value: f64) -> Result<()> {
        if let Some(existing) = self.entries.iter().find(|e| e.name == name) {
            return if existing.value.to_bits() == value.to_bits() {
                Ok(())
            } else {
                Err(CollectorError::Conflict {
                    name: name.to_string(),
                })
            };
        }
        self.entries.push(AggregateEntry {
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Result<f64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value)
            .ok_or_else(|| CollectorError::NotFound(format!("aggregate \"{name}\"")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut table = AggregateTable::with_capacity(8);
        table.append("vmaf_mean", 75.0).unwrap();
        assert_eq!(table.get("vmaf_mean").unwrap(), 75.0);
    }

    #[test]
    fn repeat_with_same_value_is_idempotent() {
        let mut table = AggregateTable::with_capacity(8);
        table.append("vmaf_mean", 75.0).unwrap();
        table.append("vmaf_mean", 75.0).unwrap();
        assert_eq!(table.get("vmaf_mean").unwrap(), 75.0);
    }

    #[test]
    fn repeat_with_different_value_conflicts() {
        let mut table = AggregateTable::with_capacity(8);
        table.append("vmaf_mean", 75.0).unwrap();
        let err = table.append("vmaf_mean", 80.0).unwrap_err();
        assert!(matches!(err, CollectorError::Conflict { .. }));
        // The original value survives the rejected write.
        assert_eq!(table.get("vmaf_mean").unwrap(), 75.0);
    }

    #[test]
    fn unknown_name_is_not_found() {
        let table = AggregateTable::with_capacity(8);
        assert!(matches!(table.get("nope"), Err(CollectorError::NotFound(_))));
    }

    #[test]
    fn nan_is_conflict_with_itself_by_bit_pattern() {
        // NaN payloads are compared by bit pattern, not by IEEE `==`, so two identical
        // NaN writes are idempotent even though `f64::NAN == f64::NAN` is false.
        let mut table = AggregateTable::with_capacity(8);
        table.append("x", f64::NAN).unwrap();
        table.append("x", f64::NAN).unwrap();
    }
}
