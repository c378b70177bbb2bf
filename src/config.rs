//! Construction-time tuning knobs for a [`crate::Collector`].

/// Initial backing-storage sizes for a newly constructed [`crate::Collector`].
///
/// These only affect how many reallocations happen before a [`crate::ScoreTable`] or the
/// aggregate table settle into their steady-state size; they have no effect on
/// correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Initial capacity of a feature's backing cell array, before any frame is appended.
    pub initial_table_capacity: u32,
    /// Initial capacity of the aggregate table's backing storage.
    pub initial_aggregate_capacity: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            initial_table_capacity: 8,
            initial_aggregate_capacity: 8,
        }
    }
}
