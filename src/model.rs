//! The external prediction-model contract and the collector's bookkeeping for it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::Collector;

/// A feature-fusion regressor mounted on a [`Collector`].
///
/// The collector never evaluates the model's math itself — it only knows a model's name
/// (the feature name its predictions are stored under), the ordered list of feature names
/// it consumes, and how to ask it to try to predict a frame.
pub trait PredictionModel: Send + Sync {
    /// The feature name this model's predictions are stored under.
    fn name(&self) -> &str;

    /// The input feature names this model reads, in the order metadata events should be
    /// emitted for a frame.
    fn features(&self) -> &[String];

    /// Attempts to produce a prediction for `picture_index`, typically by reading this
    /// model's input features back out of `collector`.
    ///
    /// Idempotent: on success the implementation appends its own result to `collector`
    /// under `self.name()` before returning it — the collector does not do this on the
    /// model's behalf. That append is what re-enters the collector's emission pipeline and
    /// lets it notice the new prediction. An `Err` return means "not ready yet" (e.g. an
    /// input feature's cell for this frame hasn't arrived) and is treated as a no-op, not a
    /// hard failure.
    fn predict(&self, collector: &Collector, picture_index: u32) -> Result<f64>;
}

/// Bookkeeping for one mounted model: the model itself plus its progressive-emission
/// cursors.
///
/// The cursors are atomics, not fields guarded by the collector's main lock, so that a
/// snapshot of the mounted-model list taken under the lock stays valid — and keeps
/// advancing the *same* cursor state — even after the lock is released for the duration
/// of a predictor call or a metadata callback. See the crate-level docs on re-entrancy.
pub(crate) struct ModelEntry {
    pub(crate) model: Arc<dyn PredictionModel>,
    last_lowest_seen_index: AtomicU32,
    last_highest_seen_index: AtomicU32,
}

impl ModelEntry {
    pub(crate) fn new(model: Arc<dyn PredictionModel>) -> Self {
        Self {
            model,
            last_lowest_seen_index: AtomicU32::new(0),
            last_highest_seen_index: AtomicU32::new(0),
        }
    }

    pub(crate) fn last_lowest_seen_index(&self) -> u32 {
        self.last_lowest_seen_index.load(Ordering::Acquire)
    }

    pub(crate) fn advance_lowest_seen_index_to(&self, next: u32) {
        self.last_lowest_seen_index.store(next, Ordering::Release);
    }

    /// Raises `last_highest_seen_index` to `at_least`, returning the new value.
    pub(crate) fn raise_highest_seen_index(&self, at_least: u32) -> u32 {
        self.last_highest_seen_index
            .fetch_max(at_least, Ordering::AcqRel)
            .max(at_least)
    }

    pub(crate) fn highest_seen_index(&self) -> u32 {
        self.last_highest_seen_index.load(Ordering::Acquire)
    }
}
