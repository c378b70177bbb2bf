//! The thread-safe sink at the center of the crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::aggregate_table::AggregateTable;
use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};
use crate::model::{ModelEntry, PredictionModel};
use crate::score_table::ScoreTable;
use crate::subscriber::{MetadataEvent, MetadataSubscriber, MetadataSubscriberConfig};

struct Inner {
    config: CollectorConfig,
    tables: Vec<ScoreTable>,
    aggregates: AggregateTable,
    models: Vec<Arc<ModelEntry>>,
    subscribers: Vec<MetadataSubscriber>,
}

impl Inner {
    fn table_mut(&mut self, name: &str) -> &mut ScoreTable {
        if let Some(pos) = self.tables.iter().position(|t| t.name() == name) {
            return &mut self.tables[pos];
        }
        self.tables
            .push(ScoreTable::new(name, self.config.initial_table_capacity));
        self.tables.last_mut().expect("just pushed")
    }

    fn table(&self, name: &str) -> Option<&ScoreTable> {
        self.tables.iter().find(|t| t.name() == name)
    }
}

/// A thread-safe sink for per-frame feature scores and per-sequence aggregates.
///
/// A single [`Mutex`] guards every table; callers on different threads can append
/// different features for the same frame, or the same feature for different frames,
/// concurrently — contention is resolved by the lock, not by partitioning. The lock is
/// never held while invoking a mounted model's [`PredictionModel::predict`] or a
/// subscriber's callback: both can legally call back into the collector (e.g. a model
/// reading its own inputs via [`Collector::get_score`]), and `std::sync::Mutex` is not
/// reentrant.
pub struct Collector {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Collector")
            .field("feature_count", &inner.tables.len())
            .field("model_count", &inner.models.len())
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    /// Creates a collector with default capacities.
    pub fn new() -> Self {
        Self::with_config(CollectorConfig::default())
    }

    /// Creates a collector with the given initial capacities.
    pub fn with_config(config: CollectorConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                config,
                tables: Vec::new(),
                aggregates: AggregateTable::with_capacity(config.initial_aggregate_capacity),
                models: Vec::new(),
                subscribers: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `value` for `feature_name` at `picture_index`.
    ///
    /// Fails with [`CollectorError::AlreadyWritten`] if that cell already holds a value.
    /// On success, if any models are mounted and at least one metadata subscriber is
    /// registered, the emission walk runs: every mounted model gets a chance to advance
    /// its prediction cursor, and newly-ready frames are delivered to subscribers in
    /// picture-index order.
    pub fn append(&self, feature_name: &str, picture_index: u32, value: f64) -> Result<()> {
        if feature_name.is_empty() {
            return Err(CollectorError::InvalidArg("feature_name must not be empty".to_string()));
        }
        {
            let mut inner = self.lock();
            inner.table_mut(feature_name).append(picture_index, value)?;
        }
        self.run_emission_walk(feature_name, picture_index);
        Ok(())
    }

    /// Resolves `feature_name` through `aliases` (falling back to `feature_name` itself
    /// when absent) and appends `value` once under the resolved name.
    pub fn append_with_alias(
        &self,
        aliases: &HashMap<&str, &str>,
        feature_name: &str,
        value: f64,
        picture_index: u32,
    ) -> Result<()> {
        let resolved = aliases.get(feature_name).copied().unwrap_or(feature_name);
        self.append(resolved, picture_index, value)
    }

    /// Reads the score written for `feature_name` at `picture_index`.
    pub fn get_score(&self, feature_name: &str, picture_index: u32) -> Result<f64> {
        let inner = self.lock();
        inner
            .table(feature_name)
            .ok_or_else(|| CollectorError::NotFound(format!("feature \"{feature_name}\"")))?
            .get(picture_index)
    }

    /// Sets a per-sequence aggregate scalar. Repeating the same `(name, value)` pair is a
    /// no-op; repeating `name` with a different value is a [`CollectorError::Conflict`].
    pub fn set_aggregate(&self, name: &str, value: f64) -> Result<()> {
        if name.is_empty() {
            return Err(CollectorError::InvalidArg("aggregate name must not be empty".to_string()));
        }
        self.lock().aggregates.append(name, value)
    }

    /// Reads a previously set aggregate scalar.
    pub fn get_aggregate(&self, name: &str) -> Result<f64> {
        self.lock().aggregates.get(name)
    }

    /// Every feature name with at least one table, in first-append order.
    pub fn feature_names(&self) -> Vec<String> {
        self.lock()
            .tables
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    /// Mounts a prediction model. The collector holds a strong [`Arc`] clone; mounting the
    /// same model twice mounts it twice, each instance running and emitting independently.
    pub fn mount_model(&self, model: Arc<dyn PredictionModel>) -> Result<()> {
        if model.features().is_empty() {
            return Err(CollectorError::InvalidArg(
                "model must declare at least one input feature".to_string(),
            ));
        }
        self.lock().models.push(Arc::new(ModelEntry::new(model)));
        Ok(())
    }

    /// Unmounts the first mounted entry wrapping `model`, identified by [`Arc::ptr_eq`].
    pub fn unmount_model(&self, model: &Arc<dyn PredictionModel>) -> Result<()> {
        let mut inner = self.lock();
        let pos = inner
            .models
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.model, model))
            .ok_or_else(|| CollectorError::NotFound("model not mounted".to_string()))?;
        inner.models.remove(pos);
        Ok(())
    }

    /// Registers a subscriber that is notified of every emitted metadata event from now on.
    pub fn register_metadata_subscriber(&self, config: MetadataSubscriberConfig) -> Result<()> {
        let subscriber = MetadataSubscriber::register(config)?;
        self.lock().subscribers.push(subscriber);
        Ok(())
    }

    /// Snapshots the models a just-written `(feature_name, picture_index)` cell is
    /// relevant to, then dispatches each to Case A or Case B.
    ///
    /// The walk only runs when a model is mounted and a subscriber exists to hear about
    /// it — with nothing subscribed, there is nothing for a prediction to be delivered to.
    /// Dispatch and the snapshot itself happen under the lock; Case A/B processing runs
    /// lock-free so mounted models and subscriber callbacks may safely call back into
    /// `self`.
    fn run_emission_walk(&self, feature_name: &str, picture_index: u32) {
        let candidates: Vec<Arc<ModelEntry>> = {
            let inner = self.lock();
            if inner.models.is_empty() || inner.subscribers.is_empty() {
                return;
            }
            inner
                .models
                .iter()
                .filter(|entry| {
                    entry.model.name() == feature_name
                        || entry.model.features().iter().any(|f| f == feature_name)
                })
                .cloned()
                .collect()
        };

        tracing::trace!(feature_name, picture_index, candidates = candidates.len(), "emission walk");

        for entry in candidates {
            if entry.model.name() == feature_name {
                self.case_b(&entry, picture_index);
            } else {
                self.case_a(&entry, picture_index);
            }
        }
    }

    /// Case A: `feature_name` is one of `M`'s inputs (or otherwise unrelated to `M`). If
    /// `M` hasn't already predicted `picture_index`, ask it to — a successful predictor
    /// appends its own result, which re-enters this pipeline as Case B on an independent
    /// lock acquisition. A failing predictor means "not ready yet" and is swallowed.
    fn case_a(&self, entry: &Arc<ModelEntry>, picture_index: u32) {
        if self.get_score(entry.model.name(), picture_index).is_ok() {
            return;
        }
        if let Err(err) = entry.model.predict(self, picture_index) {
            tracing::debug!(
                model = entry.model.name(),
                picture_index,
                %err,
                "model prediction not ready"
            );
        }
    }

    /// Case B: `feature_name` is `M`'s own name — a new prediction just landed. Walks the
    /// contiguous ready prefix starting at `M`'s cursor, emitting each frame exactly once
    /// and in order.
    fn case_b(&self, entry: &Arc<ModelEntry>, picture_index: u32) {
        entry.raise_highest_seen_index(picture_index);
        loop {
            let next = entry.last_lowest_seen_index();
            let score = match self.get_score(entry.model.name(), next) {
                Ok(score) => score,
                Err(_) => break,
            };
            self.emit_frame(entry, next, score);
            entry.advance_lowest_seen_index_to(next + 1);
        }
    }

    fn emit_frame(&self, entry: &Arc<ModelEntry>, picture_index: u32, score: f64) {
        let callbacks: Vec<_> = {
            let inner = self.lock();
            inner.subscribers.iter().map(|s| s.callback()).collect()
        };
        if callbacks.is_empty() {
            return;
        }

        let mut events = Vec::with_capacity(entry.model.features().len() + 1);
        for input in entry.model.features() {
            if let Ok(value) = self.get_score(input, picture_index) {
                events.push(MetadataEvent {
                    feature_name: input.clone(),
                    picture_index,
                    score: value,
                });
            }
        }
        events.push(MetadataEvent {
            feature_name: entry.model.name().to_string(),
            picture_index,
            score,
        });

        for event in &events {
            for callback in &callbacks {
                callback(event);
            }
        }
    }
}
