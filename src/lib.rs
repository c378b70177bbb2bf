//! # vmaf-feature-collector
//!
//! A thread-safe sink for per-frame feature scores and per-sequence aggregate scalars,
//! with support for mounting prediction models that fuse raw features into derived scores
//! and for propagating a frame's fully-assembled metadata once it's complete.
//!
//! The central type is [`Collector`]: producers on any number of threads append feature
//! values keyed by `(feature_name, picture_index)`; mounted [`PredictionModel`]s are driven
//! forward as their inputs become available; anything registered via
//! [`Collector::register_metadata_subscriber`] is notified, in order, as scores are
//! produced. [`MetadataPropagator`] gives random (or queued, FIFO) access to a frame's
//! complete metadata once every known feature has reported a score for it.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(test, deny(warnings))]

mod aggregate_table;
mod collector;
mod config;
mod error;
mod frame_queue;
mod model;
mod propagator;
mod score_table;
mod subscriber;

pub use collector::Collector;
pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use model::PredictionModel;
pub use propagator::MetadataPropagator;
pub use subscriber::{MetadataEvent, MetadataSubscriberConfig};
