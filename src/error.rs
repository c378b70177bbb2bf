//! Error types shared by every fallible collector operation.

use thiserror::Error;

/// A specialized `Result` type for feature-collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Errors returned by the feature collector.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CollectorError {
    /// A null/empty name or an otherwise malformed argument was supplied.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A cell at `(feature, index)` was already written; the existing value is kept.
    #[error("feature \"{feature}\" cannot be overwritten at index {index}")]
    AlreadyWritten {
        /// Name of the feature whose cell was already written.
        feature: String,
        /// Picture index of the conflicting write.
        index: u32,
    },

    /// An aggregate name was set twice with two different values.
    #[error("aggregate \"{name}\" already set to a different value")]
    Conflict {
        /// Name of the aggregate in conflict.
        name: String,
    },

    /// A lookup found no matching feature, cell, or model.
    #[error("not found: {0}")]
    NotFound(String),

    /// Metadata propagation was attempted before every feature had a score for the frame.
    #[error("frame {0} is not ready for metadata propagation")]
    NotReady(u32),
}
