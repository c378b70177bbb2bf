//! Registration of external listeners for ordered feature/prediction emission.

use std::fmt;
use std::sync::Arc;

use crate::error::{CollectorError, Result};

/// One emitted `(feature_name, picture_index, score)` triple, delivered in picture-index
/// order within a feature and interleaved across features per the mounted models' input
/// ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEvent {
    /// Name of the feature or mounted model this score belongs to.
    pub feature_name: String,
    /// Picture index the score was computed for.
    pub picture_index: u32,
    /// The score itself.
    pub score: f64,
}

/// Registration input for [`crate::Collector::register_metadata_subscriber`].
///
/// `feature_name_filter`, if set, must be non-empty; it is validated at registration but,
/// matching the emission semantics this crate follows, does not currently narrow which
/// events a subscriber receives — every subscriber sees every emitted event.
pub struct MetadataSubscriberConfig {
    /// Optional feature-name filter, validated but not applied.
    pub feature_name_filter: Option<String>,
    /// Called once per emitted event, in emission order.
    pub callback: Arc<dyn Fn(&MetadataEvent) + Send + Sync>,
}

impl fmt::Debug for MetadataSubscriberConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataSubscriberConfig")
            .field("feature_name_filter", &self.feature_name_filter)
            .field("callback", &"<fn>")
            .finish()
    }
}

pub(crate) struct MetadataSubscriber {
    #[allow(dead_code)]
    feature_name_filter: Option<String>,
    callback: Arc<dyn Fn(&MetadataEvent) + Send + Sync>,
}

impl fmt::Debug for MetadataSubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataSubscriber")
            .field("feature_name_filter", &self.feature_name_filter)
            .field("callback", &"<fn>")
            .finish()
    }
}

impl MetadataSubscriber {
    pub(crate) fn register(config: MetadataSubscriberConfig) -> Result<Self> {
        if let Some(filter) = &config.feature_name_filter {
            if filter.is_empty() {
                return Err(CollectorError::InvalidArg(
                    "feature_name_filter must not be empty".to_string(),
                ));
            }
        }
        Ok(Self {
            feature_name_filter: config.feature_name_filter,
            callback: config.callback,
        })
    }

    pub(crate) fn notify(&self, event: &MetadataEvent) {
        (self.callback)(event);
    }

    /// Clones the callback handle so it can be invoked without holding the collector's
    /// lock.
    pub(crate) fn callback(&self) -> Arc<dyn Fn(&MetadataEvent) + Send + Sync> {
        Arc::clone(&self.callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn empty_filter_is_rejected() {
        let err = MetadataSubscriber::register(MetadataSubscriberConfig {
            feature_name_filter: Some(String::new()),
            callback: Arc::new(|_| {}),
        })
        .unwrap_err();
        assert!(matches!(err, CollectorError::InvalidArg(_)));
    }

    #[test]
    fn notify_invokes_callback_regardless_of_filter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let subscriber = MetadataSubscriber::register(MetadataSubscriberConfig {
            feature_name_filter: Some("vif".to_string()),
            callback: Arc::new(move |event: &MetadataEvent| {
                seen_clone.lock().unwrap().push(event.clone());
            }),
        })
        .unwrap();

        let event = MetadataEvent {
            feature_name: "motion".to_string(),
            picture_index: 3,
            score: 1.5,
        };
        subscriber.notify(&event);

        assert_eq!(seen.lock().unwrap().as_slice(), &[event]);
    }
}
