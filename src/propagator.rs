//! Random-access and queued propagation of a frame's fully-assembled metadata.

use std::sync::{Arc, Mutex, PoisonError};

use crate::collector::Collector;
use crate::error::{CollectorError, Result};
use crate::frame_queue::FrameQueue;

/// Walks a [`Collector`]'s known feature names for one picture index and hands every
/// value to a caller-supplied sink, only once every feature has a score for that frame.
///
/// Lookups are buffered before the sink sees any of them: if any feature is missing a
/// score at the requested index, [`CollectorError::NotReady`] is returned and the sink is
/// never called, so a partially-assembled frame never reaches downstream consumers.
pub struct MetadataPropagator {
    collector: Arc<Collector>,
    pending: Mutex<FrameQueue>,
}

impl std::fmt::Debug for MetadataPropagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataPropagator")
            .field("collector", &self.collector)
            .finish()
    }
}

impl MetadataPropagator {
    /// Creates a propagator over `collector`, allocating its frame queue once up front.
    pub fn new(collector: Arc<Collector>) -> Self {
        Self {
            collector,
            pending: Mutex::new(FrameQueue::new()),
        }
    }

    /// Attempts to propagate every known feature's score at `picture_index` to `sink`.
    pub fn propagate(&self, picture_index: u32, mut sink: impl FnMut(&str, f64)) -> Result<()> {
        let feature_names = self.collector.feature_names();
        let mut values = Vec::with_capacity(feature_names.len());
        for name in &feature_names {
            let value = self
                .collector
                .get_score(name, picture_index)
                .map_err(|_| CollectorError::NotReady(picture_index))?;
            values.push((name.as_str(), value));
        }
        for (name, value) in values {
            sink(name, value);
        }
        Ok(())
    }

    /// Enqueues `picture_index` for later propagation via [`Self::drain_ready`].
    pub fn enqueue(&self, picture_index: u32) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(picture_index);
    }

    /// Propagates as many consecutively queued frames as are currently ready, in FIFO
    /// order, stopping at the first frame that isn't ready yet (which stays at the head of
    /// the queue for the next call). Returns the number of frames propagated.
    pub fn drain_ready(&self, mut sink: impl FnMut(u32, &str, f64)) -> Result<u32> {
        let mut propagated = 0;
        loop {
            let head = {
                let queue = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                queue.peek_head()
            };
            if head < 0 {
                break;
            }
            let picture_index = head as u32;
            let mut frame_events = Vec::new();
            match self.propagate(picture_index, |name, value| {
                frame_events.push((name.to_string(), value));
            }) {
                Ok(()) => {
                    let mut queue = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                    queue.pop();
                    drop(queue);
                    for (name, value) in frame_events {
                        sink(picture_index, &name, value);
                    }
                    propagated += 1;
                }
                Err(CollectorError::NotReady(_)) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(propagated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn propagate_fails_until_every_feature_has_the_frame() {
        let collector = Arc::new(Collector::new());
        collector.append("vif", 0, 0.4).unwrap();
        let propagator = MetadataPropagator::new(Arc::clone(&collector));

        assert!(matches!(
            propagator.propagate(0, |_, _| {}),
            Err(CollectorError::NotReady(0))
        ));

        collector.append("motion", 0, 0.6).unwrap();
        let mut seen = Vec::new();
        propagator
            .propagate(0, |name, value| seen.push((name.to_string(), value)))
            .unwrap();
        assert_eq!(seen, vec![("vif".to_string(), 0.4), ("motion".to_string(), 0.6)]);
    }

    #[test]
    fn propagate_never_calls_sink_partially() {
        let collector = Arc::new(Collector::new());
        collector.append("vif", 0, 0.4).unwrap();
        collector.append("motion", 1, 0.6).unwrap(); // present at a different index
        let propagator = MetadataPropagator::new(Arc::clone(&collector));

        let mut calls = 0;
        let result = propagator.propagate(0, |_, _| calls += 1);
        assert!(matches!(result, Err(CollectorError::NotReady(0))));
        assert_eq!(calls, 0);
    }

    #[test]
    fn drain_ready_stops_at_first_unready_frame_and_preserves_order() {
        let collector = Arc::new(Collector::new());
        let propagator = MetadataPropagator::new(Arc::clone(&collector));

        collector.append("vif", 0, 0.1).unwrap();
        collector.append("vif", 2, 0.3).unwrap();
        propagator.enqueue(0);
        propagator.enqueue(1);
        propagator.enqueue(2);

        let mut seen = Vec::new();
        let propagated = propagator
            .drain_ready(|idx, name, value| seen.push((idx, name.to_string(), value)))
            .unwrap();

        assert_eq!(propagated, 1);
        assert_eq!(seen, vec![(0, "vif".to_string(), 0.1)]);

        collector.append("vif", 1, 0.2).unwrap();
        let propagated = propagator
            .drain_ready(|idx, name, value| seen.push((idx, name.to_string(), value)))
            .unwrap();
        assert_eq!(propagated, 2);
    }
}
