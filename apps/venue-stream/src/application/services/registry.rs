//! Pipeline Registry
//!
//! Process-wide bookkeeping of in-flight pipelines. Holds the subscriptions
//! each orchestrator created so they can be released when the run ends or
//! when the server shuts down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use uuid::Uuid;

use super::pipeline::PipelineOutcome;
use crate::domain::stream::Subscription;
use crate::infrastructure::metrics;

/// Snapshot of pipeline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Pipelines currently running.
    pub active: usize,
    /// Pipelines started since process start.
    pub started: u64,
    /// Pipelines that completed.
    pub completed: u64,
    /// Pipelines that failed.
    pub failed: u64,
}

/// Tracks in-flight pipelines and owns their subscriptions.
#[derive(Debug, Default)]
pub struct PipelineRegistry {
    inner: Mutex<Inner>,
    started: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Guarded together so no subscription can be inserted after the release.
#[derive(Debug, Default)]
struct Inner {
    active: HashMap<Uuid, Vec<Subscription>>,
    released: bool,
}

impl PipelineRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a started pipeline and take ownership of its subscriptions.
    ///
    /// After [`release_all`](Self::release_all) the subscriptions are
    /// disposed immediately; the pipeline still runs but delivers nothing.
    pub fn register(&self, id: Uuid, subscriptions: Vec<Subscription>) {
        self.started.fetch_add(1, Ordering::Relaxed);

        let mut inner = self.inner.lock();
        if inner.released {
            drop(inner);
            tracing::debug!(request_id = %id, "Registry released, disposing subscriptions");
            dispose_all(&subscriptions);
            return;
        }

        inner.active.insert(id, subscriptions);
        let active = inner.active.len();
        drop(inner);
        metrics::set_active_pipelines(active);
    }

    /// Record a terminated pipeline and release its subscriptions.
    pub fn finish(&self, id: Uuid, outcome: PipelineOutcome) {
        match outcome {
            PipelineOutcome::Completed { .. } => self.completed.fetch_add(1, Ordering::Relaxed),
            PipelineOutcome::Failed => self.failed.fetch_add(1, Ordering::Relaxed),
        };
        metrics::record_pipeline_finished(outcome.as_str());

        let (subscriptions, active) = {
            let mut inner = self.inner.lock();
            (inner.active.remove(&id), inner.active.len())
        };
        if let Some(subscriptions) = subscriptions {
            dispose_all(&subscriptions);
        }
        metrics::set_active_pipelines(active);
    }

    /// Dispose every outstanding subscription. Used at shutdown.
    ///
    /// Returns the number of subscriptions disposed.
    pub fn release_all(&self) -> usize {
        let drained: Vec<Vec<Subscription>> = {
            let mut inner = self.inner.lock();
            inner.released = true;
            inner.active.drain().map(|(_, s)| s).collect()
        };
        let count = drained.iter().map(Vec::len).sum();
        for subscriptions in &drained {
            dispose_all(subscriptions);
        }

        tracing::info!(subscriptions = count, "Released pipeline subscriptions");
        metrics::set_active_pipelines(0);
        count
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            active: self.inner.lock().active.len(),
            started: self.started.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Whether [`release_all`](Self::release_all) has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.inner.lock().released
    }
}

fn dispose_all(subscriptions: &[Subscription]) {
    for subscription in subscriptions {
        subscription.dispose();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;
    use crate::application::ports::{BusinessStream, SearchError};
    use crate::domain::business::Business;
    use crate::domain::stream::Observer;

    struct Counter(AtomicU64);

    impl Observer<Business, SearchError> for Counter {
        fn on_item(&self, _item: &Business) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
        fn on_error(&self, _error: &SearchError) {}
        fn on_complete(&self) {}
    }

    fn business() -> Business {
        Business::new("A", Some("$"), 4.9, 400)
    }

    #[test]
    fn finish_updates_counters_and_releases() {
        let registry = PipelineRegistry::new();
        let stream = BusinessStream::new();
        let counter = Arc::new(Counter(AtomicU64::new(0)));
        let id = Uuid::new_v4();

        registry.register(id, vec![stream.subscribe(counter.clone())]);
        assert_eq!(registry.stats().active, 1);

        registry.finish(id, PipelineOutcome::Completed { emitted: 0 });

        assert_eq!(
            registry.stats(),
            PipelineStats {
                active: 0,
                started: 1,
                completed: 1,
                failed: 0,
            }
        );
        assert_eq!(stream.observer_count(), 0);
    }

    #[test]
    fn failures_are_counted() {
        let registry = PipelineRegistry::new();
        let id = Uuid::new_v4();

        registry.register(id, Vec::new());
        registry.finish(id, PipelineOutcome::Failed);

        assert_eq!(registry.stats().failed, 1);
        assert_eq!(registry.stats().completed, 0);
    }

    #[test]
    fn release_all_stops_delivery_for_running_pipelines() {
        let registry = PipelineRegistry::new();
        let stream = BusinessStream::new();
        let counter = Arc::new(Counter(AtomicU64::new(0)));

        registry.register(
            Uuid::new_v4(),
            vec![
                stream.subscribe(counter.clone()),
                stream.subscribe(counter.clone()),
            ],
        );
        stream.emit(&business()).unwrap();
        assert_eq!(counter.0.load(Ordering::Relaxed), 2);

        assert_eq!(registry.release_all(), 2);
        stream.emit(&business()).unwrap();

        assert_eq!(counter.0.load(Ordering::Relaxed), 2);
        assert_eq!(registry.stats().active, 0);
    }

    #[test]
    fn register_after_release_disposes_immediately() {
        let registry = PipelineRegistry::new();
        registry.release_all();

        let stream = BusinessStream::new();
        let counter = Arc::new(Counter(AtomicU64::new(0)));
        registry.register(Uuid::new_v4(), vec![stream.subscribe(counter.clone())]);

        assert_eq!(stream.observer_count(), 0);
        assert_eq!(registry.stats().active, 0);
        assert!(registry.is_released());
    }

    #[test]
    fn register_racing_release_leaves_nothing_subscribed() {
        const REGISTRARS: usize = 8;
        const PER_THREAD: usize = 200;

        for _ in 0..20 {
            let registry = Arc::new(PipelineRegistry::new());
            let barrier = Arc::new(Barrier::new(REGISTRARS + 1));

            let registrars: Vec<_> = (0..REGISTRARS)
                .map(|_| {
                    let registry = Arc::clone(&registry);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        let counter = Arc::new(Counter(AtomicU64::new(0)));
                        let streams: Vec<BusinessStream> =
                            (0..PER_THREAD).map(|_| BusinessStream::new()).collect();
                        barrier.wait();
                        for stream in &streams {
                            let subscription = stream.subscribe(counter.clone());
                            registry.register(Uuid::new_v4(), vec![subscription]);
                        }
                        streams
                    })
                })
                .collect();

            let releaser = {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.release_all();
                })
            };

            releaser.join().unwrap();
            let streams: Vec<BusinessStream> = registrars
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect();

            assert_eq!(streams.len(), REGISTRARS * PER_THREAD);
            assert!(streams.iter().all(|stream| stream.observer_count() == 0));
            assert_eq!(registry.stats().active, 0);
        }
    }

    #[test]
    fn finish_unknown_id_is_harmless() {
        let registry = PipelineRegistry::new();
        registry.finish(Uuid::new_v4(), PipelineOutcome::Failed);
        assert_eq!(registry.stats().active, 0);
    }
}
