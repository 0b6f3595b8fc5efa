//! Multicast Event Stream
//!
//! A hot, push-based subject: every item is delivered synchronously to all
//! currently registered observers in subscription order, and the stream
//! ends with exactly one terminal event (completion or error).
//!
//! # Design
//!
//! - No history is buffered. Observers see only events emitted after they
//!   subscribed, so producers subscribe every observer before starting.
//! - Delivery happens on the producer's thread of control. A single
//!   producer drives `emit`/`complete`/`fail` sequentially.
//! - A panicking observer is contained: the panic is logged and delivery
//!   continues to the remaining observers.
//! - Each [`Subscription`] detaches its observer independently. Disposal is
//!   idempotent and also happens on drop.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

// =============================================================================
// Observer
// =============================================================================

/// A sink reacting to stream events.
pub trait Observer<T, E>: Send + Sync {
    /// Called once per emitted item.
    fn on_item(&self, item: &T);

    /// Called at most once, when the stream fails.
    fn on_error(&self, error: &E);

    /// Called at most once, when the stream completes.
    fn on_complete(&self);
}

/// Shared observer handle.
pub type SharedObserver<T, E> = Arc<dyn Observer<T, E>>;

/// An owned stream event, for observers that forward events elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent<T, E> {
    /// An emitted item.
    Item(T),
    /// Terminal error.
    Error(E),
    /// Terminal completion.
    Completed,
}

impl<T, E> StreamEvent<T, E> {
    /// Whether this event ends the stream.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Completed)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Returned when an event is pushed into a stream that already terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stream already terminated")]
pub struct StreamClosed;

// =============================================================================
// Registry
// =============================================================================

type SubscriptionId = u64;

struct Registration<T, E> {
    id: SubscriptionId,
    observer: SharedObserver<T, E>,
}

struct Registry<T, E> {
    registrations: Mutex<Vec<Registration<T, E>>>,
    next_id: AtomicU64,
    terminated: AtomicBool,
}

impl<T, E> Registry<T, E> {
    fn snapshot(&self) -> Vec<SharedObserver<T, E>> {
        self.registrations
            .lock()
            .iter()
            .map(|r| Arc::clone(&r.observer))
            .collect()
    }
}

/// Type-erased detach hook so [`Subscription`] is not generic.
trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId);
}

impl<T: 'static, E: 'static> Detach for Registry<T, E> {
    fn detach(&self, id: SubscriptionId) {
        self.registrations.lock().retain(|r| r.id != id);
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Handle to one observer's attachment to a stream.
///
/// Dropping the handle disposes it.
pub struct Subscription {
    id: SubscriptionId,
    registry: Option<Weak<dyn Detach>>,
    disposed: AtomicBool,
}

impl Subscription {
    /// A subscription that is already disposed and attached to nothing.
    fn inert() -> Self {
        Self {
            id: 0,
            registry: None,
            disposed: AtomicBool::new(true),
        }
    }

    /// Detach the observer from its stream.
    ///
    /// Idempotent; disposing after the stream terminated has no effect.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.as_ref().and_then(Weak::upgrade) {
            registry.detach(self.id);
        }
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// =============================================================================
// Subject
// =============================================================================

/// Multicast subject with synchronous fan-out.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use venue_stream::domain::stream::{Observer, Subject};
///
/// struct Printer;
///
/// impl Observer<u32, String> for Printer {
///     fn on_item(&self, item: &u32) { println!("item {item}"); }
///     fn on_error(&self, error: &String) { println!("error {error}"); }
///     fn on_complete(&self) { println!("done"); }
/// }
///
/// let subject: Subject<u32, String> = Subject::new();
/// let _subscription = subject.subscribe(Arc::new(Printer));
///
/// subject.emit(&1).unwrap();
/// subject.complete().unwrap();
/// assert!(subject.emit(&2).is_err());
/// ```
pub struct Subject<T, E> {
    registry: Arc<Registry<T, E>>,
}

impl<T: 'static, E: 'static> Subject<T, E> {
    /// Create a subject with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                registrations: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                terminated: AtomicBool::new(false),
            }),
        }
    }

    /// Register an observer.
    ///
    /// Subscribing to a terminated stream registers nothing and returns an
    /// already-disposed handle.
    pub fn subscribe(&self, observer: SharedObserver<T, E>) -> Subscription {
        if self.is_terminated() {
            tracing::debug!("Subscribe after termination ignored");
            return Subscription::inert();
        }

        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .registrations
            .lock()
            .push(Registration { id, observer });

        let registry: Arc<dyn Detach> = self.registry.clone();
        Subscription {
            id,
            registry: Some(Arc::downgrade(&registry)),
            disposed: AtomicBool::new(false),
        }
    }

    /// Deliver an item to every registered observer.
    ///
    /// Returns the number of observers the item was delivered to.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClosed`] if the stream already terminated.
    pub fn emit(&self, item: &T) -> Result<usize, StreamClosed> {
        if self.is_terminated() {
            return Err(StreamClosed);
        }

        let observers = self.registry.snapshot();
        for observer in &observers {
            deliver("item", || observer.on_item(item));
        }
        Ok(observers.len())
    }

    /// Deliver completion and terminate the stream.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClosed`] if the stream already terminated.
    pub fn complete(&self) -> Result<usize, StreamClosed> {
        let observers = self.terminate()?;
        for observer in &observers {
            deliver("complete", || observer.on_complete());
        }
        Ok(observers.len())
    }

    /// Deliver an error and terminate the stream.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClosed`] if the stream already terminated.
    pub fn fail(&self, error: &E) -> Result<usize, StreamClosed> {
        let observers = self.terminate()?;
        for observer in &observers {
            deliver("error", || observer.on_error(error));
        }
        Ok(observers.len())
    }

    /// Whether a terminal event has been delivered.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.registry.terminated.load(Ordering::Acquire)
    }

    /// Number of currently registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.registry.registrations.lock().len()
    }

    /// Flip to terminated and take every registration.
    fn terminate(&self) -> Result<Vec<SharedObserver<T, E>>, StreamClosed> {
        if self
            .registry
            .terminated
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(StreamClosed);
        }

        let registrations = std::mem::take(&mut *self.registry.registrations.lock());
        Ok(registrations.into_iter().map(|r| r.observer).collect())
    }
}

impl<T: 'static, E: 'static> Default for Subject<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> std::fmt::Debug for Subject<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.registry.registrations.lock().len())
            .field(
                "terminated",
                &self.registry.terminated.load(Ordering::Acquire),
            )
            .finish()
    }
}

/// Run one observer callback, containing any panic it raises.
fn deliver(event: &'static str, callback: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        tracing::error!(event, "Observer panicked during delivery");
    }
}

// =============================================================================
// Tests
// =============================================================================
