//! Stream Observers
//!
//! Sinks attached to each request's business stream.
//!
//! - `ConsoleObserver`: writes one line per event, prefixed by its label
//! - `ChannelObserver`: forwards owned events into a tokio channel, for
//!   async consumers

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::application::ports::{BusinessObserver, ObserverFactory, SearchError};
use crate::domain::business::Business;
use crate::domain::stream::{Observer, StreamEvent};
use crate::infrastructure::config::ObserverSettings;

/// Owned event of a business stream.
pub type BusinessEvent = StreamEvent<Business, SearchError>;

// =============================================================================
// Console Observer
// =============================================================================

/// Labelled line-per-event sink.
pub struct ConsoleObserver {
    label: String,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleObserver {
    /// Console observer writing to stdout.
    #[must_use]
    pub fn stdout(label: impl Into<String>) -> Self {
        Self::with_writer(label, std::io::stdout())
    }

    /// Console observer writing to any sink.
    #[must_use]
    pub fn with_writer(label: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self {
            label: label.into(),
            out: Mutex::new(Box::new(writer)),
        }
    }

    /// Label prefixed to every line.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    fn write_line(&self, line: std::fmt::Arguments<'_>) {
        let mut out = self.out.lock();
        let written = writeln!(out, "{}: {line}", self.label).and_then(|()| out.flush());
        if let Err(e) = written {
            tracing::warn!(observer = %self.label, error = %e, "Observer write failed");
        }
    }
}

impl Observer<Business, SearchError> for ConsoleObserver {
    fn on_item(&self, item: &Business) {
        let Some(price) = item.price() else {
            return;
        };
        self.write_line(format_args!(
            "{} price: {price}, rating: {}, reviews: {}",
            item.name, item.rating, item.review_count
        ));
    }

    fn on_error(&self, error: &SearchError) {
        self.write_line(format_args!("Error: {error}"));
    }

    fn on_complete(&self) {
        self.write_line(format_args!("All businesses delivered successfully!"));
    }
}

impl std::fmt::Debug for ConsoleObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleObserver")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Builds one stdout console observer per configured label.
#[derive(Debug, Clone)]
pub struct ConsoleObserverFactory {
    labels: Vec<String>,
}

impl ConsoleObserverFactory {
    /// Create a factory for the given labels.
    #[must_use]
    pub const fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Configured labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl From<ObserverSettings> for ConsoleObserverFactory {
    fn from(settings: ObserverSettings) -> Self {
        Self::new(settings.labels)
    }
}

impl ObserverFactory for ConsoleObserverFactory {
    fn observers(&self) -> Vec<BusinessObserver> {
        self.labels
            .iter()
            .map(|label| Arc::new(ConsoleObserver::stdout(label.clone())) as BusinessObserver)
            .collect()
    }
}

// =============================================================================
// Channel Observer
// =============================================================================

/// Forwards every event into an unbounded channel.
///
/// Events are dropped silently once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<BusinessEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiver its events arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BusinessEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: BusinessEvent) {
        let _ = self.tx.send(event);
    }
}

impl Observer<Business, SearchError> for ChannelObserver {
    fn on_item(&self, item: &Business) {
        self.forward(StreamEvent::Item(item.clone()));
    }

    fn on_error(&self, error: &SearchError) {
        self.forward(StreamEvent::Error(error.clone()));
    }

    fn on_complete(&self) {
        self.forward(StreamEvent::Completed);
    }
}

// =============================================================================
// Tests
// =============================================================================
