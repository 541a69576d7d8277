// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Observers and the registry they live in
//!
//! Delivery is fire-and-forget: no acknowledgment, no retry, and a failing
//! observer never affects the others or the relayed response. `publish`
//! runs on the request's task, so sinks that do I/O hand the message to a
//! bounded queue and drop it when the queue is full.

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::exchange::RelayMessage;
use crate::error::{Error, Result};

/// Consumer of published exchanges
///
/// # Example
///
/// ```rust
/// use haavi::network::{Observer, RelayMessage};
///
/// struct StatusPrinter;
///
/// impl Observer for StatusPrinter {
///     fn publish(&self, message: &RelayMessage) -> haavi::Result<()> {
///         let exchange = message.exchange();
///         println!("{} {} -> {}", exchange.method, exchange.url, exchange.status);
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send + Sync {
    /// Deliver one message
    ///
    /// Called inline before the response is returned; must not block.
    fn publish(&self, message: &RelayMessage) -> Result<()>;

    /// Short label used in logs
    fn name(&self) -> &str {
        "observer"
    }
}

/// Source of the observers currently attached to the relay
///
/// Owned and mutated outside the pipeline; the pipeline only reads it.
pub trait ObserverRegistry: Send + Sync {
    /// Snapshot of every registered observer, attached or not
    fn list_all(&self) -> Vec<Arc<dyn Observer>>;
}

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub failed: usize,
}

/// Default queue length for channel and writer sinks
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Deliver `message` to each observer independently
///
/// Errors are discarded one by one and never aggregated. A panicking
/// observer counts as a failed delivery.
pub fn fan_out(observers: &[Arc<dyn Observer>], message: &RelayMessage) -> FanOut {
    let mut outcome = FanOut::default();
    for observer in observers {
        match panic::catch_unwind(AssertUnwindSafe(|| observer.publish(message))) {
            Ok(Ok(())) => outcome.delivered += 1,
            Ok(Err(e)) => {
                tracing::trace!(observer = observer.name(), error = %e, "Delivery dropped");
                outcome.failed += 1;
            }
            Err(_) => {
                tracing::warn!(observer = observer.name(), "Observer panicked");
                outcome.failed += 1;
            }
        }
    }
    outcome
}

fn queue_error<T>(e: TrySendError<T>) -> Error {
    match e {
        TrySendError::Full(_) => Error::observer("queue full, message dropped"),
        TrySendError::Closed(_) => Error::observer("receiver dropped"),
    }
}

/// Registration handle returned by [`ObserverHub::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// In-memory observer registry
///
/// An observer is visible to the next fan-out as soon as `register`
/// returns, before it has consumed anything.
#[derive(Default)]
pub struct ObserverHub {
    observers: RwLock<Vec<(ObserverId, Arc<dyn Observer>)>>,
    next_id: AtomicU64,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn register<O: Observer + 'static>(&self, observer: O) -> ObserverId {
        self.register_arc(Arc::new(observer))
    }

    /// Register an already shared observer
    pub fn register_arc(&self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, observer));
        id
    }

    /// Remove an observer, returns false if it was not registered
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }
}

impl ObserverRegistry for ObserverHub {
    fn list_all(&self) -> Vec<Arc<dyn Observer>> {
        self.observers
            .read()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect()
    }
}

/// Forwards messages into a bounded tokio channel
///
/// A receiver that falls behind misses messages once the channel is full.
pub struct ChannelObserver {
    sender: mpsc::Sender<RelayMessage>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel
    pub fn new() -> (Self, mpsc::Receiver<RelayMessage>) {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Same as [`ChannelObserver::new`] with a custom channel length
    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<RelayMessage>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl Observer for ChannelObserver {
    fn publish(&self, message: &RelayMessage) -> Result<()> {
        self.sender.try_send(message.clone()).map_err(queue_error)
    }

    fn name(&self) -> &str {
        "channel"
    }
}

/// Observer callback type
pub type ObserverCallback = Arc<dyn Fn(&RelayMessage) -> Result<()> + Send + Sync>;

/// Wraps a closure
pub struct CallbackObserver {
    callback: ObserverCallback,
}

impl CallbackObserver {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&RelayMessage) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl Observer for CallbackObserver {
    fn publish(&self, message: &RelayMessage) -> Result<()> {
        (self.callback)(message)
    }

    fn name(&self) -> &str {
        "callback"
    }
}

/// Emits each exchange as a tracing event
#[derive(Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn publish(&self, message: &RelayMessage) -> Result<()> {
        let exchange = message.exchange();
        tracing::info!(
            method = %exchange.method,
            url = %exchange.url,
            status = exchange.status,
            content_type = %exchange.content_type,
            "Intercepted"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Writes one JSON document per line
///
/// Lines are serialized on the publishing task and written by a dedicated
/// thread, so a slow or blocked writer only costs dropped lines.
pub struct JsonLinesObserver<W> {
    sender: mpsc::Sender<Vec<u8>>,
    worker: JoinHandle<W>,
}

impl<W: Write + Send + 'static> JsonLinesObserver<W> {
    pub fn new(writer: W) -> Result<Self> {
        Self::with_capacity(writer, DEFAULT_QUEUE_CAPACITY)
    }

    /// Create an observer queueing at most `capacity` unwritten lines
    pub fn with_capacity(mut writer: W, capacity: usize) -> Result<Self> {
        let (sender, mut receiver) = mpsc::channel::<Vec<u8>>(capacity.max(1));

        let worker = thread::Builder::new()
            .name("haavi-json-lines".to_string())
            .spawn(move || {
                while let Some(line) = receiver.blocking_recv() {
                    if let Err(e) = writer.write_all(&line).and_then(|_| writer.flush()) {
                        tracing::warn!(error = %e, "Failed to write exchange");
                    }
                }
                writer
            })?;

        Ok(Self { sender, worker })
    }

    /// Stop accepting messages, write out the queue and return the writer
    pub fn finish(self) -> Result<W> {
        drop(self.sender);
        self.worker
            .join()
            .map_err(|_| Error::observer("json-lines writer thread panicked"))
    }
}

impl JsonLinesObserver<std::io::Stdout> {
    pub fn stdout() -> Result<Self> {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + 'static> Observer for JsonLinesObserver<W> {
    fn publish(&self, message: &RelayMessage) -> Result<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        self.sender.try_send(line).map_err(queue_error)
    }

    fn name(&self) -> &str {
        "json-lines"
    }
}
