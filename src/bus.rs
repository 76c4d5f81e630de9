//! The event bus.
//!
//! Publishes [`Event`]s to zero or more listeners. Delivery runs either
//! synchronously on the dispatch thread or through an internal queue with
//! exactly one worker; the mode is fixed when the bus is built, and the
//! order of events published by one dispatch call is preserved end to end
//! in both modes.
//!
//! Listener panics are caught per listener, logged through `tracing`, and
//! never reach other listeners or the publishing handler.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::RwLock;
use tracing::error;

use crate::events::Event;

/// Receives events published by an engine.
pub trait Listener: Send + Sync {
    /// Handle one event. A panic here is isolated and logged.
    fn on_event(&self, event: &Event);
}

impl<F> Listener for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// How the bus hands events to listeners.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMode {
    /// Deliver on the publishing (dispatch) thread.
    #[default]
    Sync,
    /// Deliver from a single dedicated worker thread, preserving publish
    /// order. The queue drains on drop.
    Queued,
}

type ListenerList = Arc<RwLock<Vec<Arc<dyn Listener>>>>;

/// The publish/subscribe fan-out for one engine.
pub struct EventBus {
    listeners: ListenerList,
    queue: Option<QueuedWorker>,
}

struct QueuedWorker {
    tx: mpsc::Sender<Event>,
    handle: Option<JoinHandle<()>>,
}

impl EventBus {
    /// Build a bus with the given delivery mode.
    pub fn new(mode: DeliveryMode) -> Self {
        let listeners: ListenerList = Arc::new(RwLock::new(Vec::new()));
        let queue = match mode {
            DeliveryMode::Sync => None,
            DeliveryMode::Queued => {
                let (tx, rx) = mpsc::channel::<Event>();
                let worker_listeners = Arc::clone(&listeners);
                let handle = thread::Builder::new()
                    .name("ircflow-bus".into())
                    .spawn(move || {
                        while let Ok(event) = rx.recv() {
                            deliver(&worker_listeners, &event);
                        }
                    })
                    .expect("failed to spawn event bus worker");
                Some(QueuedWorker {
                    tx,
                    handle: Some(handle),
                })
            }
        };
        Self { listeners, queue }
    }

    /// The delivery mode this bus was built with.
    pub fn mode(&self) -> DeliveryMode {
        if self.queue.is_some() {
            DeliveryMode::Queued
        } else {
            DeliveryMode::Sync
        }
    }

    /// Register a listener. Listeners are invoked in registration order.
    pub fn add_listener(&self, listener: Arc<dyn Listener>) {
        self.listeners.write().push(listener);
    }

    /// Unregister every listener, e.g. on connection teardown. In-flight
    /// queued deliveries finish against the emptied list.
    pub fn clear_listeners(&self) {
        self.listeners.write().clear();
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Publish one event.
    pub fn publish(&self, event: Event) {
        match &self.queue {
            None => deliver(&self.listeners, &event),
            // The worker outlives every sender except through drop, so a
            // send failure only happens mid-teardown and is safe to drop.
            Some(worker) => {
                let _ = worker.tx.send(event);
            }
        }
    }
}

fn deliver(listeners: &ListenerList, event: &Event) {
    // Snapshot under the read lock so a listener may (un)register listeners
    // without deadlocking; changes apply from the next event.
    let snapshot: Vec<Arc<dyn Listener>> = listeners.read().clone();
    for listener in snapshot {
        let result = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
        if let Err(cause) = result {
            let detail = cause
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_owned());
            error!(target: "ircflow::bus", panic = %detail, "event listener panicked");
        }
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        if let Some(worker) = self.queue.take() {
            // Closing the channel lets the worker drain and exit.
            drop(worker.tx);
            if let Some(handle) = worker.handle {
                let _ = handle.join();
            }
        }
    }
}
