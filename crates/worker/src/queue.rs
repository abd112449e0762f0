//! Deduplicating FIFO queue of icon generation requests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

/// Sender half of the icon queue.
///
/// Names are delivered to the single worker in enqueue order. A name
/// that is already pending, or currently being processed, is not
/// enqueued again; it becomes eligible once the worker calls
/// [`IconQueue::finish`] for it.
pub struct IconQueue {
    tx: mpsc::UnboundedSender<String>,
    active: Mutex<HashSet<String>>,
}

/// Receiver half, owned by the worker.
pub struct QueueReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

/// Create a connected queue pair.
pub fn channel() -> (Arc<IconQueue>, QueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let queue = Arc::new(IconQueue {
        tx,
        active: Mutex::new(HashSet::new()),
    });
    (queue, QueueReceiver { rx })
}

impl IconQueue {
    /// Request icon generation for `name`.
    ///
    /// Returns whether the request was actually enqueued; `false` means
    /// an identical request is already pending or in flight.
    pub fn enqueue(&self, name: &str) -> bool {
        let mut active = self.active.lock().unwrap();
        if !active.insert(name.to_string()) {
            return false;
        }
        if self.tx.send(name.to_string()).is_err() {
            // Worker is gone; drop the reservation so a restart can
            // re-enqueue.
            active.remove(name);
            return false;
        }
        true
    }

    /// Release `name` after the worker finished (or failed) processing
    /// it, making it eligible for a new request.
    pub fn finish(&self, name: &str) {
        self.active.lock().unwrap().remove(name);
    }

    /// Number of requests currently pending or in flight.
    pub fn len(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueueReceiver {
    pub(crate) async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}
