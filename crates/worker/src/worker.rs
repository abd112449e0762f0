//! The background icon worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use tessera_pipeline::Cascade;

use crate::queue::{IconQueue, QueueReceiver};

/// One-shot start signal for the worker.
///
/// Requests can be enqueued from the moment the queue exists, but the
/// worker does not touch the generators until the gate opens. The server
/// opens it right after the listener is bound, so generation never
/// delays startup.
#[derive(Default)]
pub struct StartGate {
    opened: AtomicBool,
    notify: Notify,
}

impl StartGate {
    pub fn open(&self) {
        self.opened.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub async fn wait(&self) {
        loop {
            if self.opened.load(Ordering::Acquire) {
                return;
            }
            let notified = self.notify.notified();
            if self.opened.load(Ordering::Acquire) {
                return;
            }
            notified.await;
        }
    }
}

/// Single consumer of the icon queue.
///
/// Runs cascade invocations strictly one at a time, so concurrent
/// requests for different items are serialized and duplicate requests
/// for the same item collapse in the queue.
pub struct IconWorker {
    queue: Arc<IconQueue>,
    rx: QueueReceiver,
    cascade: Arc<Cascade>,
    gate: Arc<StartGate>,
}

impl IconWorker {
    pub fn new(
        queue: Arc<IconQueue>,
        rx: QueueReceiver,
        cascade: Arc<Cascade>,
        gate: Arc<StartGate>,
    ) -> Self {
        Self {
            queue,
            rx,
            cascade,
            gate,
        }
    }

    /// Drain the queue until cancelled or all senders are dropped.
    ///
    /// A failed cascade is logged and released; the item stays eligible
    /// for a later request, so one bad generator run never wedges the
    /// queue.
    pub async fn run(mut self, cancel: CancellationToken) {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = self.gate.wait() => {}
        }
        tracing::info!("icon worker started");

        loop {
            let name = tokio::select! {
                _ = cancel.cancelled() => break,
                next = self.rx.recv() => match next {
                    Some(name) => name,
                    None => break,
                },
            };

            tracing::debug!(item = %name, "processing icon request");
            match self.cascade.run(&name).await {
                Ok(outcome) if outcome.generated_any() => {
                    tracing::info!(
                        item = %name,
                        stages = outcome.ran.len(),
                        "icon chain updated"
                    );
                }
                Ok(_) => {
                    tracing::debug!(item = %name, "icon chain already fresh");
                }
                Err(err) => match err.stage() {
                    Some(stage) => {
                        tracing::warn!(item = %name, %stage, error = %err, "icon generation failed");
                    }
                    None => {
                        tracing::warn!(item = %name, error = %err, "icon generation failed");
                    }
                },
            }
            self.queue.finish(&name);
        }

        tracing::info!("icon worker stopped");
    }
}
