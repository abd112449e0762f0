//! Background icon generation: a deduplicating FIFO queue with a single
//! consumer that drives the cascade engine.

pub mod queue;
pub mod worker;

pub use queue::{channel, IconQueue, QueueReceiver};
pub use worker::{IconWorker, StartGate};
