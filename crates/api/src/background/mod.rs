//! Background tasks spawned from `main`.

pub mod scanner;

pub use scanner::{run_periodic, scan_and_update, ScanSummary};
