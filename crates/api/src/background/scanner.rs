//! Periodic supervisor scan.
//!
//! Discovers supervisor-managed processes, probes their ports for an
//! HTML GUI, syncs the store, and queues icon generation for anything
//! stale. Runs on a fixed interval until cancelled; `POST /api/scan`
//! calls [`scan_and_update`] directly.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;
use tessera_events::DashboardEvent;
use tessera_store::ProcessPatch;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::state::AppState;

/// What one scan found and did.
#[derive(Debug, Serialize)]
pub struct ScanSummary {
    /// Processes the supervisor reported (with a port).
    pub processes: usize,
    /// Icon generation requests actually enqueued.
    pub enqueued: usize,
}

/// One full scan pass.
///
/// `trigger_icons` gates the enqueue side: the startup scan only syncs
/// the store, so a cold start with many stale icons does not flood the
/// generators before the first periodic pass.
pub async fn scan_and_update(
    state: &AppState,
    trigger_icons: bool,
) -> Result<ScanSummary, AppError> {
    let scanned = state.supervisor.scan().await?;
    let mut seen = HashSet::new();
    let mut enqueued = 0;

    for process in &scanned {
        if process.name == state.config.self_name {
            continue;
        }
        seen.insert(process.name.clone());

        let is_html = match process.port {
            Some(port) => tessera_scanner::probe_is_html(&state.probe_client, port).await,
            None => false,
        };

        state
            .store
            .upsert_process(
                &process.name,
                ProcessPatch {
                    port: process.port,
                    is_html: Some(is_html),
                    visible: Some(true),
                    workdir: process.workdir.clone(),
                    is_dead: Some(false),
                    ..Default::default()
                },
            )
            .await?;

        if trigger_icons && is_html && state.cascade.needs_generation(&process.name) {
            if state.queue.enqueue(&process.name) {
                enqueued += 1;
            }
        }
    }

    // Processes that vanished from the supervisor listing lose their
    // tile until a later scan finds them again.
    for record in state.store.visible_html_processes().await {
        if !seen.contains(&record.name) {
            state.store.mark_invisible(&record.name).await?;
        }
    }

    if trigger_icons {
        for site in state.store.list_websites().await {
            if site.visible && state.cascade.needs_generation(&site.name) {
                if state.queue.enqueue(&site.name) {
                    enqueued += 1;
                }
            }
        }
    }

    state.store.set_last_scan().await?;
    state.events.publish(DashboardEvent::new("scan.completed"));

    Ok(ScanSummary {
        processes: scanned.len(),
        enqueued,
    })
}

/// Run the scan loop until `cancel` is triggered.
///
/// The first tick fires immediately (the startup sync); later ticks
/// trigger icon generation as well.
pub async fn run_periodic(state: AppState, cancel: CancellationToken) {
    let interval_secs = state.config.scan_interval_secs;
    tracing::info!(interval_secs, "Scanner task started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    let mut first = true;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Scanner task stopping");
                break;
            }
            _ = interval.tick() => {
                let trigger_icons = !first;
                first = false;
                match scan_and_update(&state, trigger_icons).await {
                    Ok(summary) => {
                        tracing::info!(
                            processes = summary.processes,
                            enqueued = summary.enqueued,
                            trigger_icons,
                            "Scan completed"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Scan failed");
                    }
                }
            }
        }
    }
}
