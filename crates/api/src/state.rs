use std::sync::Arc;

use tessera_events::EventBus;
use tessera_pipeline::Cascade;
use tessera_scanner::SupervisorCli;
use tessera_store::StateStore;
use tessera_worker::IconQueue;

use crate::config::ServerConfig;

/// Shared application state injected into every handler and background
/// task. Cheap to clone; everything heavyweight is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StateStore>,
    pub queue: Arc<IconQueue>,
    pub events: Arc<EventBus>,
    pub cascade: Arc<Cascade>,
    pub supervisor: Arc<SupervisorCli>,
    pub config: Arc<ServerConfig>,
    /// Client used for HTML probes and homepage fetches.
    pub probe_client: reqwest::Client,
}
