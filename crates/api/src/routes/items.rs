use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tessera_core::naming::sanitize_name;
use tessera_core::{IconStatus, ItemKind};
use tessera_store::ItemSnapshot;

use crate::state::AppState;

/// One dashboard tile.
#[derive(Serialize)]
pub struct ItemView {
    pub name: String,
    pub kind: ItemKind,
    pub port: Option<u16>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub icon_status: IconStatus,
    /// Whether the final icon file exists on disk. The dashboard shows
    /// the icon only once this is true; `icon_status` is informational.
    pub has_icon: bool,
    /// Static URL of the final icon, present iff `has_icon`.
    pub icon_url: Option<String>,
    pub is_dead: bool,
}

/// GET /api/items response payload.
#[derive(Serialize)]
pub struct ItemsResponse {
    pub items: Vec<ItemView>,
    pub last_scan: Option<DateTime<Utc>>,
    /// Monotonic counter; clients poll it to detect changes.
    pub change_version: u64,
    /// Lets the frontend detect a server restart and do a full reload.
    pub server_pid: u32,
}

/// GET /api/items -- everything the dashboard renders, in one response.
async fn list_items(State(state): State<AppState>) -> Json<ItemsResponse> {
    let snapshots = state.store.all_visible_items().await;
    let items = snapshots
        .into_iter()
        .map(|snapshot| item_view(&state, snapshot))
        .collect();

    Json(ItemsResponse {
        items,
        last_scan: state.store.last_scan().await,
        change_version: state.events.change_version(),
        server_pid: std::process::id(),
    })
}

fn item_view(state: &AppState, snapshot: ItemSnapshot) -> ItemView {
    let has_icon = state.cascade.has_icon(&snapshot.name);
    let icon_url = if has_icon {
        sanitize_name(&snapshot.name)
            .ok()
            .map(|key| format!("/icons/{key}.png"))
    } else {
        None
    };

    ItemView {
        name: snapshot.name,
        kind: snapshot.kind,
        port: snapshot.port,
        url: snapshot.url,
        description: snapshot.description,
        icon_status: snapshot.icon_status,
        has_icon,
        icon_url,
        is_dead: snapshot.is_dead,
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/items", get(list_items))
}
