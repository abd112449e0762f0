use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::Deserialize;
use tessera_core::naming::sanitize_name;
use tessera_core::CoreError;
use tessera_events::DashboardEvent;
use tessera_store::WebsiteRecord;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/websites request body.
#[derive(Deserialize)]
pub struct AddWebsiteRequest {
    pub name: String,
    pub url: String,
}

/// POST /api/websites -- register a website tile and queue its icon.
///
/// The stored name is the sanitized form, so the item name and its
/// artifact filenames always agree.
async fn add_website(
    State(state): State<AppState>,
    Json(req): Json<AddWebsiteRequest>,
) -> AppResult<(StatusCode, Json<WebsiteRecord>)> {
    let name = sanitize_name(&req.name)?;

    let url = req.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::BadRequest(format!(
            "url must start with http:// or https://, got {url:?}"
        )));
    }

    let record = state.store.add_website(&name, url).await?;
    state
        .events
        .publish(DashboardEvent::new("website.added").with_item(&name));
    state.queue.enqueue(&name);

    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/websites/{name} -- unregister a website tile.
async fn remove_website(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    if !state.store.remove_website(&name).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "website",
            name,
        }));
    }

    state
        .events
        .publish(DashboardEvent::new("website.removed").with_item(&name));
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/websites", post(add_website))
        .route("/websites/{name}", delete(remove_website))
}
