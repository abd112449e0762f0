pub mod health;
pub mod items;
pub mod scan;
pub mod websites;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /items               dashboard items + poll metadata (GET)
/// /scan                manual supervisor scan (POST)
/// /websites            register a website (POST)
/// /websites/{name}     unregister a website (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(items::router())
        .merge(scan::router())
        .merge(websites::router())
}
