//! HTTP service for the tessera dashboard.
//!
//! JSON API over the state store and icon pipeline, plus static icon
//! serving and the background scan loop. `main.rs` wires the pieces and
//! applies the middleware stack.

pub mod background;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::services::ServeDir;

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Build the full application router: health at the root, the JSON API
/// under `/api`, and final icons served statically under `/icons`.
///
/// Middleware is layered on top by the caller.
pub fn app(state: AppState) -> Router {
    let icons = ServeDir::new(state.store.icons_dir());

    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        .nest_service("/icons", icons)
        .with_state(state)
}
