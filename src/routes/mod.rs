//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The board host exposes the stroke table as one REST resource plus a
//! WebSocket change feed. The portfolio site that embeds the board can be
//! served from the same origin as static files at `/`.

pub mod strokes;
pub mod ws;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the host router. With `site_dir`, unmatched paths fall through to
/// the static site.
pub fn app(state: AppState, site_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route(
            "/api/strokes",
            get(strokes::list_strokes)
                .post(strokes::insert_strokes)
                .delete(strokes::delete_strokes),
        )
        .route("/api/strokes/live", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match site_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router,
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
