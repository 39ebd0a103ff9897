//! Stroke table routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use tracing::{error, info, warn};

use crate::segment::{Segment, SegmentError};
use crate::state::AppState;
use crate::store::StoreError;

#[cfg(test)]
#[path = "strokes_test.rs"]
mod tests;

/// `GET /api/strokes` — every row, oldest first.
pub async fn list_strokes(State(state): State<AppState>) -> Result<Json<Vec<Segment>>, StatusCode> {
    let rows = state
        .store
        .query_all_ordered_by_creation()
        .await
        .map_err(store_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/strokes` — insert a batch. The whole batch is rejected if any
/// row is invalid.
pub async fn insert_strokes(
    State(state): State<AppState>,
    Json(rows): Json<Vec<Segment>>,
) -> Result<StatusCode, StatusCode> {
    if let Err(e) = validate_batch(&rows) {
        warn!(error = %e, count = rows.len(), "rejected stroke batch");
        return Err(StatusCode::BAD_REQUEST);
    }
    if rows.is_empty() {
        return Ok(StatusCode::CREATED);
    }

    state.store.insert_batch(&rows).await.map_err(store_error_to_status)?;
    info!(count = rows.len(), "inserted strokes");
    Ok(StatusCode::CREATED)
}

/// `DELETE /api/strokes` — clear the board.
pub async fn delete_strokes(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    state.store.delete_all().await.map_err(store_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_batch(rows: &[Segment]) -> Result<(), SegmentError> {
    rows.iter().try_for_each(Segment::validate)
}

pub(crate) fn store_error_to_status(err: StoreError) -> StatusCode {
    match err {
        StoreError::InvalidSegment(_) | StoreError::Decode(_) => StatusCode::BAD_REQUEST,
        StoreError::Status(_) | StoreError::Http(_) | StoreError::WebSocket(_) => {
            error!(error = %err, "upstream store failed");
            StatusCode::BAD_GATEWAY
        }
        StoreError::Database(_) | StoreError::InvalidUrl(_) | StoreError::Injected(_) => {
            error!(error = %err, "store operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
