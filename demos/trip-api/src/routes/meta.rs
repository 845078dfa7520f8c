use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/meta
///
/// Return the export metadata (stamp, table counts) from the platform.
pub async fn get_meta(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let meta = state.sdk.meta().await?;
    Ok(Json(json!({ "data": meta })))
}
