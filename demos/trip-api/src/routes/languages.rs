use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/languages
///
/// List the platform languages.
pub async fn list_languages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let languages = state.sdk.run(|s| s.languages().all()).await?;

    let count = languages.len();
    Ok(Json(json!({ "data": languages, "count": count })))
}
