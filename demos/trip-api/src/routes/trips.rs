use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use triplog_sdk::queries::trips::SearchTripsParams;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListTripsParams {
    pub name: Option<String>,
    pub device_id: Option<i64>,
    pub shared: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// GET /api/trips?device_id=1&shared=true
///
/// List trips, newest first, optionally filtered by name, device, and
/// shared flag.
pub async fn list_trips(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTripsParams>,
) -> Result<Json<Value>, AppError> {
    let trips = state
        .sdk
        .run(move |s| {
            s.trips().search(&SearchTripsParams {
                name: params.name,
                device_id: params.device_id,
                shared: params.shared,
                limit: params.limit,
                offset: params.offset,
                ..Default::default()
            })
        })
        .await?;

    let count = trips.len();
    Ok(Json(json!({ "data": trips, "count": count })))
}

/// GET /api/trips/:id
///
/// Get a single trip by id, including its stored stats summary.
pub async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let trip = state
        .sdk
        .run(move |s| s.trips().get_by_id(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("No trip with id {id}")))?;

    Ok(Json(json!({ "data": trip })))
}

/// GET /api/trips/:id/positions
///
/// Get the full position trail of a trip, ordered ascending by timestamp.
pub async fn get_positions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let positions = state.sdk.run(move |s| s.positions().by_trip(id)).await?;

    let count = positions.len();
    Ok(Json(json!({ "data": positions, "count": count })))
}

/// POST /api/trips/:id/stats
///
/// Recompute the trip's movement/speed stats from its trail and persist
/// them, returning the updated trip.
pub async fn update_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let trip = state.sdk.update_stats(id).await?;

    Ok(Json(json!({ "data": trip })))
}
