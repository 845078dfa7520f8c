mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use state::AppState;

#[tokio::main]
async fn main() {
    eprintln!("Initializing Triplog SDK...");
    let sdk = triplog_sdk::AsyncTriplogSdk::builder()
        .build()
        .await
        .expect("Failed to initialize Triplog SDK");

    // TRIPLOG_DEMO_SEED=1 inserts a synthetic trip so the API has data to
    // serve without a configured export source.
    if std::env::var("TRIPLOG_DEMO_SEED").is_ok() {
        let trip_id = sdk
            .run(|s| s.seed().seed_trip(1, 60))
            .await
            .expect("Failed to seed demo trip");
        eprintln!("Seeded demo trip {trip_id}");
    }
    eprintln!("SDK ready.");

    let state = Arc::new(AppState { sdk });

    let app = Router::new()
        .route("/api/meta", get(routes::meta::get_meta))
        .route("/api/languages", get(routes::languages::list_languages))
        .route("/api/trips", get(routes::trips::list_trips))
        .route("/api/trips/{id}", get(routes::trips::get_trip))
        .route("/api/trips/{id}/positions", get(routes::trips::get_positions))
        .route("/api/trips/{id}/stats", post(routes::trips::update_stats))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = "0.0.0.0:3000";
    eprintln!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
