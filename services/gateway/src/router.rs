use crate::handlers::{profile, ws};
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/profile", get(profile::get_profile))
        .route("/matches", get(profile::get_matches));

    Router::new()
        .nest("/v1", api_routes)
        .route("/ws", get(ws::ws_handler))
        .route("/healthz", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": engine::SERVICE_VERSION,
        "connections": state.connections.connection_count(),
        "activeSessions": state.engine.active_session_count(),
    }))
}
