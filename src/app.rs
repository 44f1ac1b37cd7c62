use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/analysis", get(handlers::get_analysis))
        .route("/api/status", get(handlers::get_status))
        .route("/api/refresh", post(handlers::refresh))
        .with_state(state)
}
