pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommendation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/recommend", post(handlers::handle_recommend))
        .route("/api/feedback", post(handlers::handle_feedback))
        .with_state(state)
}
