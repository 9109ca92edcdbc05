use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "career-api"
    }))
}

/// GET /
/// Service banner listing capabilities and the careers the model can predict.
pub async fn index_handler(State(state): State<AppState>) -> Json<Value> {
    let careers: Vec<&str> = state
        .engine
        .careers()
        .iter()
        .map(|c| c.name.as_str())
        .collect();

    Json(json!({
        "status": "ok",
        "service": "career-api",
        "features": [
            "Personalized Matching (with Personality)",
            "Career Suitability Scores",
            "Semester Roadmaps",
            "Skill Gap Analysis",
            "Recommendation Feedback",
            "Multi-Path Options"
        ],
        "careers": careers
    }))
}
