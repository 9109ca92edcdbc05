//! Axum route handlers for the recommendation and feedback API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::student::StudentInput;
use crate::recommendation::engine::Recommendation;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub success: bool,
    pub student: StudentSummary,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub student_id: Uuid,
    pub career: String,
    #[serde(deserialize_with = "bool_or_flag")]
    pub helpful: bool,
}

/// Accepts `true`/`false` or the integer flags `1`/`0`.
fn bool_or_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(1) => Ok(true),
        Flag::Int(0) => Ok(false),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "helpful must be a boolean or 0/1, got {other}"
        ))),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/recommend
///
/// Encodes the submission, ranks the top careers and records the student plus
/// the top prediction. A failed prediction insert is logged, not returned.
pub async fn handle_recommend(
    State(state): State<AppState>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> Result<Json<RecommendResponse>, AppError> {
    let Json(input) = payload?;

    let result = state.engine.recommend(&input)?;

    let student_id = state.sink.record_student(&input).await?;

    if let Err(e) = state
        .sink
        .record_prediction(student_id, &result.top_career, result.top_confidence)
        .await
    {
        warn!("Failed to record prediction for student {student_id}: {e}");
    }

    info!(
        "Recommended {} careers for student {student_id}",
        result.recommendations.len()
    );

    Ok(Json(RecommendResponse {
        success: true,
        student: StudentSummary {
            id: student_id,
            name: input.name,
        },
        recommendations: result.recommendations,
    }))
}

/// POST /api/feedback
///
/// Records whether a recommendation was helpful. Feedback is stored only;
/// it never feeds back into the model.
pub async fn handle_feedback(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let Json(request) = payload?;

    if request.career.trim().is_empty() {
        return Err(AppError::Validation("career cannot be empty".to_string()));
    }

    state
        .sink
        .record_feedback(request.student_id, &request.career, request.helpful)
        .await?;

    info!(
        "Feedback for student {}: {} helpful={}",
        request.student_id, request.career, request.helpful
    );

    Ok(Json(Ack { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feedback(helpful: serde_json::Value) -> Result<FeedbackRequest, serde_json::Error> {
        serde_json::from_value(json!({
            "student_id": Uuid::nil(),
            "career": "Startup / Entrepreneurship",
            "helpful": helpful
        }))
    }

    #[test]
    fn test_helpful_accepts_bool_and_integer_flags() {
        assert!(feedback(json!(true)).unwrap().helpful);
        assert!(!feedback(json!(false)).unwrap().helpful);
        assert!(feedback(json!(1)).unwrap().helpful);
        assert!(!feedback(json!(0)).unwrap().helpful);
    }

    #[test]
    fn test_helpful_rejects_other_values() {
        assert!(feedback(json!(2)).is_err());
        assert!(feedback(json!("yes")).is_err());
    }
}
