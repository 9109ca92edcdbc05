//! Append-only audit log for students, predictions and feedback.
//!
//! `AppState` carries an `Arc<dyn PersistenceSink>`: `PgSink` in production,
//! `MemorySink` when no database is configured and in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::student::StudentInput;

pub use memory::MemorySink;
pub use postgres::PgSink;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Stores the raw submission and returns the id used in the response.
    async fn record_student(&self, input: &StudentInput) -> Result<Uuid, PersistenceError>;

    async fn record_prediction(
        &self,
        student_id: Uuid,
        career: &str,
        confidence: f64,
    ) -> Result<(), PersistenceError>;

    async fn record_feedback(
        &self,
        student_id: Uuid,
        career: &str,
        helpful: bool,
    ) -> Result<(), PersistenceError>;
}
