use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::student::{personality_summary, StudentInput};
use crate::persistence::{PersistenceError, PersistenceSink};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        department  TEXT NOT NULL,
        year        TEXT NOT NULL,
        cgpa        TEXT NOT NULL,
        skills      TEXT NOT NULL,
        interests   TEXT NOT NULL,
        personality TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS predictions (
        id          UUID PRIMARY KEY,
        student_id  UUID NOT NULL,
        career      TEXT NOT NULL,
        confidence  DOUBLE PRECISION NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS feedback (
        id          UUID PRIMARY KEY,
        student_id  UUID NOT NULL,
        career      TEXT NOT NULL,
        helpful     BOOLEAN NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// PostgreSQL-backed sink. INSERT only; rows are never updated.
#[derive(Clone)]
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, PersistenceError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }

    /// Creates the audit tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Audit tables ready");
        Ok(())
    }
}

#[async_trait]
impl PersistenceSink for PgSink {
    async fn record_student(&self, input: &StudentInput) -> Result<Uuid, PersistenceError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO students
                (id, name, department, year, cgpa, skills, interests, personality)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.department)
        .bind(input.year.raw())
        .bind(input.cgpa.raw())
        .bind(&input.skills)
        .bind(&input.interests)
        .bind(personality_summary(input))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn record_prediction(
        &self,
        student_id: Uuid,
        career: &str,
        confidence: f64,
    ) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO predictions (id, student_id, career, confidence) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(career)
        .bind(confidence)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_feedback(
        &self,
        student_id: Uuid,
        career: &str,
        helpful: bool,
    ) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO feedback (id, student_id, career, helpful) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(career)
        .bind(helpful)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
