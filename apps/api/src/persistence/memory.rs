use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::student::{
    personality_summary, FeedbackRow, PredictionRow, StudentInput, StudentRow,
};
use crate::persistence::{PersistenceError, PersistenceSink};

#[derive(Default)]
struct Log {
    students: Vec<StudentRow>,
    predictions: Vec<PredictionRow>,
    feedback: Vec<FeedbackRow>,
}

/// In-process append-only log. Used when `DATABASE_URL` is unset and in tests.
#[derive(Default)]
pub struct MemorySink {
    log: Mutex<Log>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn students(&self) -> Vec<StudentRow> {
        self.lock().map(|log| log.students.clone()).unwrap_or_default()
    }

    pub fn predictions(&self) -> Vec<PredictionRow> {
        self.lock()
            .map(|log| log.predictions.clone())
            .unwrap_or_default()
    }

    pub fn feedback(&self) -> Vec<FeedbackRow> {
        self.lock().map(|log| log.feedback.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Log>, PersistenceError> {
        self.log
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory log poisoned".to_string()))
    }
}

#[async_trait]
impl PersistenceSink for MemorySink {
    async fn record_student(&self, input: &StudentInput) -> Result<Uuid, PersistenceError> {
        let id = Uuid::new_v4();
        self.lock()?.students.push(StudentRow {
            id,
            name: input.name.clone(),
            department: input.department.clone(),
            year: input.year.raw(),
            cgpa: input.cgpa.raw(),
            skills: input.skills.clone(),
            interests: input.interests.clone(),
            personality: personality_summary(input),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn record_prediction(
        &self,
        student_id: Uuid,
        career: &str,
        confidence: f64,
    ) -> Result<(), PersistenceError> {
        self.lock()?.predictions.push(PredictionRow {
            id: Uuid::new_v4(),
            student_id,
            career: career.to_string(),
            confidence,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn record_feedback(
        &self,
        student_id: Uuid,
        career: &str,
        helpful: bool,
    ) -> Result<(), PersistenceError> {
        self.lock()?.feedback.push(FeedbackRow {
            id: Uuid::new_v4(),
            student_id,
            career: career.to_string(),
            helpful,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student::LooseNumber;

    fn input() -> StudentInput {
        StudentInput {
            name: "Kiran".to_string(),
            department: "Mechanical".to_string(),
            year: LooseNumber::Int(2),
            cgpa: LooseNumber::from("7.1"),
            skills: "AutoCAD".to_string(),
            interests: "machines".to_string(),
            logic_thinking: None,
            teamwork: Some(LooseNumber::Int(4)),
            risk_taking: None,
        }
    }

    #[tokio::test]
    async fn test_records_are_appended() {
        let sink = MemorySink::new();
        let id = sink.record_student(&input()).await.unwrap();
        sink.record_prediction(id, "Core Engineering", 0.71)
            .await
            .unwrap();
        sink.record_feedback(id, "Core Engineering", true)
            .await
            .unwrap();

        let students = sink.students();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, id);
        assert_eq!(students[0].cgpa, "7.1");
        assert_eq!(students[0].personality, "logic=,teamwork=4,risk=");

        let predictions = sink.predictions();
        assert_eq!(predictions[0].student_id, id);
        assert_eq!(predictions[0].confidence, 0.71);
        assert!(sink.feedback()[0].helpful);
    }

    #[tokio::test]
    async fn test_each_student_gets_a_distinct_id() {
        let sink = MemorySink::new();
        let a = sink.record_student(&input()).await.unwrap();
        let b = sink.record_student(&input()).await.unwrap();
        assert_ne!(a, b);
    }
}
