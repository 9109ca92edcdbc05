use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A numeric form field that may arrive as a JSON number or as a string.
/// Any other JSON value is kept as-is and fails coercion later, so the
/// caller reports it as an input format error rather than a body rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LooseNumber {
    /// Integer coercion: floats truncate toward zero, strings must parse as integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseNumber::Int(v) => Some(*v),
            LooseNumber::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            LooseNumber::Float(_) => None,
            LooseNumber::Text(s) => s.trim().parse::<i64>().ok(),
            LooseNumber::Other(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Int(v) => Some(*v as f64),
            LooseNumber::Float(v) => Some(*v),
            LooseNumber::Text(s) => s.trim().parse::<f64>().ok(),
            LooseNumber::Other(_) => None,
        }
    }

    /// True for an empty or whitespace-only string.
    pub fn is_blank(&self) -> bool {
        matches!(self, LooseNumber::Text(s) if s.trim().is_empty())
    }

    pub fn raw(&self) -> String {
        match self {
            LooseNumber::Int(v) => v.to_string(),
            LooseNumber::Float(v) => v.to_string(),
            LooseNumber::Text(s) => s.clone(),
            LooseNumber::Other(v) => v.to_string(),
        }
    }
}

impl From<i64> for LooseNumber {
    fn from(v: i64) -> Self {
        LooseNumber::Int(v)
    }
}

impl From<f64> for LooseNumber {
    fn from(v: f64) -> Self {
        LooseNumber::Float(v)
    }
}

impl From<&str> for LooseNumber {
    fn from(v: &str) -> Self {
        LooseNumber::Text(v.to_string())
    }
}

/// Raw student submission. Lives for a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentInput {
    pub name: String,
    pub department: String,
    pub year: LooseNumber,
    pub cgpa: LooseNumber,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub logic_thinking: Option<LooseNumber>,
    #[serde(default)]
    pub teamwork: Option<LooseNumber>,
    #[serde(default)]
    pub risk_taking: Option<LooseNumber>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRow {
    pub id: Uuid,
    pub name: String,
    pub department: String,
    pub year: String,
    pub cgpa: String,
    pub skills: String,
    pub interests: String,
    pub personality: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub career: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub career: String,
    pub helpful: bool,
    pub created_at: DateTime<Utc>,
}

/// Personality ratings flattened for the audit log, e.g. `logic=4,teamwork=3,risk=2`.
pub fn personality_summary(input: &StudentInput) -> String {
    let field = |v: &Option<LooseNumber>| v.as_ref().map(LooseNumber::raw).unwrap_or_default();
    format!(
        "logic={},teamwork={},risk={}",
        field(&input.logic_thinking),
        field(&input.teamwork),
        field(&input.risk_taking)
    )
}
