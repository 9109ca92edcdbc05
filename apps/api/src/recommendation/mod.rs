// Career recommendation core: feature encoding → classification → ranked,
// explained recommendations. Pure and synchronous; no I/O beyond startup loads.

pub mod careers;
pub mod engine;
pub mod features;
pub mod gaps;
pub mod handlers;

use thiserror::Error;

use crate::models::student::LooseNumber;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("field '{field}' is not a valid number: '{value}'")]
    InputFormat { field: String, value: String },

    #[error("classifier predicted class {class_id}, which is not in the career table")]
    KnowledgeBaseMismatch { class_id: usize },

    #[error("classifier returned {actual} probabilities, expected {expected}")]
    ClassifierOutput { expected: usize, actual: usize },
}

impl RecommendError {
    pub fn input_format(field: &str, value: &LooseNumber) -> Self {
        RecommendError::InputFormat {
            field: field.to_string(),
            value: value.raw(),
        }
    }
}
