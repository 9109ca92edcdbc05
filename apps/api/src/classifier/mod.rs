//! Career classifier. Trait-based so the recommendation engine can run
//! against the trained random forest or a fixed-distribution test double.
//!
//! `AppState` holds an `Arc<dyn Classifier>` built once at startup and shared
//! read-only across requests.

pub mod forest;
pub mod training;
pub mod tree;

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::recommendation::features::FeatureVector;

pub use forest::{ForestParams, RandomForest};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("model was trained on a different feature layout: {found:?}")]
    FeatureMismatch { found: Vec<String> },

    #[error("corrupt model: {0}")]
    Corrupt(String),

    #[error("invalid training data: {0}")]
    InvalidTrainingData(String),

    #[error("dataset error: {0}")]
    Dataset(#[from] csv::Error),
}

/// A multi-class probabilistic classifier over encoded student features.
pub trait Classifier: Send + Sync {
    fn n_classes(&self) -> usize;

    /// Probability per class id, aligned with the career table.
    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64>;

    /// Most probable class id. Ties go to the lowest id.
    fn predict(&self, features: &FeatureVector) -> usize {
        argmax(&self.predict_proba(features))
    }
}

pub fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best_v), (i, &v)| {
            if v > best_v {
                (i, v)
            } else {
                (best_i, best_v)
            }
        })
        .0
}

/// Loads and validates the serialized forest produced by `train-model`.
pub fn load_classifier(path: &Path) -> Result<RandomForest, ModelError> {
    let forest = RandomForest::load(path)?;
    info!(
        "Loaded career model from {} ({} trees, {} classes)",
        path.display(),
        forest.trees.len(),
        forest.n_classes
    );
    Ok(forest)
}
