use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::tree::{fit_tree, TreeNode, TreeParams};
use crate::classifier::{Classifier, ModelError};
use crate::recommendation::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

/// Bumped whenever the serialized layout changes.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Bagged ensemble of CART trees. `predict_proba` is the mean of the leaf
/// distributions reached in each tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub n_classes: usize,
    pub trees: Vec<TreeNode>,
}

impl RandomForest {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        params: &ForestParams,
    ) -> Result<Self, ModelError> {
        if x.is_empty() {
            return Err(ModelError::InvalidTrainingData(
                "dataset has no rows".to_string(),
            ));
        }
        if x.len() != y.len() {
            return Err(ModelError::InvalidTrainingData(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        if let Some(row) = x.iter().position(|r| r.len() != FEATURE_COUNT) {
            return Err(ModelError::InvalidTrainingData(format!(
                "row {row} has {} features, expected {FEATURE_COUNT}",
                x[row].len()
            )));
        }
        if let Some(row) = x.iter().position(|r| r.iter().any(|v| !v.is_finite())) {
            return Err(ModelError::InvalidTrainingData(format!(
                "row {row} has a non-finite feature value"
            )));
        }
        if let Some(label) = y.iter().find(|&&label| label >= n_classes) {
            return Err(ModelError::InvalidTrainingData(format!(
                "label {label} outside 0..{n_classes}"
            )));
        }
        if params.n_estimators == 0 {
            return Err(ModelError::InvalidTrainingData(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: Some(default_max_features(FEATURE_COUNT)),
        };

        let n_samples = x.len();
        let trees: Vec<TreeNode> = (0..params.n_estimators)
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));
                let indices = bootstrap_sample(n_samples, &mut rng);
                fit_tree(x, y, &indices, n_classes, &tree_params, &mut rng)
            })
            .collect();

        let max_depth = trees.iter().map(TreeNode::depth).max().unwrap_or(0);
        debug!("Fitted {} trees (max depth {max_depth})", trees.len());

        Ok(Self {
            format_version: MODEL_FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            n_classes,
            trees,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        info!("Saved model with {} trees to {}", self.trees.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let reader = BufReader::new(File::open(path)?);
        let forest: RandomForest = serde_json::from_reader(reader)?;
        forest.validate()?;
        Ok(forest)
    }

    /// Rejects artifacts whose layout, column order or tree shape does not
    /// match what the feature encoder produces.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: self.format_version,
                expected: MODEL_FORMAT_VERSION,
            });
        }
        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ModelError::FeatureMismatch {
                found: self.feature_names.clone(),
            });
        }
        if self.n_classes == 0 || self.trees.is_empty() {
            return Err(ModelError::Corrupt(
                "model has no classes or no trees".to_string(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_classes, FEATURE_COUNT)
                .map_err(|e| ModelError::Corrupt(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf_distribution(features.as_slice())) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len().max(1) as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }
}

/// sqrt(n_features), at least one.
fn default_max_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt() as usize).max(1)
}

fn bootstrap_sample(n_samples: usize, rng: &mut StdRng) -> Vec<usize> {
    let dist = Uniform::from(0..n_samples);
    (0..n_samples).map(|_| dist.sample(rng)).collect()
}
