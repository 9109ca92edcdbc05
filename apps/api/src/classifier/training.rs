//! Offline training helpers: CSV dataset loading, seeded train/test split and
//! the evaluation report printed by `train-model`.

use std::io::Read;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};

use crate::classifier::ModelError;
use crate::recommendation::features::{FEATURE_COUNT, FEATURE_NAMES};

pub const LABEL_COLUMN: &str = "career_code";

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

pub fn load_dataset(path: &Path) -> Result<Dataset, ModelError> {
    let file = std::fs::File::open(path)?;
    let dataset = read_dataset(file)?;
    info!(
        "Dataset shape: ({}, {})",
        dataset.len(),
        FEATURE_COUNT + 1
    );
    Ok(dataset)
}

/// Reads a headered CSV. Every column except `career_code` is a feature, in
/// file order, and there must be exactly as many as the encoder produces.
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset, ModelError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let label_idx = headers
        .iter()
        .position(|h| h == LABEL_COLUMN)
        .ok_or_else(|| {
            ModelError::InvalidTrainingData(format!("missing '{LABEL_COLUMN}' column"))
        })?;

    let feature_columns: Vec<&str> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != label_idx)
        .map(|(_, h)| h)
        .collect();
    if feature_columns.len() != FEATURE_COUNT {
        return Err(ModelError::InvalidTrainingData(format!(
            "expected {FEATURE_COUNT} feature columns, found {}",
            feature_columns.len()
        )));
    }
    if feature_columns != FEATURE_NAMES {
        warn!(
            "Dataset columns {:?} differ from encoder names; assuming the same order",
            feature_columns
        );
    }

    let mut dataset = Dataset::default();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let mut row = Vec::with_capacity(FEATURE_COUNT);
        let mut label = None;
        for (i, field) in record.iter().enumerate() {
            let value = field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    ModelError::InvalidTrainingData(format!(
                        "row {}: column {i} value '{field}' is not a finite number",
                        line + 1
                    ))
                })?;
            if i == label_idx {
                if value < 0.0 || value.fract() != 0.0 {
                    return Err(ModelError::InvalidTrainingData(format!(
                        "row {}: label '{field}' is not a class id",
                        line + 1
                    )));
                }
                label = Some(value as usize);
            } else {
                row.push(value);
            }
        }
        let label = label.ok_or_else(|| {
            ModelError::InvalidTrainingData(format!("row {}: missing label", line + 1))
        })?;
        dataset.features.push(row);
        dataset.labels.push(label);
    }

    Ok(dataset)
}

/// Seeded shuffle, then the first `test_size` fraction becomes the test split.
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: u64) -> (Dataset, Dataset) {
    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((dataset.len() as f64) * test_size.clamp(0.0, 1.0)).ceil() as usize;
    let n_test = n_test.min(dataset.len().saturating_sub(1));
    let (test_idx, train_idx) = indices.split_at(n_test);
    (dataset.subset(train_idx), dataset.subset(test_idx))
}

pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub class: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision/recall/F1 for classes that occur in either vector.
pub fn classification_report(
    y_true: &[usize],
    y_pred: &[usize],
    n_classes: usize,
) -> Vec<ClassMetrics> {
    (0..n_classes)
        .filter_map(|class| {
            let pairs = || y_true.iter().zip(y_pred);
            let tp = pairs().filter(|(t, p)| **t == class && **p == class).count();
            let predicted = y_pred.iter().filter(|&&p| p == class).count();
            let support = y_true.iter().filter(|&&t| t == class).count();
            if predicted == 0 && support == 0 {
                return None;
            }
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            Some(ClassMetrics {
                class,
                precision,
                recall,
                f1,
                support,
            })
        })
        .collect()
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "dept_code,year,cgpa,python,java,sql,ml,ai,coding,design,logic_thinking,teamwork,risk_taking,career_code";

    #[test]
    fn test_read_dataset_splits_label_column() {
        let csv = format!(
            "{HEADER}\n0,3,8.5,1,0,1,1,1,1,0,4,3,2,0\n2,1,6.1,0,0,0,0,0,0,1,2,5,1,2\n"
        );
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.labels, vec![0, 2]);
        assert_eq!(ds.features[0].len(), FEATURE_COUNT);
        assert_eq!(ds.features[1][2], 6.1);
    }

    #[test]
    fn test_label_column_may_be_anywhere() {
        let csv = "career_code,a,b,c,d,e,f,g,h,i,j,k,l,m\n5,1,2,3,4,5,6,7,8,9,10,11,12,13\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.labels, vec![5]);
        assert_eq!(ds.features[0][0], 1.0);
        assert_eq!(ds.features[0][12], 13.0);
    }

    #[test]
    fn test_missing_label_column_is_rejected() {
        let csv = "a,b\n1,2\n";
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(ModelError::InvalidTrainingData(_))
        ));
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let csv = format!("{HEADER}\n0,3,high,1,0,1,1,1,1,0,4,3,2,0\n");
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(ModelError::InvalidTrainingData(_))
        ));
    }

    #[test]
    fn test_nan_and_infinity_are_rejected() {
        for bad in ["nan", "inf", "-infinity"] {
            let csv = format!("{HEADER}\n0,3,{bad},1,0,1,1,1,1,0,4,3,2,0\n");
            assert!(
                matches!(
                    read_dataset(csv.as_bytes()),
                    Err(ModelError::InvalidTrainingData(_))
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_split_is_seeded_and_disjoint() {
        let ds = Dataset {
            features: (0..10).map(|i| vec![i as f64]).collect(),
            labels: (0..10).collect(),
        };
        let (train, test) = train_test_split(&ds, 0.2, 42);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        let mut all: Vec<usize> = train.labels.iter().chain(&test.labels).copied().collect();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        let (_, again) = train_test_split(&ds, 0.2, 42);
        assert_eq!(test.labels, again.labels);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[0, 1, 2, 2], &[0, 1, 1, 2]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_classification_report() {
        let report = classification_report(&[0, 0, 1, 1], &[0, 1, 1, 1], 6);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].class, 0);
        assert_eq!(report[0].precision, 1.0);
        assert_eq!(report[0].recall, 0.5);
        assert_eq!(report[1].precision, 2.0 / 3.0);
        assert_eq!(report[1].recall, 1.0);
        assert_eq!(report[1].support, 2);
    }
}
