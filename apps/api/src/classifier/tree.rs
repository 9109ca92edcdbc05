//! CART decision tree with Gini impurity splits.
//!
//! Leaves keep the full class distribution of the training samples that
//! reached them, so a forest can average probabilities instead of votes.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A node in a fitted tree (either a split or a leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Samples with `row[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        distribution: Vec<f64>,
        n_samples: usize,
    },
}

impl TreeNode {
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Walks to the leaf for `row` and returns its class distribution.
    pub fn leaf_distribution(&self, row: &[f64]) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { distribution, .. } => return distribution,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Checks that every leaf distribution has `n_classes` entries and every
    /// split references a feature below `n_features`.
    pub fn validate(&self, n_classes: usize, n_features: usize) -> Result<(), String> {
        match self {
            TreeNode::Leaf { distribution, .. } if distribution.len() != n_classes => Err(format!(
                "leaf has {} classes, expected {n_classes}",
                distribution.len()
            )),
            TreeNode::Leaf { .. } => Ok(()),
            TreeNode::Split { feature, .. } if *feature >= n_features => Err(format!(
                "split on feature {feature}, model has {n_features} features"
            )),
            TreeNode::Split { left, right, .. } => {
                left.validate(n_classes, n_features)?;
                right.validate(n_classes, n_features)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features considered per split; `None` means all of them.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

/// Fits a tree on the rows of `x` selected by `indices` (duplicates allowed,
/// which is how bootstrap samples are expressed).
pub fn fit_tree<R: Rng>(
    x: &[Vec<f64>],
    y: &[usize],
    indices: &[usize],
    n_classes: usize,
    params: &TreeParams,
    rng: &mut R,
) -> TreeNode {
    let n_features = x.first().map(Vec::len).unwrap_or(0);
    let builder = TreeBuilder {
        x,
        y,
        n_classes,
        n_features,
        params,
    };
    builder.build(indices.to_vec(), 0, rng)
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    n_classes: usize,
    n_features: usize,
    params: &'a TreeParams,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeBuilder<'_> {
    fn build<R: Rng>(&self, indices: Vec<usize>, depth: usize, rng: &mut R) -> TreeNode {
        let counts = self.class_counts(&indices);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);

        if pure || depth_reached || indices.len() < self.params.min_samples_split {
            return self.leaf(&counts, indices.len());
        }

        let Some(split) = self.best_split(&indices, rng) else {
            return self.leaf(&counts, indices.len());
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i][split.feature] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return self.leaf(&counts, indices.len());
        }

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(left, depth + 1, rng)),
            right: Box::new(self.build(right, depth + 1, rng)),
        }
    }

    fn leaf(&self, counts: &[usize], n_samples: usize) -> TreeNode {
        let total = n_samples.max(1) as f64;
        TreeNode::Leaf {
            distribution: counts.iter().map(|&c| c as f64 / total).collect(),
            n_samples,
        }
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }

    /// Every feature in random order, plus how many of them to evaluate
    /// before settling for the best split found so far.
    fn feature_order<R: Rng>(&self, rng: &mut R) -> (Vec<usize>, usize) {
        let mut order: Vec<usize> = (0..self.n_features).collect();
        match self.params.max_features {
            Some(k) if k < self.n_features => {
                order.shuffle(rng);
                (order, k.max(1))
            }
            _ => (order, self.n_features),
        }
    }

    /// Scans every threshold between distinct sorted values of each candidate
    /// feature and keeps the one with the lowest weighted Gini impurity. If the
    /// sampled features are all constant, keeps drawing until one can split.
    fn best_split<R: Rng>(&self, indices: &[usize], rng: &mut R) -> Option<BestSplit> {
        let n = indices.len();
        let total_counts = self.class_counts(indices);
        let mut best: Option<BestSplit> = None;
        let (order, budget) = self.feature_order(rng);

        for (visited, feature) in order.into_iter().enumerate() {
            if visited >= budget && best.is_some() {
                break;
            }
            let mut column: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (self.x[i][feature], self.y[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_counts = vec![0usize; self.n_classes];
            for pos in 0..n - 1 {
                left_counts[column[pos].1] += 1;
                let (value, next) = (column[pos].0, column[pos + 1].0);
                if value == next || !value.is_finite() || !next.is_finite() {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                let right_counts: Vec<usize> = total_counts
                    .iter()
                    .zip(&left_counts)
                    .map(|(t, l)| t - l)
                    .collect();
                let impurity = (n_left as f64 * gini(&left_counts, n_left)
                    + n_right as f64 * gini(&right_counts, n_right))
                    / n as f64;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(BestSplit {
                        feature,
                        threshold: midpoint(value, next),
                        impurity,
                    });
                }
            }
        }

        best
    }
}

/// Halfway between two distinct finite values. Falls back to `value` when the
/// midpoint rounds up to `next` (adjacent floats) or overflows.
fn midpoint(value: f64, next: f64) -> f64 {
    let threshold = value + (next - value) / 2.0;
    if threshold >= next || !threshold.is_finite() {
        value
    } else {
        threshold
    }
}

/// Gini = 1 - Σ(p_i²)
pub fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}
