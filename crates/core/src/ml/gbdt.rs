//! Gradient Boosted Regression Trees
//!
//! Deterministic squared-error boosting over CART regression trees. Row and
//! column subsampling draw from a seeded RNG, so two fits over the same data
//! and configuration produce identical models.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::{DemandModel, ModelError};
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Minimum squared-error reduction for a split to be kept
const MIN_SPLIT_GAIN: f64 = 1e-12;

/// Boosting hyperparameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GbdtConfig {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Shrinkage applied to every tree's contribution
    pub learning_rate: f64,
    /// Maximum depth of each tree (root has depth 0)
    pub max_depth: usize,
    /// Fraction of rows drawn (without replacement) per tree
    pub subsample: f64,
    /// Fraction of feature columns considered per tree
    pub colsample_bytree: f64,
    /// Minimum rows on each side of a split
    pub min_samples_leaf: usize,
    /// RNG seed for subsampling
    pub seed: u64,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 6,
            subsample: 1.0,
            colsample_bytree: 1.0,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

impl GbdtConfig {
    fn validate(&self) -> Result<(), ModelError> {
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidConfig("n_estimators must be greater than zero".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ModelError::InvalidConfig("learning_rate must be in (0, 1]".into()));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ModelError::InvalidConfig("subsample must be in (0, 1]".into()));
        }
        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return Err(ModelError::InvalidConfig("colsample_bytree must be in (0, 1]".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidConfig(
                "min_samples_leaf must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Tree node; children are indices into the owning tree's node list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf { value: f64 },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

/// Single regression tree, root at index 0
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Walks the tree: `value <= threshold` goes left
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut cursor = 0;
        loop {
            match &self.nodes[cursor] {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    cursor = if features[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match &nodes[at] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct TreeBuilder<'a> {
    rows: &'a [FeatureVector],
    residuals: &'a [f64],
    features: &'a [usize],
    max_depth: usize,
    min_samples_leaf: usize,
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn build(mut self, sample: Vec<usize>) -> RegressionTree {
        self.grow(sample, 0);
        RegressionTree { nodes: self.nodes }
    }

    fn grow(&mut self, sample: Vec<usize>, depth: usize) -> usize {
        let slot = self.nodes.len();
        let leaf_value = mean(sample.iter().map(|row| self.residuals[*row]));
        self.nodes.push(Node::Leaf { value: leaf_value });

        if depth >= self.max_depth || sample.len() < 2 * self.min_samples_leaf {
            return slot;
        }

        let Some(split) = self.best_split(&sample) else {
            return slot;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = sample
            .into_iter()
            .partition(|row| self.rows[*row].get(split.feature) <= split.threshold);

        let left = self.grow(left, depth + 1);
        let right = self.grow(right, depth + 1);
        self.nodes[slot] =
            Node::Split { feature: split.feature, threshold: split.threshold, left, right };
        slot
    }

    /// Exhaustive search over midpoints between distinct sorted values.
    /// Ties keep the first candidate found, which keeps fits reproducible.
    fn best_split(&self, sample: &[usize]) -> Option<SplitCandidate> {
        let count = sample.len() as f64;
        let total: f64 = sample.iter().map(|row| self.residuals[*row]).sum();
        let parent_score = total * total / count;
        let mut best: Option<SplitCandidate> = None;

        for &feature in self.features {
            let mut ordered: Vec<(f64, f64)> = sample
                .iter()
                .map(|row| (self.rows[*row].get(feature), self.residuals[*row]))
                .collect();
            ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for split_at in 1..ordered.len() {
                left_sum += ordered[split_at - 1].1;
                let (previous, next) = (ordered[split_at - 1].0, ordered[split_at].0);
                if previous == next {
                    continue;
                }
                let left_count = split_at;
                let right_count = ordered.len() - split_at;
                if left_count < self.min_samples_leaf || right_count < self.min_samples_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let score = left_sum * left_sum / left_count as f64
                    + right_sum * right_sum / right_count as f64;
                let gain = score - parent_score;
                let improves = best.as_ref().map_or(true, |current| gain > current.gain);
                if gain > MIN_SPLIT_GAIN && improves {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: previous + (next - previous) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Boosted ensemble implementing the demand model contract
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    config: GbdtConfig,
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedRegressor {
    pub fn new(config: GbdtConfig) -> Self {
        Self { config, base_score: 0.0, trees: Vec::new() }
    }

    pub fn config(&self) -> &GbdtConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    fn raw_score(&self, features: &FeatureVector) -> f64 {
        let boosted: f64 =
            self.trees.iter().map(|tree| tree.predict(features.as_slice())).sum::<f64>();
        self.base_score + self.config.learning_rate * boosted
    }
}

impl DemandModel for GradientBoostedRegressor {
    fn fit(&mut self, features: &[FeatureVector], targets: &[f64]) -> Result<(), ModelError> {
        self.config.validate()?;
        if features.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if features.len() != targets.len() {
            return Err(ModelError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let row_count = features.len();
        let rows_per_tree =
            ((row_count as f64 * self.config.subsample).round() as usize).clamp(1, row_count);
        let columns_per_tree = ((FEATURE_COUNT as f64 * self.config.colsample_bytree).round()
            as usize)
            .clamp(1, FEATURE_COUNT);

        self.base_score = mean(targets.iter().copied());
        self.trees.clear();
        let mut predictions = vec![self.base_score; row_count];

        for _ in 0..self.config.n_estimators {
            let residuals: Vec<f64> =
                targets.iter().zip(&predictions).map(|(target, pred)| target - pred).collect();

            let sample = if rows_per_tree == row_count {
                (0..row_count).collect()
            } else {
                let mut drawn = index::sample(&mut rng, row_count, rows_per_tree).into_vec();
                drawn.sort_unstable();
                drawn
            };
            let mut columns = if columns_per_tree == FEATURE_COUNT {
                (0..FEATURE_COUNT).collect()
            } else {
                index::sample(&mut rng, FEATURE_COUNT, columns_per_tree).into_vec()
            };
            columns.sort_unstable();

            let tree = TreeBuilder {
                rows: features,
                residuals: &residuals,
                features: &columns,
                max_depth: self.config.max_depth,
                min_samples_leaf: self.config.min_samples_leaf,
                nodes: Vec::new(),
            }
            .build(sample);

            for (prediction, row) in predictions.iter_mut().zip(features) {
                *prediction += self.config.learning_rate * tree.predict(row.as_slice());
            }
            self.trees.push(tree);
        }

        Ok(())
    }

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        Ok(features.iter().map(|row| self.raw_score(row)).collect())
    }
}
