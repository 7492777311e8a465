//! Demand Model
//!
//! The pipeline only relies on the [`DemandModel`] fit/predict contract; the
//! bundled implementation is a seeded gradient-boosted tree ensemble. Training
//! helpers here handle the hold-out split and the reported metrics.

pub mod gbdt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FeatureVector;

pub use gbdt::{GbdtConfig, GradientBoostedRegressor};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("cannot train on an empty dataset")]
    EmptyTrainingSet,
    #[error("feature rows ({features}) and targets ({targets}) differ in length")]
    LengthMismatch { features: usize, targets: usize },
    #[error("model has not been fitted")]
    NotFitted,
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),
}

/// Trainable regressor predicting unit sales from a feature vector.
///
/// Predictions are positional with the input and may be negative; callers
/// clamp with [`clamp_demand`].
pub trait DemandModel: Send + Sync {
    fn fit(&mut self, features: &[FeatureVector], targets: &[f64]) -> Result<(), ModelError>;

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>, ModelError>;

    fn predict_one(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.predict(std::slice::from_ref(features))?.first().copied().ok_or(ModelError::NotFitted)
    }
}

/// Negative (or NaN) predictions become zero demand
pub fn clamp_demand(prediction: f64) -> f64 {
    prediction.max(0.0)
}

/// Hold-out regression metrics
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub mse: f64,
    pub r2: f64,
    pub train_samples: usize,
    pub test_samples: usize,
}

/// Fixed training recipe per flow
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingProfile {
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub split_seed: u64,
    pub model: GbdtConfig,
}

impl TrainingProfile {
    /// Forecast flow: 20% hold-out, 200 trees, depth 6, 0.8 row/column subsampling
    pub fn forecast() -> Self {
        Self {
            test_fraction: 0.2,
            split_seed: 42,
            model: GbdtConfig {
                n_estimators: 200,
                learning_rate: 0.1,
                max_depth: 6,
                subsample: 0.8,
                colsample_bytree: 0.8,
                min_samples_leaf: 1,
                seed: 42,
            },
        }
    }

    /// Pricing flow: 10% hold-out, 100 trees, depth 5, no subsampling
    pub fn pricing() -> Self {
        Self {
            test_fraction: 0.1,
            split_seed: 42,
            model: GbdtConfig {
                n_estimators: 100,
                learning_rate: 0.08,
                max_depth: 5,
                subsample: 1.0,
                colsample_bytree: 1.0,
                min_samples_leaf: 1,
                seed: 42,
            },
        }
    }
}

/// Shuffled train/test index split.
///
/// The test side gets `ceil(n * test_fraction)` rows but never all of them;
/// fewer than two rows means everything trains.
pub fn train_test_split(len: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..len).collect();
    if len < 2 || test_fraction <= 0.0 {
        return (indices, Vec::new());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_count = ((len as f64 * test_fraction).ceil() as usize).clamp(1, len - 1);
    let test = indices.split_off(len - test_count);
    (indices, test)
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum::<f64>() / actual.len() as f64
}

/// Coefficient of determination; a constant target scores 1.0 when matched exactly, else 0.0
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let residual: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    let total: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if total == 0.0 {
        return if residual == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - residual / total
}

/// Splits, fits `model` on the training side and scores the hold-out side.
pub fn train_with_holdout<M: DemandModel + ?Sized>(
    model: &mut M,
    features: &[FeatureVector],
    targets: &[f64],
    profile: &TrainingProfile,
) -> Result<ModelMetrics, ModelError> {
    if features.len() != targets.len() {
        return Err(ModelError::LengthMismatch {
            features: features.len(),
            targets: targets.len(),
        });
    }

    let (train, test) = train_test_split(features.len(), profile.test_fraction, profile.split_seed);
    let pick_rows = |indices: &[usize]| -> Vec<FeatureVector> {
        indices.iter().map(|index| features[*index]).collect()
    };
    let pick_targets =
        |indices: &[usize]| -> Vec<f64> { indices.iter().map(|index| targets[*index]).collect() };

    model.fit(&pick_rows(&train), &pick_targets(&train))?;

    let (mse, r2) = if test.is_empty() {
        (0.0, 0.0)
    } else {
        let actual = pick_targets(&test);
        let predicted = model.predict(&pick_rows(&test))?;
        (mean_squared_error(&actual, &predicted), r2_score(&actual, &predicted))
    };

    Ok(ModelMetrics { mse, r2, train_samples: train.len(), test_samples: test.len() })
}
