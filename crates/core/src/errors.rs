use thiserror::Error;

use crate::config::ConfigError;
use crate::features::FeatureError;
use crate::ml::ModelError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(
        "product store is missing required columns: {}; run `pricecast migrate` or add them to the product table",
        .0.join(", ")
    )]
    MissingColumns(Vec<String>),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Feature(#[from] FeatureError),
}

impl PipelineError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_validation",
            Self::MissingColumns(_) => "schema_precondition",
            Self::Store(_) => "store_access",
            Self::Model(_) | Self::Feature(_) => "model_training",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Store(_) => 4,
            Self::MissingColumns(_) => 5,
            Self::Model(_) | Self::Feature(_) => 6,
        }
    }
}
