//! Feature encoding for the demand model.
//!
//! Records are resolved to concrete values, optionally re-contextualised with
//! [`ContextOverrides`], and encoded into a fixed-order [`FeatureVector`].

pub mod builder;
pub mod encoder;
pub mod season;

pub use builder::{
    ContextOverrides, FeatureBuilder, FeatureEncoders, FeatureError, FeatureVector,
    ResolvedRecord, FEATURE_COUNT, FEATURE_NAMES, MONTH_INDEX, PRICE_INDEX, SEASON_INDEX,
};
pub use encoder::{CategoricalEncoder, EncodingError, UNKNOWN_CATEGORY};
pub use season::{season_for_month, Season};
