//! Feature engineering and explanation components

pub mod engine;
pub mod explain;

pub use engine::{compute_features, FeatureColumn, FeatureRow, MODEL_INPUT_WIDTH};
pub use explain::{explain, NO_ANOMALY};
