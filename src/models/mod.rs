//! ML model loading and scoring components

pub mod adapter;
pub mod loader;
pub mod scaler;

pub use adapter::{Scorer, Scores};
pub use loader::{LoadedModel, ModelKind, ModelLoader};
pub use scaler::FeatureScaler;
