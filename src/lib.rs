//! Intrusion Detection Pipeline Library
//!
//! Classifies network traffic records as benign or intrusive using
//! pre-trained ONNX models: per-source feature engineering, a uniform
//! scoring interface over heterogeneous classifiers, and heuristic
//! explanations for each prediction.

pub mod config;
pub mod features;
pub mod input;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod types;

pub use config::AppConfig;
pub use features::engine::{compute_features, FeatureColumn, FeatureRow};
pub use features::explain::explain;
pub use input::Generator;
pub use models::adapter::{Scorer, Scores};
pub use models::loader::{ModelKind, ModelLoader};
pub use pipeline::Pipeline;
pub use types::{Label, Prediction, RawRecord, TrafficRecord};
