//! Configuration management for the intrusion detection pipeline

use crate::models::loader::ModelKind;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
}

/// ML models configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory containing ONNX model artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: String,
    /// Model used when none is selected on the command line
    #[serde(default = "default_model")]
    pub default_model: String,
    /// File name of the optional fitted scaler inside `models_dir`
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
    /// Scoring interface shape per model name; unlisted models are
    /// treated as probability classifiers
    #[serde(default = "default_model_kinds")]
    pub kinds: HashMap<String, ModelKind>,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_model() -> String {
    "random_forest".to_string()
}

fn default_scaler_file() -> String {
    "scaler.json".to_string()
}

fn default_model_kinds() -> HashMap<String, ModelKind> {
    let mut kinds = HashMap::new();
    kinds.insert("lstm".to_string(), ModelKind::Sequence);
    kinds
}

fn default_onnx_threads() -> usize {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default file location
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models: ModelsConfig {
                models_dir: default_models_dir(),
                default_model: default_model(),
                scaler_file: default_scaler_file(),
                kinds: default_model_kinds(),
                onnx_threads: default_onnx_threads(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
