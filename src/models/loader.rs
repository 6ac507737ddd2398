//! ONNX model discovery and loading

use crate::models::scaler::FeatureScaler;
use anyhow::{bail, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Scoring interface shape of a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Emits class probabilities for a flat `[n, features]` input.
    #[default]
    Probability,
    /// Emits raw class labels only; no probability output.
    Label,
    /// Recurrent model expecting `[n, 1, features]` sequence input.
    Sequence,
}

/// A loaded classifier ready to score feature matrices.
#[derive(Debug)]
pub struct LoadedModel {
    /// Model name (artifact file stem).
    pub name: String,
    /// Scoring interface shape, from the configured registry.
    pub kind: ModelKind,
    /// ONNX Runtime session.
    pub session: Session,
    /// Input name for the model.
    pub input_name: String,
    /// Output name for probabilities or labels.
    pub output_name: String,
    /// Fitted feature scaler, when the artifact is present.
    pub scaler: Option<FeatureScaler>,
}

/// Loader for ONNX classifier artifacts.
///
/// Models live in one directory as `<name>.onnx` files next to an
/// optional shared `scaler.json`. A model is reloaded on every request;
/// invocations are infrequent and user-triggered, so there is no cache.
pub struct ModelLoader {
    models_dir: PathBuf,
    kinds: HashMap<String, ModelKind>,
    scaler_file: String,
    onnx_threads: usize,
}

impl ModelLoader {
    pub fn new<P: AsRef<Path>>(
        models_dir: P,
        kinds: HashMap<String, ModelKind>,
        scaler_file: &str,
        onnx_threads: usize,
    ) -> Result<Self> {
        ort::init().commit()?;
        debug!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self {
            models_dir: models_dir.as_ref().to_path_buf(),
            kinds,
            scaler_file: scaler_file.to_string(),
            onnx_threads,
        })
    }

    /// Selectable model names: the file stem of every `.onnx` artifact
    /// in the models directory, sorted.
    pub fn available_models(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.models_dir).with_context(|| {
            format!(
                "Failed to read models directory {}",
                self.models_dir.display()
            )
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "onnx") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Scoring interface shape configured for a model name.
    pub fn kind_of(&self, name: &str) -> ModelKind {
        self.kinds.get(name).copied().unwrap_or_default()
    }

    /// Load one classifier by name. A missing model artifact is fatal;
    /// a missing scaler artifact is not, scaling is simply skipped.
    pub fn load(&self, name: &str) -> Result<LoadedModel> {
        let path = self.models_dir.join(format!("{name}.onnx"));
        if !path.exists() {
            bail!("Model artifact not found: {}", path.display());
        }

        let kind = self.kind_of(name);
        info!(model = %name, kind = ?kind, path = %path.display(), "Loading model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(&path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        let scaler = self.load_scaler()?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            scaled = scaler.is_some(),
            "Model loaded"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            kind,
            session,
            input_name,
            output_name,
            scaler,
        })
    }

    fn load_scaler(&self) -> Result<Option<FeatureScaler>> {
        let path = self.models_dir.join(&self.scaler_file);
        if !path.exists() {
            debug!(path = %path.display(), "No scaler artifact, features pass through unscaled");
            return Ok(None);
        }
        Ok(Some(FeatureScaler::load(&path)?))
    }
}
