//! Uniform scoring interface over heterogeneous classifier shapes

use crate::models::loader::{LoadedModel, ModelKind};
use anyhow::{ensure, Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use tracing::{debug, warn};

/// One (label, risk) pair per scored record, index-aligned with the
/// input feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Scores {
    /// Raw class labels (1 = intrusion).
    pub labels: Vec<i64>,
    /// Risk in [0, 100]. Model confidence on probability paths; binary
    /// 100/0 on the label-only path.
    pub risk_percent: Vec<f64>,
}

/// A scoring function obtained from a model name. The orchestrator
/// depends on this seam only, never on the runtime behind it.
pub trait Scorer {
    fn score(&mut self, matrix: Vec<Vec<f64>>) -> Result<Scores>;
}

impl Scorer for LoadedModel {
    /// Score a feature matrix (rows in canonical column order).
    ///
    /// Applies the fitted scaler when present, shapes the input for the
    /// model kind, and normalizes the heterogeneous outputs to one
    /// (label, risk) pair per row.
    fn score(&mut self, mut matrix: Vec<Vec<f64>>) -> Result<Scores> {
        if matrix.is_empty() {
            return Ok(Scores {
                labels: Vec::new(),
                risk_percent: Vec::new(),
            });
        }

        if let Some(scaler) = &self.scaler {
            scaler.transform(&mut matrix)?;
        }

        let rows = matrix.len();
        let width = matrix[0].len();
        let data: Vec<f32> = matrix
            .iter()
            .flat_map(|row| row.iter().map(|&v| v as f32))
            .collect();

        // Sequence models take a single-time-step 3-D input.
        let shape = match self.kind {
            ModelKind::Sequence => vec![rows as i64, 1, width as i64],
            ModelKind::Probability | ModelKind::Label => vec![rows as i64, width as i64],
        };
        let input_tensor =
            Tensor::from_array((shape, data)).context("Failed to create input tensor")?;

        let outputs = self
            .session
            .run(ort::inputs![&self.input_name => input_tensor])?;

        let scores = match self.kind {
            ModelKind::Probability | ModelKind::Sequence => {
                let probs = extract_probabilities(&outputs, &self.output_name, &self.name, rows)?;
                scores_from_probabilities(&probs)
            }
            ModelKind::Label => {
                let labels = extract_labels(&outputs, &self.output_name, &self.name, rows)?;
                scores_from_labels(&labels)
            }
        };

        debug!(
            model = %self.name,
            rows = rows,
            "Scoring complete"
        );
        Ok(scores)
    }
}

/// Turn per-row class probability distributions into (label, risk):
/// label = arg-max class, risk = max probability as a percentage.
pub fn scores_from_probabilities(probs: &[Vec<f32>]) -> Scores {
    let mut labels = Vec::with_capacity(probs.len());
    let mut risk_percent = Vec::with_capacity(probs.len());

    for row in probs {
        let (label, confidence) = match row.len() {
            0 => (0, 0.5),
            // Single column: probability of the intrusion class.
            1 => {
                let p = row[0];
                if p >= 0.5 {
                    (1, p)
                } else {
                    (0, 1.0 - p)
                }
            }
            _ => {
                let mut best = 0usize;
                for (i, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = i;
                    }
                }
                (best as i64, row[best])
            }
        };
        labels.push(label);
        risk_percent.push((confidence as f64 * 100.0).clamp(0.0, 100.0));
    }

    Scores {
        labels,
        risk_percent,
    }
}

/// Turn raw class labels into (label, risk): 100 for intrusion, 0 for
/// normal. Binary confidence, not a calibrated probability.
pub fn scores_from_labels(labels: &[i64]) -> Scores {
    Scores {
        labels: labels.to_vec(),
        risk_percent: labels
            .iter()
            .map(|&l| if l == 1 { 100.0 } else { 0.0 })
            .collect(),
    }
}

/// Extract per-row class probabilities from model output.
/// Handles tensor outputs (trees, neural nets) and seq(map) outputs
/// (some gradient-boosting ONNX exports).
fn extract_probabilities(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
    model_name: &str,
    rows: usize,
) -> Result<Vec<Vec<f32>>> {
    // Preferred output first, by name.
    if let Some(output) = outputs.get(output_name) {
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            return rows_from_tensor(&shape.iter().copied().collect::<Vec<_>>(), data, rows);
        }
        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return probabilities_from_sequence(output, model_name, rows);
        }
    }

    // Fallback: any non-label output that extracts.
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            debug!(model = %model_name, output = %name, "Extracted probabilities from fallback output");
            return rows_from_tensor(&shape.iter().copied().collect::<Vec<_>>(), data, rows);
        }
        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return probabilities_from_sequence(&output, model_name, rows);
        }
    }

    warn!(model = %model_name, "No probability output found, using neutral scores");
    Ok(vec![vec![0.5, 0.5]; rows])
}

/// Split a flat probability tensor into per-row distributions.
fn rows_from_tensor(dims: &[i64], data: &[f32], rows: usize) -> Result<Vec<Vec<f32>>> {
    let classes = match dims {
        [n, c] => {
            ensure!(
                *n as usize == rows,
                "Model returned {} rows for {} inputs",
                n,
                rows
            );
            *c as usize
        }
        // Rank-1 output: one probability per row.
        [n] => {
            ensure!(
                *n as usize == rows,
                "Model returned {} rows for {} inputs",
                n,
                rows
            );
            1
        }
        other => anyhow::bail!("Unsupported probability output shape {:?}", other),
    };

    ensure!(
        data.len() == rows * classes,
        "Probability tensor has {} values, expected {}",
        data.len(),
        rows * classes
    );
    Ok(data.chunks(classes).map(|c| c.to_vec()).collect())
}

/// Extract probabilities from a seq(map(int64, float)) output, one map
/// of class probabilities per row.
fn probabilities_from_sequence(
    output: &ort::value::DynValue,
    model_name: &str,
    rows: usize,
) -> Result<Vec<Vec<f32>>> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;
    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    ensure!(
        maps.len() == rows,
        "Model returned {} maps for {} inputs",
        maps.len(),
        rows
    );

    let mut probs = Vec::with_capacity(rows);
    for map_value in &maps {
        let mut kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;
        kv_pairs.sort_by_key(|(class, _)| *class);
        probs.push(kv_pairs.into_iter().map(|(_, p)| p).collect());
    }

    debug!(model = %model_name, rows = rows, "Extracted probabilities from seq(map)");
    Ok(probs)
}

/// Extract raw class labels from a label-only model output.
fn extract_labels(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
    model_name: &str,
    rows: usize,
) -> Result<Vec<i64>> {
    let try_from = |output: &ort::value::DynValue| -> Option<Vec<i64>> {
        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            return Some(data.to_vec());
        }
        // Some exports emit labels as floats.
        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return Some(data.iter().map(|&v| v as i64).collect());
        }
        None
    };

    let labels = outputs
        .get(output_name)
        .and_then(try_from)
        .or_else(|| outputs.iter().find_map(|(_, output)| try_from(&output)));

    match labels {
        Some(labels) => {
            ensure!(
                labels.len() == rows,
                "Model returned {} labels for {} inputs",
                labels.len(),
                rows
            );
            Ok(labels)
        }
        None => anyhow::bail!("Model {} produced no extractable label output", model_name),
    }
}
