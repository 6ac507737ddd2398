//! Fitted feature scaler artifact

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A standard scaler fitted at training time: per-column mean and
/// scale. Applied identically at inference time so model inputs match
/// the distribution the model was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl FeatureScaler {
    /// Load a fitted scaler from a JSON artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler from {}", path.display()))?;
        let scaler: FeatureScaler = serde_json::from_str(&data)
            .with_context(|| format!("Invalid scaler artifact {}", path.display()))?;
        ensure!(
            scaler.mean.len() == scaler.scale.len(),
            "Scaler mean/scale length mismatch: {} vs {}",
            scaler.mean.len(),
            scaler.scale.len()
        );
        Ok(scaler)
    }

    /// Number of columns this scaler was fitted on.
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one feature matrix row in place.
    pub fn transform_row(&self, row: &mut [f64]) -> Result<()> {
        ensure!(
            row.len() == self.mean.len(),
            "Scaler fitted on {} columns, got {}",
            self.mean.len(),
            row.len()
        );
        for (i, value) in row.iter_mut().enumerate() {
            // Zero-variance columns pass through unscaled.
            if self.scale[i] != 0.0 {
                *value = (*value - self.mean[i]) / self.scale[i];
            } else {
                *value -= self.mean[i];
            }
        }
        Ok(())
    }

    /// Standardize a whole feature matrix in place.
    pub fn transform(&self, matrix: &mut [Vec<f64>]) -> Result<()> {
        for row in matrix.iter_mut() {
            self.transform_row(row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_transform_standardizes() {
        let scaler = FeatureScaler {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 1.0],
        };
        let mut matrix = vec![vec![14.0, 3.0], vec![10.0, -1.0]];
        scaler.transform(&mut matrix).unwrap();
        assert_eq!(matrix[0], vec![2.0, 3.0]);
        assert_eq!(matrix[1], vec![0.0, -1.0]);
    }

    #[test]
    fn test_zero_scale_only_centers() {
        let scaler = FeatureScaler {
            mean: vec![5.0],
            scale: vec![0.0],
        };
        let mut row = vec![7.0];
        scaler.transform_row(&mut row).unwrap();
        assert_eq!(row, vec![2.0]);
    }

    #[test]
    fn test_width_mismatch_is_error() {
        let scaler = FeatureScaler {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };
        let mut row = vec![1.0];
        assert!(scaler.transform_row(&mut row).is_err());
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"mean": [1.0, 2.0], "scale": [0.5, 1.5]}}"#).unwrap();

        let scaler = FeatureScaler::load(&path).unwrap();
        assert_eq!(scaler.width(), 2);
        assert_eq!(scaler.mean, vec![1.0, 2.0]);
    }

    #[test]
    fn test_load_rejects_mismatched_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"mean": [1.0], "scale": [0.5, 1.5]}}"#).unwrap();
        assert!(FeatureScaler::load(&path).is_err());
    }
}
