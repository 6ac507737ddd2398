//! Prediction pipeline orchestrator

use crate::config::AppConfig;
use crate::features::engine::compute_features;
use crate::features::explain::explain;
use crate::models::adapter::Scorer;
use crate::models::loader::ModelLoader;
use crate::types::prediction::{Label, Prediction};
use crate::types::record::{RawRecord, TrafficRecord};
use anyhow::{ensure, Result};
use tracing::info;
use uuid::Uuid;

/// Composes the full prediction flow: normalize records, compute
/// features, score with the selected model, attach label, risk and
/// explanation to each record.
///
/// Results are always index-aligned with the input; consumers may rely
/// on positional correspondence.
pub struct Pipeline {
    loader: ModelLoader,
}

impl Pipeline {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let loader = ModelLoader::new(
            &config.models.models_dir,
            config.models.kinds.clone(),
            &config.models.scaler_file,
            config.models.onnx_threads,
        )?;
        Ok(Self { loader })
    }

    /// Model names selectable for prediction.
    pub fn available_models(&self) -> Result<Vec<String>> {
        self.loader.available_models()
    }

    /// Run one complete prediction over a batch of raw records.
    ///
    /// The model is loaded fresh for this request; a missing model
    /// artifact aborts the whole request with no partial output.
    pub fn predict(&self, model_name: &str, raw_records: &[RawRecord]) -> Result<Vec<Prediction>> {
        let records: Vec<TrafficRecord> =
            raw_records.iter().map(TrafficRecord::normalize).collect();
        self.predict_records(model_name, records)
    }

    /// Run one complete prediction over already-normalized records.
    pub fn predict_records(
        &self,
        model_name: &str,
        records: Vec<TrafficRecord>,
    ) -> Result<Vec<Prediction>> {
        ensure!(!records.is_empty(), "No input records to predict on");

        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            model = %model_name,
            records = records.len(),
            "Starting prediction run"
        );

        let mut model = self.loader.load(model_name)?;
        let predictions = score_records(records, &mut model)?;

        let intrusions = predictions
            .iter()
            .filter(|p| p.label == Label::Intrusion)
            .count();
        info!(
            run_id = %run_id,
            intrusions = intrusions,
            "Prediction run complete"
        );
        Ok(predictions)
    }
}

/// Score already-normalized records with any scoring function.
///
/// The model sees only the canonical feature columns; the explanation
/// is computed over the full feature row, including the columns the
/// model never sees.
pub fn score_records(
    records: Vec<TrafficRecord>,
    scorer: &mut dyn Scorer,
) -> Result<Vec<Prediction>> {
    let rows = compute_features(&records);
    let matrix: Vec<Vec<f64>> = rows.iter().map(|r| r.model_input().to_vec()).collect();

    let scores = scorer.score(matrix)?;
    ensure!(
        scores.labels.len() == records.len() && scores.risk_percent.len() == records.len(),
        "Scorer returned {} labels and {} risks for {} records",
        scores.labels.len(),
        scores.risk_percent.len(),
        records.len()
    );

    Ok(records
        .into_iter()
        .zip(rows.iter())
        .zip(scores.labels.iter().zip(scores.risk_percent.iter()))
        .map(|((record, row), (&label, &risk))| {
            Prediction::new(
                record,
                Label::from_class(label),
                round2(risk),
                explain(row),
            )
        })
        .collect())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::explain::NO_ANOMALY;
    use crate::models::adapter::Scores;

    /// Flags every record whose srcip starts with "192." as an
    /// intrusion, with a fixed unrounded confidence.
    struct StubScorer {
        risk: f64,
    }

    impl Scorer for StubScorer {
        fn score(&mut self, matrix: Vec<Vec<f64>>) -> Result<Scores> {
            // srcip itself is not a feature; use srcip_count == 1 as a
            // stand-in marker wired up by the tests below.
            let labels: Vec<i64> = matrix.iter().map(|row| (row[0] == 1.0) as i64).collect();
            let risk_percent = vec![self.risk; matrix.len()];
            Ok(Scores {
                labels,
                risk_percent,
            })
        }
    }

    fn raw(srcip: &str, dstport: &str, time: &str) -> RawRecord {
        RawRecord {
            srcip: Some(srcip.to_string()),
            dstip: Some("10.0.0.1".to_string()),
            bytes_sent: Some("100".to_string()),
            bytes_received: Some("100".to_string()),
            dstport: Some(dstport.to_string()),
            time: Some(time.to_string()),
        }
    }

    #[test]
    fn test_order_preservation_and_alignment() {
        // Three lone sources (count 1, labeled intrusion by the stub)
        // and two records from a repeated source (count 2, normal).
        let raws = vec![
            raw("1.1.1.1", "80", "12:00:00"),
            raw("5.5.5.5", "81", "12:00:00"),
            raw("5.5.5.5", "82", "12:00:00"),
            raw("3.3.3.3", "83", "12:00:00"),
        ];
        let records: Vec<TrafficRecord> = raws.iter().map(TrafficRecord::normalize).collect();

        let mut scorer = StubScorer { risk: 73.456 };
        let predictions = score_records(records.clone(), &mut scorer).unwrap();

        assert_eq!(predictions.len(), 4);
        for (prediction, record) in predictions.iter().zip(&records) {
            assert_eq!(&prediction.record, record);
        }
        assert_eq!(predictions[0].label, Label::Intrusion);
        assert_eq!(predictions[1].label, Label::Normal);
        assert_eq!(predictions[2].label, Label::Normal);
        assert_eq!(predictions[3].label, Label::Intrusion);
    }

    #[test]
    fn test_risk_is_rounded_to_two_decimals() {
        let records = vec![TrafficRecord::normalize(&raw("1.1.1.1", "80", "12:00:00"))];
        let mut scorer = StubScorer { risk: 73.456 };
        let predictions = score_records(records, &mut scorer).unwrap();
        assert_eq!(predictions[0].risk_percent, 73.46);
    }

    #[test]
    fn test_explanation_attached_from_full_feature_row() {
        // Critical port at night with a skewed byte ratio.
        let raws = vec![RawRecord {
            srcip: Some("192.168.1.1".to_string()),
            dstip: Some("10.0.0.1".to_string()),
            bytes_sent: Some("9000".to_string()),
            bytes_received: Some("100".to_string()),
            dstport: Some("445".to_string()),
            time: Some("02:15:00".to_string()),
        }];
        let records: Vec<TrafficRecord> = raws.iter().map(TrafficRecord::normalize).collect();

        let mut scorer = StubScorer { risk: 90.0 };
        let predictions = score_records(records, &mut scorer).unwrap();

        assert_eq!(
            predictions[0].explanation,
            "critical port used, nocturnal activity, abnormal byte ratio"
        );
    }

    #[test]
    fn test_quiet_record_gets_sentinel() {
        let records = vec![TrafficRecord::normalize(&raw("1.1.1.1", "8080", "12:00:00"))];
        let mut scorer = StubScorer { risk: 10.0 };
        let predictions = score_records(records, &mut scorer).unwrap();
        assert_eq!(predictions[0].explanation, NO_ANOMALY);
    }

    #[test]
    fn test_misaligned_scorer_is_rejected() {
        struct ShortScorer;
        impl Scorer for ShortScorer {
            fn score(&mut self, _matrix: Vec<Vec<f64>>) -> Result<Scores> {
                Ok(Scores {
                    labels: vec![0],
                    risk_percent: vec![0.0],
                })
            }
        }

        let records = vec![
            TrafficRecord::normalize(&raw("1.1.1.1", "80", "12:00:00")),
            TrafficRecord::normalize(&raw("2.2.2.2", "80", "12:00:00")),
        ];
        assert!(score_records(records, &mut ShortScorer).is_err());
    }
}
