//! Output surfaces: results table and CSV export

use crate::types::prediction::{Label, Prediction};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tabled::{Table, Tabled};
use tracing::info;

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Source")]
    srcip: String,
    #[tabled(rename = "Destination")]
    dstip: String,
    #[tabled(rename = "Port")]
    dstport: i64,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Prediction")]
    prediction: &'static str,
    #[tabled(rename = "Risk (%)")]
    risk: String,
    #[tabled(rename = "Explanation")]
    explanation: String,
}

/// Render predictions as a terminal table.
pub fn render_table(predictions: &[Prediction]) -> String {
    let rows: Vec<ResultRow> = predictions
        .iter()
        .map(|p| ResultRow {
            srcip: p.record.srcip.clone(),
            dstip: p.record.dstip.clone(),
            dstport: p.record.dstport,
            time: p.record.time.clone(),
            prediction: p.label.display(),
            risk: format!("{:.2}", p.risk_percent),
            explanation: p.explanation.clone(),
        })
        .collect();
    Table::new(rows).to_string()
}

/// One-line distribution of predicted classes.
pub fn render_summary(predictions: &[Prediction]) -> String {
    let intrusions = predictions
        .iter()
        .filter(|p| p.label == Label::Intrusion)
        .count();
    format!(
        "{} records: {} intrusion(s), {} normal",
        predictions.len(),
        intrusions,
        predictions.len() - intrusions
    )
}

/// Write predictions to a CSV file reproducing the input columns plus
/// the prediction columns.
pub fn write_csv<P: AsRef<Path>>(path: P, predictions: &[Prediction]) -> Result<()> {
    let path = path.as_ref();
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    writeln!(
        file,
        "srcip,dstip,bytes_sent,bytes_received,dstport,time,prediction,risk_percent,explanation"
    )?;

    for p in predictions {
        // Explanations contain commas; quote them.
        let explanation = p.explanation.replace('"', "\"\"");
        writeln!(
            file,
            "{},{},{},{},{},{},{},{:.2},\"{}\"",
            p.record.srcip,
            p.record.dstip,
            p.record.bytes_sent,
            p.record.bytes_received,
            p.record.dstport,
            p.record.time,
            p.label.as_str(),
            p.risk_percent,
            explanation
        )?;
    }

    info!(path = %path.display(), rows = predictions.len(), "Wrote predictions CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::TrafficRecord;

    fn prediction(label: Label, risk: f64, explanation: &str) -> Prediction {
        Prediction::new(
            TrafficRecord {
                srcip: "192.168.1.1".to_string(),
                dstip: "10.0.0.1".to_string(),
                bytes_sent: 9000,
                bytes_received: 100,
                dstport: 445,
                time: "02:15:00".to_string(),
            },
            label,
            risk,
            explanation.to_string(),
        )
    }

    #[test]
    fn test_summary_counts() {
        let predictions = vec![
            prediction(Label::Intrusion, 90.0, "critical port used"),
            prediction(Label::Normal, 10.0, "no anomalous behavior detected"),
            prediction(Label::Intrusion, 80.0, "nocturnal activity"),
        ];
        assert_eq!(
            render_summary(&predictions),
            "3 records: 2 intrusion(s), 1 normal"
        );
    }

    #[test]
    fn test_table_contains_columns() {
        let predictions = vec![prediction(Label::Intrusion, 97.5, "critical port used")];
        let table = render_table(&predictions);
        assert!(table.contains("Prediction"));
        assert!(table.contains("Intrusion detected"));
        assert!(table.contains("97.50"));
        assert!(table.contains("critical port used"));
    }

    #[test]
    fn test_write_csv_roundtrips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        let predictions = vec![prediction(
            Label::Intrusion,
            97.5,
            "critical port used, nocturnal activity",
        )];

        write_csv(&path, &predictions).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();

        assert_eq!(
            lines.next().unwrap(),
            "srcip,dstip,bytes_sent,bytes_received,dstport,time,prediction,risk_percent,explanation"
        );
        assert_eq!(
            lines.next().unwrap(),
            "192.168.1.1,10.0.0.1,9000,100,445,02:15:00,intrusion,97.50,\"critical port used, nocturnal activity\""
        );
    }
}
