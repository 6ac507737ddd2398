//! Prediction result data structures

use crate::types::record::TrafficRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Normal,
    Intrusion,
}

impl Label {
    /// Map a raw model class index to a label (class 1 = intrusion).
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            Label::Intrusion
        } else {
            Label::Normal
        }
    }

    /// Machine-readable column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Normal => "normal",
            Label::Intrusion => "intrusion",
        }
    }

    /// Human-readable label for rendered output.
    pub fn display(&self) -> &'static str {
        match self {
            Label::Normal => "Normal traffic",
            Label::Intrusion => "Intrusion detected",
        }
    }
}

/// One classified traffic record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// The normalized input record this prediction refers to.
    pub record: TrafficRecord,

    /// Predicted class.
    pub label: Label,

    /// Risk score in [0, 100], rounded to 2 decimals. A confidence
    /// proxy, not a calibrated probability on the label-only path.
    pub risk_percent: f64,

    /// Triggered heuristics, joined with ", ", or the no-anomaly
    /// sentinel when nothing fired.
    pub explanation: String,

    /// When this prediction was produced.
    pub timestamp: DateTime<Utc>,
}

impl Prediction {
    pub fn new(record: TrafficRecord, label: Label, risk_percent: f64, explanation: String) -> Self {
        Self {
            record,
            label,
            risk_percent,
            explanation,
            timestamp: Utc::now(),
        }
    }
}
