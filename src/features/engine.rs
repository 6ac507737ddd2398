//! Feature engineering for traffic record classification.
//!
//! Features are computed per record by grouping the batch on `srcip`
//! and aggregating within each group. The formulas match the
//! preprocessing used during model training, so the canonical model
//! input columns and their order must not change without retraining.

use crate::types::record::TrafficRecord;
use std::collections::BTreeMap;

/// Destination ports considered security-sensitive.
pub const CRITICAL_PORTS: [i64; 7] = [22, 23, 25, 53, 80, 443, 445];

/// Number of canonical model input columns.
pub const MODEL_INPUT_WIDTH: usize = 11;

/// The canonical model input columns, as a compile-time enumeration so
/// the inference-time feature order cannot silently drift from the
/// training-time order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureColumn {
    SrcipCount,
    SrcipUniqueDst,
    SrcipAvgBytesSent,
    SrcipAvgBytesReceived,
    SrcipStdBytesSent,
    SrcipStdBytesReceived,
    BytesRatio,
    BytesRatioLog,
    DstportCritical,
    Hour,
    MultiTargetRatio,
}

impl FeatureColumn {
    /// Canonical model input order. One row of model input is the
    /// feature values in exactly this order.
    pub const MODEL_INPUT: [FeatureColumn; MODEL_INPUT_WIDTH] = [
        FeatureColumn::SrcipCount,
        FeatureColumn::SrcipUniqueDst,
        FeatureColumn::SrcipAvgBytesSent,
        FeatureColumn::SrcipAvgBytesReceived,
        FeatureColumn::SrcipStdBytesSent,
        FeatureColumn::SrcipStdBytesReceived,
        FeatureColumn::BytesRatio,
        FeatureColumn::BytesRatioLog,
        FeatureColumn::DstportCritical,
        FeatureColumn::Hour,
        FeatureColumn::MultiTargetRatio,
    ];

    /// Column name matching the training pipeline.
    pub fn name(&self) -> &'static str {
        match self {
            FeatureColumn::SrcipCount => "srcip_count",
            FeatureColumn::SrcipUniqueDst => "srcip_unique_dst",
            FeatureColumn::SrcipAvgBytesSent => "srcip_avg_bytes_sent",
            FeatureColumn::SrcipAvgBytesReceived => "srcip_avg_bytes_received",
            FeatureColumn::SrcipStdBytesSent => "srcip_std_bytes_sent",
            FeatureColumn::SrcipStdBytesReceived => "srcip_std_bytes_received",
            FeatureColumn::BytesRatio => "bytes_ratio",
            FeatureColumn::BytesRatioLog => "bytes_ratio_log",
            FeatureColumn::DstportCritical => "dstport_critical",
            FeatureColumn::Hour => "hour",
            FeatureColumn::MultiTargetRatio => "multi_target_ratio",
        }
    }
}

/// All computed features for one record. The first eleven fields are
/// the canonical model input; the last four are computed for the
/// explanation engine only and are never fed to a model.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub srcip_count: f64,
    pub srcip_unique_dst: f64,
    pub srcip_avg_bytes_sent: f64,
    pub srcip_avg_bytes_received: f64,
    pub srcip_std_bytes_sent: f64,
    pub srcip_std_bytes_received: f64,
    pub bytes_ratio: f64,
    pub bytes_ratio_log: f64,
    pub dstport_critical: f64,
    pub hour: f64,
    pub multi_target_ratio: f64,
    pub critical_port_count: f64,
    pub night_activity: f64,
    pub avg_packet_size: f64,
    pub dst_entropy: f64,
}

impl FeatureRow {
    /// Value of one canonical column.
    pub fn get(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::SrcipCount => self.srcip_count,
            FeatureColumn::SrcipUniqueDst => self.srcip_unique_dst,
            FeatureColumn::SrcipAvgBytesSent => self.srcip_avg_bytes_sent,
            FeatureColumn::SrcipAvgBytesReceived => self.srcip_avg_bytes_received,
            FeatureColumn::SrcipStdBytesSent => self.srcip_std_bytes_sent,
            FeatureColumn::SrcipStdBytesReceived => self.srcip_std_bytes_received,
            FeatureColumn::BytesRatio => self.bytes_ratio,
            FeatureColumn::BytesRatioLog => self.bytes_ratio_log,
            FeatureColumn::DstportCritical => self.dstport_critical,
            FeatureColumn::Hour => self.hour,
            FeatureColumn::MultiTargetRatio => self.multi_target_ratio,
        }
    }

    /// Model input vector in canonical column order.
    pub fn model_input(&self) -> [f64; MODEL_INPUT_WIDTH] {
        let mut row = [0.0; MODEL_INPUT_WIDTH];
        for (i, column) in FeatureColumn::MODEL_INPUT.iter().enumerate() {
            row[i] = self.get(*column);
        }
        row
    }
}

/// Per-`srcip` aggregate statistics over one batch.
struct SourceGroup {
    count: u64,
    sum_sent: f64,
    sum_received: f64,
    dst_counts: BTreeMap<String, u64>,
    critical_ports: u64,
}

/// Compute the full feature row for every record in the batch.
///
/// Aggregates are order-independent: two batches containing the same
/// records in different orders produce identical feature values for
/// corresponding records. Groups use sorted maps so summation order is
/// canonical regardless of input order.
pub fn compute_features(records: &[TrafficRecord]) -> Vec<FeatureRow> {
    let mut groups: BTreeMap<&str, SourceGroup> = BTreeMap::new();

    for record in records {
        let group = groups.entry(record.srcip.as_str()).or_insert(SourceGroup {
            count: 0,
            sum_sent: 0.0,
            sum_received: 0.0,
            dst_counts: BTreeMap::new(),
            critical_ports: 0,
        });
        group.count += 1;
        group.sum_sent += record.bytes_sent as f64;
        group.sum_received += record.bytes_received as f64;
        *group.dst_counts.entry(record.dstip.clone()).or_insert(0) += 1;
        if CRITICAL_PORTS.contains(&record.dstport) {
            group.critical_ports += 1;
        }
    }

    records
        .iter()
        .map(|record| {
            let group = &groups[record.srcip.as_str()];
            let n = group.count as f64;
            let avg_sent = group.sum_sent / n;
            let avg_received = group.sum_received / n;

            let std_sent = group_std(records, &record.srcip, avg_sent, |r| r.bytes_sent as f64);
            let std_received =
                group_std(records, &record.srcip, avg_received, |r| {
                    r.bytes_received as f64
                });

            let bytes_ratio = record.bytes_sent as f64 / (record.bytes_received as f64 + 1.0);
            let dstport_critical = if CRITICAL_PORTS.contains(&record.dstport) {
                1.0
            } else {
                0.0
            };
            let hour = record.hour();

            FeatureRow {
                srcip_count: n,
                srcip_unique_dst: group.dst_counts.len() as f64,
                srcip_avg_bytes_sent: avg_sent,
                srcip_avg_bytes_received: avg_received,
                srcip_std_bytes_sent: std_sent,
                srcip_std_bytes_received: std_received,
                bytes_ratio,
                bytes_ratio_log: bytes_ratio.ln_1p(),
                dstport_critical,
                hour: hour as f64,
                multi_target_ratio: group.dst_counts.len() as f64 / (n + 1.0),
                critical_port_count: group.critical_ports as f64,
                night_activity: if hour < 6 || hour >= 22 { 1.0 } else { 0.0 },
                avg_packet_size: (record.bytes_sent + record.bytes_received) as f64 / n,
                dst_entropy: entropy(&group.dst_counts, group.count),
            }
        })
        .collect()
}

/// Sample standard deviation of `value` within one `srcip` group.
/// A single-member group has no defined sample deviation; 0 is used so
/// NaN never reaches the model input.
fn group_std<F>(records: &[TrafficRecord], srcip: &str, mean: f64, value: F) -> f64
where
    F: Fn(&TrafficRecord) -> f64,
{
    let mut sum_sq = 0.0;
    let mut n = 0u64;
    for record in records.iter().filter(|r| r.srcip == srcip) {
        let d = value(record) - mean;
        sum_sq += d * d;
        n += 1;
    }
    if n < 2 {
        0.0
    } else {
        (sum_sq / (n - 1) as f64).sqrt()
    }
}

/// Shannon entropy (base 2) of the destination distribution within a
/// group. The 1e-9 inside the logarithm guards against floating
/// underflow; true zero-probability bins do not occur here.
fn entropy(dst_counts: &BTreeMap<String, u64>, total: u64) -> f64 {
    let total = total as f64;
    -dst_counts
        .values()
        .map(|&c| {
            let p = c as f64 / total;
            p * (p + 1e-9).log2()
        })
        .sum::<f64>()
}
