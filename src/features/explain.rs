//! Heuristic explanations for classified records

use crate::features::engine::FeatureRow;

/// Returned when no heuristic fires.
pub const NO_ANOMALY: &str = "no anomalous behavior detected";

/// Produce a human-readable explanation for one feature row.
///
/// Each trigger is independent and all matching reasons are included,
/// in this fixed order, joined with ", ".
pub fn explain(row: &FeatureRow) -> String {
    let mut reasons = Vec::new();

    if row.dstport_critical == 1.0 {
        reasons.push("critical port used");
    }
    if row.night_activity == 1.0 {
        reasons.push("nocturnal activity");
    }
    if row.multi_target_ratio > 0.5 {
        reasons.push("connection to multiple destinations");
    }
    if row.bytes_ratio > 2.0 {
        reasons.push("abnormal byte ratio");
    }
    if row.dst_entropy > 2.0 {
        reasons.push("high destination diversity");
    }

    if reasons.is_empty() {
        NO_ANOMALY.to_string()
    } else {
        reasons.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_row() -> FeatureRow {
        FeatureRow {
            srcip_count: 1.0,
            srcip_unique_dst: 1.0,
            srcip_avg_bytes_sent: 100.0,
            srcip_avg_bytes_received: 100.0,
            srcip_std_bytes_sent: 0.0,
            srcip_std_bytes_received: 0.0,
            bytes_ratio: 1.0,
            bytes_ratio_log: 0.5,
            dstport_critical: 0.0,
            hour: 12.0,
            multi_target_ratio: 0.5,
            critical_port_count: 0.0,
            night_activity: 0.0,
            avg_packet_size: 200.0,
            dst_entropy: 0.0,
        }
    }

    #[test]
    fn test_no_trigger_returns_sentinel() {
        assert_eq!(explain(&quiet_row()), NO_ANOMALY);
    }

    #[test]
    fn test_all_triggers_in_fixed_order() {
        let row = FeatureRow {
            dstport_critical: 1.0,
            night_activity: 1.0,
            multi_target_ratio: 0.9,
            bytes_ratio: 50.0,
            dst_entropy: 3.0,
            ..quiet_row()
        };
        assert_eq!(
            explain(&row),
            "critical port used, nocturnal activity, connection to multiple destinations, \
             abnormal byte ratio, high destination diversity"
        );
    }

    #[test]
    fn test_single_trigger() {
        let row = FeatureRow {
            bytes_ratio: 2.1,
            ..quiet_row()
        };
        assert_eq!(explain(&row), "abnormal byte ratio");
    }

    #[test]
    fn test_boundary_values_do_not_trigger() {
        // Strict inequalities: 0.5, 2 and 2 are all quiet.
        let row = FeatureRow {
            multi_target_ratio: 0.5,
            bytes_ratio: 2.0,
            dst_entropy: 2.0,
            ..quiet_row()
        };
        assert_eq!(explain(&row), NO_ANOMALY);
    }
}
