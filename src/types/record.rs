//! Traffic record data structures and input normalization

use serde::{Deserialize, Serialize};

/// One traffic record as read from an untrusted source (CSV row, form
/// fields). Every field may be missing or malformed; normalization
/// turns this into a [`TrafficRecord`] without ever failing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub srcip: Option<String>,
    pub dstip: Option<String>,
    pub bytes_sent: Option<String>,
    pub bytes_received: Option<String>,
    pub dstport: Option<String>,
    pub time: Option<String>,
}

/// One observed flow, fully normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRecord {
    /// Source address. Any string is accepted; no format validation.
    pub srcip: String,

    /// Destination address.
    pub dstip: String,

    /// Bytes sent by the source. 0 if absent or unparseable.
    pub bytes_sent: u64,

    /// Bytes received by the source. 0 if absent or unparseable.
    pub bytes_received: u64,

    /// Destination port. No range validation; out-of-range values pass
    /// through unchanged.
    pub dstport: i64,

    /// Time of day, `HH:MM:SS`. Malformed values degrade to hour 0 at
    /// feature time rather than being rejected here.
    pub time: String,
}

impl TrafficRecord {
    /// Normalize a raw record into a traffic record. Total function:
    /// missing or malformed fields get their documented defaults and
    /// nothing is ever rejected.
    pub fn normalize(raw: &RawRecord) -> Self {
        Self {
            srcip: normalize_string(&raw.srcip, "0.0"),
            dstip: normalize_string(&raw.dstip, "0.0"),
            bytes_sent: normalize_u64(&raw.bytes_sent),
            bytes_received: normalize_u64(&raw.bytes_received),
            dstport: normalize_i64(&raw.dstport),
            time: normalize_string(&raw.time, "00:00:00"),
        }
    }

    /// Hour of day parsed from `time`, 0 on any parse failure.
    pub fn hour(&self) -> u32 {
        parse_hour(&self.time)
    }
}

/// Parse the hour component of a `HH:MM:SS` string. Takes everything
/// before the first `:` and integer-parses it; any failure (empty,
/// non-numeric, out of range) falls back to 0.
pub fn parse_hour(time: &str) -> u32 {
    time.split(':')
        .next()
        .and_then(|h| h.trim().parse::<u32>().ok())
        .filter(|&h| h < 24)
        .unwrap_or(0)
}

fn normalize_string(value: &Option<String>, default: &str) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default.to_string(),
    }
}

fn normalize_u64(value: &Option<String>) -> u64 {
    value
        .as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

fn normalize_i64(value: &Option<String>) -> i64 {
    value
        .as_deref()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fields: [&str; 6]) -> RawRecord {
        RawRecord {
            srcip: Some(fields[0].to_string()),
            dstip: Some(fields[1].to_string()),
            bytes_sent: Some(fields[2].to_string()),
            bytes_received: Some(fields[3].to_string()),
            dstport: Some(fields[4].to_string()),
            time: Some(fields[5].to_string()),
        }
    }

    #[test]
    fn test_normalize_complete_record() {
        let record = TrafficRecord::normalize(&raw([
            "192.168.1.1",
            "10.0.0.1",
            "9000",
            "100",
            "445",
            "02:15:00",
        ]));

        assert_eq!(record.srcip, "192.168.1.1");
        assert_eq!(record.bytes_sent, 9000);
        assert_eq!(record.bytes_received, 100);
        assert_eq!(record.dstport, 445);
        assert_eq!(record.hour(), 2);
    }

    #[test]
    fn test_normalize_empty_record_uses_defaults() {
        let record = TrafficRecord::normalize(&RawRecord::default());

        assert_eq!(record.srcip, "0.0");
        assert_eq!(record.dstip, "0.0");
        assert_eq!(record.bytes_sent, 0);
        assert_eq!(record.bytes_received, 0);
        assert_eq!(record.dstport, 0);
        assert_eq!(record.time, "00:00:00");
    }

    #[test]
    fn test_normalize_malformed_numerics() {
        let record =
            TrafficRecord::normalize(&raw(["a", "b", "lots", "-5", "not_a_port", "12:00:00"]));

        assert_eq!(record.bytes_sent, 0);
        assert_eq!(record.bytes_received, 0);
        assert_eq!(record.dstport, 0);
    }

    #[test]
    fn test_parse_hour_edge_cases() {
        assert_eq!(parse_hour("23:59:59"), 23);
        assert_eq!(parse_hour("00:00:00"), 0);
        assert_eq!(parse_hour("7:30:00"), 7);
        assert_eq!(parse_hour(""), 0);
        assert_eq!(parse_hour("not a time"), 0);
        assert_eq!(parse_hour(":30:00"), 0);
        assert_eq!(parse_hour("99:00:00"), 0);
    }

    #[test]
    fn test_out_of_range_port_passes_through() {
        let record = TrafficRecord::normalize(&raw(["a", "b", "0", "0", "70000", "00:00:00"]));
        assert_eq!(record.dstport, 70000);
    }
}
