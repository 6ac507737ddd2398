//! Input surfaces: CSV files and synthetic record generation

use crate::features::engine::CRITICAL_PORTS;
use crate::types::record::{RawRecord, TrafficRecord};
use anyhow::{ensure, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

const CSV_COLUMNS: [&str; 6] = [
    "srcip",
    "dstip",
    "bytes_sent",
    "bytes_received",
    "dstport",
    "time",
];

/// Read traffic records from a CSV file with a header row.
///
/// Parsing is lenient: columns may appear in any order, unknown columns
/// are ignored, and missing columns or cells become absent fields that
/// the normalizer later defaults. Only a missing header is an error.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header = lines
        .next()
        .transpose()?
        .with_context(|| format!("{} is empty", path.display()))?;
    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .collect();

    for expected in CSV_COLUMNS {
        if !columns.iter().any(|c| c.as_str() == expected) {
            warn!(column = expected, "CSV header is missing a column, defaults will be used");
        }
    }

    let index_of = |name: &str| columns.iter().position(|c| c.as_str() == name);
    let indices: Vec<Option<usize>> = CSV_COLUMNS.iter().map(|c| index_of(c)).collect();

    let mut records = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        let cell = |slot: usize| -> Option<String> {
            indices[slot]
                .and_then(|i| cells.get(i))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        records.push(RawRecord {
            srcip: cell(0),
            dstip: cell(1),
            bytes_sent: cell(2),
            bytes_received: cell(3),
            dstport: cell(4),
            time: cell(5),
        });
    }

    ensure!(!records.is_empty(), "{} contains no records", path.display());
    debug!(records = records.len(), path = %path.display(), "Read CSV input");
    Ok(records)
}

/// Synthetic traffic record generator.
///
/// Owns the "last generated record" so it can be redisplayed without
/// any ambient global; each generation overwrites the previous one.
pub struct Generator {
    rng: StdRng,
    last: Option<TrafficRecord>,
}

impl Generator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            last: None,
        }
    }

    /// Deterministic generator for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            last: None,
        }
    }

    /// Generate one synthetic record: private-range addresses, byte
    /// counts up to 10000, a port drawn from the critical set or a
    /// random high port, and a time uniform within the day.
    pub fn generate(&mut self) -> TrafficRecord {
        let srcip = format!(
            "192.168.{}.{}",
            self.rng.gen_range(0..=255),
            self.rng.gen_range(1..=254)
        );
        let dstip = format!(
            "10.0.{}.{}",
            self.rng.gen_range(0..=255),
            self.rng.gen_range(1..=254)
        );

        let port_choice = self.rng.gen_range(0..=CRITICAL_PORTS.len());
        let dstport = if port_choice < CRITICAL_PORTS.len() {
            CRITICAL_PORTS[port_choice]
        } else {
            self.rng.gen_range(1024..=65535)
        };

        let record = TrafficRecord {
            srcip,
            dstip,
            bytes_sent: self.rng.gen_range(0..=10000),
            bytes_received: self.rng.gen_range(0..=10000),
            dstport,
            time: format!(
                "{:02}:{:02}:{:02}",
                self.rng.gen_range(0..24),
                self.rng.gen_range(0..60),
                self.rng.gen_range(0..60)
            ),
        };

        self.last = Some(record.clone());
        record
    }

    /// The most recently generated record, if any.
    pub fn last(&self) -> Option<&TrafficRecord> {
        self.last.as_ref()
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}
