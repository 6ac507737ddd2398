//! Type definitions for the intrusion detection pipeline

pub mod prediction;
pub mod record;

pub use prediction::{Label, Prediction};
pub use record::{RawRecord, TrafficRecord};

