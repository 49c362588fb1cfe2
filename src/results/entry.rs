//! Log table row type.

use crate::detection::DetectionRecord;
use serde::{Deserialize, Serialize};

/// One row of the log table: a detection and where it came from.
///
/// Field names double as the CSV column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// File name or camera identifier the frame came from.
    pub source_path: String,
    /// Class name.
    pub label: String,
    /// Box in its string form.
    pub bbox: String,
    /// Detection confidence (0.0 - 1.0).
    pub confidence: f32,
    /// Inference time in seconds.
    pub elapsed_seconds: f64,
}

impl LogEntry {
    /// Row for `record` found in `source`.
    pub fn from_record(source: &str, record: &DetectionRecord) -> Self {
        Self {
            source_path: source.to_string(),
            label: record.label.clone(),
            bbox: record.bbox.to_string(),
            confidence: record.confidence,
            elapsed_seconds: record.elapsed_seconds,
        }
    }
}
