//! Per-frame result summaries.
//!
//! These build the small tables the presentation layer shows next to a
//! frame: the result rows of its detections, per-class counts, and the
//! options of the target filter.

use crate::constants::ALL_TARGETS;
use crate::detection::DetectionRecord;

/// Caption drawn next to a box, e.g. `stop 91%`.
pub fn display_label(label: &str, confidence: f32) -> String {
    format!("{label} {:.0}%", confidence * 100.0)
}

/// One row of the per-frame result table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Class name.
    pub label: String,
    /// Box in `[x1, y1, x2, y2]` form.
    pub bbox: String,
    /// Confidence rounded to two decimals.
    pub confidence: f32,
    /// Inference time rounded to two decimals.
    pub elapsed_seconds: f64,
}

/// Result rows for one frame, in detection order.
pub fn result_rows(records: &[DetectionRecord]) -> Vec<ResultRow> {
    records
        .iter()
        .map(|r| ResultRow {
            label: r.label.clone(),
            bbox: r.bbox.to_string(),
            confidence: (r.confidence * 100.0).round() / 100.0,
            elapsed_seconds: (r.elapsed_seconds * 100.0).round() / 100.0,
        })
        .collect()
}

/// Count detections per class, in `class_names` order. Unknown labels are ignored.
pub fn count_classes<S: AsRef<str>>(records: &[DetectionRecord], class_names: &[S]) -> Vec<usize> {
    let mut counts = vec![0; class_names.len()];
    for record in records {
        if let Some(idx) = class_names
            .iter()
            .position(|name| name.as_ref() == record.label)
        {
            counts[idx] += 1;
        }
    }
    counts
}

/// Options of the target filter: `All targets`, then `<label>-<n>` per detection.
pub fn target_options(records: &[DetectionRecord]) -> Vec<String> {
    std::iter::once(ALL_TARGETS.to_string())
        .chain(
            records
                .iter()
                .enumerate()
                .map(|(i, r)| format!("{}-{i}", r.label)),
        )
        .collect()
}

/// Which detections of a frame to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFilter {
    /// Every detection.
    #[default]
    All,
    /// A single detection, by its index in the frame.
    Index(usize),
}

impl TargetFilter {
    /// Filter for the option at `option` in [`target_options`].
    pub const fn from_option(option: usize) -> Self {
        match option {
            0 => Self::All,
            n => Self::Index(n - 1),
        }
    }

    /// Whether the detection at `index` passes the filter.
    pub const fn accepts(self, index: usize) -> bool {
        match self {
            Self::All => true,
            Self::Index(i) => i == index,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;

    fn record(label: &str, confidence: f32) -> DetectionRecord {
        DetectionRecord {
            label: label.to_string(),
            bbox: BoundingBox::new(1, 2, 3, 4),
            confidence,
            elapsed_seconds: 0.01234,
            class_id: 0,
        }
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("stop", 0.914), "stop 91%");
        assert_eq!(display_label("yield", 1.0), "yield 100%");
    }

    #[test]
    fn test_result_rows_round_values() {
        let rows = result_rows(&[record("stop", 0.9163)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bbox, "[1, 2, 3, 4]");
        assert!((rows[0].confidence - 0.92).abs() < 1e-6);
        assert_eq!(rows[0].elapsed_seconds, 0.01);
    }

    #[test]
    fn test_count_classes() {
        let records = [record("stop", 0.9), record("yield", 0.8), record("stop", 0.7), record("unknown", 0.5)];
        let counts = count_classes(&records, &["yield", "stop", "parking"]);
        assert_eq!(counts, vec![1, 2, 0]);
    }

    #[test]
    fn test_target_options() {
        let records = [record("stop", 0.9), record("yield", 0.8)];
        assert_eq!(
            target_options(&records),
            vec!["All targets", "stop-0", "yield-1"]
        );
        assert_eq!(target_options(&[]), vec!["All targets"]);
    }

    #[test]
    fn test_target_filter_from_option() {
        assert_eq!(TargetFilter::from_option(0), TargetFilter::All);
        assert_eq!(TargetFilter::from_option(2), TargetFilter::Index(1));
        assert!(TargetFilter::Index(1).accepts(1));
        assert!(!TargetFilter::Index(1).accepts(0));
        assert!(TargetFilter::All.accepts(7));
    }
}
