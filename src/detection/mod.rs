//! Detection records received from the detection source.

mod summary;
mod types;

pub use summary::{
    ResultRow, TargetFilter, count_classes, display_label, result_rows, target_options,
};
pub use types::{BoundingBox, DetectionRecord, RawDetection};
