//! Detection record types and boundary validation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned box in integer pixel coordinates, corners `(x1, y1)`-`(x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x1: i32,
    /// Top edge.
    pub y1: i32,
    /// Right edge.
    pub x2: i32,
    /// Bottom edge.
    pub y2: i32,
}

impl BoundingBox {
    /// Create a box from its corners.
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box width, zero for inverted boxes.
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1).max(0).unsigned_abs()
    }

    /// Box height, zero for inverted boxes.
    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1).max(0).unsigned_abs()
    }

    /// Map the box into an image scaled by `sx` horizontally and `sy` vertically.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        let x = |v: i32| (f64::from(v) * sx).round() as i32;
        let y = |v: i32| (f64::from(v) * sy).round() as i32;
        Self::new(x(self.x1), y(self.y1), x(self.x2), y(self.y2))
    }
}

/// Formats as `[x1, y1, x2, y2]`, the form stored in the log table.
impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// One detected object in one processed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRecord {
    /// Class name.
    pub label: String,
    /// Object location.
    pub bbox: BoundingBox,
    /// Detection confidence (0.0 - 1.0).
    pub confidence: f32,
    /// Inference time of the frame in seconds.
    pub elapsed_seconds: f64,
    /// Class index into the model's class list.
    pub class_id: usize,
}

/// Detection as handed over by the detection source, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDetection {
    /// Class name.
    #[serde(default, alias = "class_name")]
    pub label: Option<String>,
    /// Box corners `[x1, y1, x2, y2]`.
    #[serde(default)]
    pub bbox: Vec<f64>,
    /// Detection confidence.
    #[serde(default, alias = "score")]
    pub confidence: Option<f64>,
    /// Inference time in seconds.
    #[serde(default, alias = "elapsed_time")]
    pub elapsed_seconds: Option<f64>,
    /// Class index.
    #[serde(default)]
    pub class_id: Option<i64>,
}

impl TryFrom<RawDetection> for DetectionRecord {
    type Error = Error;

    fn try_from(raw: RawDetection) -> Result<Self> {
        let label = raw
            .label
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| invalid("missing label".to_string()))?;

        let bbox = parse_bbox(&raw.bbox)?;

        let confidence = raw
            .confidence
            .ok_or_else(|| invalid(format!("{label}: missing confidence")))?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(invalid(format!(
                "{label}: confidence must be between 0 and 1, got {confidence}"
            )));
        }

        let elapsed_seconds = raw
            .elapsed_seconds
            .ok_or_else(|| invalid(format!("{label}: missing elapsed time")))?;
        if !elapsed_seconds.is_finite() || elapsed_seconds < 0.0 {
            return Err(invalid(format!(
                "{label}: elapsed time must be non-negative, got {elapsed_seconds}"
            )));
        }

        let class_id = raw
            .class_id
            .ok_or_else(|| invalid(format!("{label}: missing class id")))?;
        let class_id = usize::try_from(class_id)
            .map_err(|_| invalid(format!("{label}: class id must be non-negative, got {class_id}")))?;

        #[allow(clippy::cast_possible_truncation)]
        let confidence = confidence as f32;

        Ok(Self {
            label,
            bbox,
            confidence,
            elapsed_seconds,
            class_id,
        })
    }
}

/// Truncate four finite coordinates to integer pixels.
fn parse_bbox(values: &[f64]) -> Result<BoundingBox> {
    let [x1, y1, x2, y2] = values else {
        return Err(invalid(format!(
            "bbox must have 4 coordinates, got {}",
            values.len()
        )));
    };
    let coords = [*x1, *y1, *x2, *y2];
    if coords.iter().any(|c| !c.is_finite()) {
        return Err(invalid(format!("bbox has non-finite coordinate: {values:?}")));
    }
    #[allow(clippy::cast_possible_truncation)]
    let [x1, y1, x2, y2] = coords.map(|c| c as i32);
    Ok(BoundingBox::new(x1, y1, x2, y2))
}

fn invalid(message: String) -> Error {
    Error::InvalidDetection { message }
}
