//! Configuration type definitions.

use crate::constants::annotate::CAPTION_SIZE;
use crate::constants::{
    DEFAULT_FRAME_SIZE, DEFAULT_MIN_CONFIDENCE, DISPLAY_LIMIT, EXPORT_FPS, TRAFFIC_SIGN_CLASSES,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Result log settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Media export settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// Detection intake settings.
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Box drawing settings.
    #[serde(default)]
    pub annotate: AnnotateConfig,
}

/// Result log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Path of the durable CSV table (default: platform data directory).
    pub path: Option<PathBuf>,

    /// Maximum number of rows shown.
    pub display_limit: usize,

    /// Load stored rows back into the table at startup.
    pub reload_on_start: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            display_limit: DISPLAY_LIMIT,
            reload_on_start: false,
        }
    }
}

/// Media export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported media is written to (default: the log file's directory).
    pub dir: Option<PathBuf>,

    /// Video frame rate.
    pub fps: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: None,
            fps: EXPORT_FPS,
        }
    }
}

/// Detection intake settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detections below this confidence are not logged.
    pub min_confidence: f32,

    /// Original frames are resized to `frame_size` x `frame_size` before buffering.
    pub frame_size: u32,

    /// Class names in class id order.
    pub classes: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            frame_size: DEFAULT_FRAME_SIZE,
            classes: TRAFFIC_SIGN_CLASSES.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Box drawing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// Caption boxes with their label and confidence.
    pub captions: bool,

    /// Caption font file (default: first common system font found).
    pub font: Option<PathBuf>,

    /// Caption height in pixels.
    pub font_size: f32,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            captions: true,
            font: None,
            font_size: CAPTION_SIZE,
        }
    }
}
