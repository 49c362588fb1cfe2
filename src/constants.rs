//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "signwatch";

/// Default number of log rows handed to the presentation layer.
pub const DISPLAY_LIMIT: usize = 500;

/// Frame rate of exported videos.
pub const EXPORT_FPS: u32 = 30;

/// Default minimum confidence for detections taken into the log.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.25;

/// Side length original frames are resized to before buffering.
pub const DEFAULT_FRAME_SIZE: u32 = 640;

/// File name of the durable log table inside the data directory.
pub const LOG_FILE_NAME: &str = "log_table_data.csv";

/// Durable log table columns, in file order.
pub const LOG_COLUMNS: [&str; 5] = [
    "source_path",
    "label",
    "bbox",
    "confidence",
    "elapsed_seconds",
];

/// Columns of the per-frame result table.
pub const FRAME_COLUMNS: [&str; 5] = ["#", "label", "bbox", "confidence", "elapsed_seconds"];

/// Exported media naming.
pub mod export {
    /// `chrono` format of the timestamp embedded in export file names.
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
    /// File name prefix of a single exported still.
    pub const STILL_PREFIX: &str = "pic";
    /// File name prefix of a redrawn target selection.
    pub const SELECTION_PREFIX: &str = "target";
    /// File name prefix of an exported video.
    pub const VIDEO_PREFIX: &str = "video";
    /// Still image extension.
    pub const STILL_EXTENSION: &str = "png";
    /// Video extension.
    pub const VIDEO_EXTENSION: &str = "avi";
    /// Codec of exported videos (Motion JPEG, built into every OpenCV).
    pub const VIDEO_FOURCC: [char; 4] = ['M', 'J', 'P', 'G'];
    /// JPEG quality of MJPEG video frames.
    pub const JPEG_QUALITY: u8 = 90;
    /// Upper bound on `_N` suffixes tried before giving up on a unique name.
    pub const MAX_NAME_SUFFIX: u32 = 10_000;
}

/// Box annotation constants.
pub mod annotate {
    /// Opacity of the box fill.
    pub const FILL_ALPHA: f32 = 0.2;
    /// Border thickness in pixels.
    pub const BORDER_THICKNESS: u32 = 2;
    /// Default caption height in pixels.
    pub const CAPTION_SIZE: f32 = 16.0;
    /// Padding around caption text in pixels.
    pub const CAPTION_PADDING: i32 = 2;
    /// Fonts tried, in order, when no caption font is configured.
    pub const FONT_CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
}

/// Label of the first target-filter option, selecting every detection.
pub const ALL_TARGETS: &str = "All targets";

/// Class names of the bundled traffic-sign model, in class id order.
pub const TRAFFIC_SIGN_CLASSES: [&str; 11] = [
    "speed limit 40",
    "speed limit 50",
    "speed limit 60",
    "speed limit 70",
    "speed limit 80",
    "yield",
    "no entry",
    "parking",
    "pedestrian crossing",
    "roundabout",
    "stop",
];
