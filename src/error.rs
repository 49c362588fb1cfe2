//! Error types for signwatch.

/// Result type alias for signwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for signwatch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Data directory could not be determined.
    #[error("could not determine data directory for this platform")]
    DataDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Failed to create the log file or write rows to it.
    #[error("failed to write log table '{path}'")]
    LogWrite {
        /// Path to the log file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Failed to read rows back from the log file.
    #[error("failed to read log table '{path}'")]
    LogRead {
        /// Path to the log file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A detection record handed over by the detection source is malformed.
    #[error("invalid detection: {message}")]
    InvalidDetection {
        /// Description of the violated field contract.
        message: String,
    },

    /// Failed to read a run manifest.
    #[error("failed to read run manifest '{path}'")]
    ManifestRead {
        /// Path to the manifest.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a run manifest.
    #[error("failed to parse run manifest '{path}'")]
    ManifestParse {
        /// Path to the manifest.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to decode a frame image.
    #[error("failed to read image '{path}'")]
    ImageRead {
        /// Path to the image file.
        path: std::path::PathBuf,
        /// Underlying image error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode or write an exported image.
    #[error("failed to write image '{path}'")]
    ImageWrite {
        /// Path to the image file.
        path: std::path::PathBuf,
        /// Underlying image error.
        #[source]
        source: image::ImageError,
    },

    /// OpenCV failed to write or read an exported video.
    #[error("video backend failed on '{path}'")]
    Video {
        /// Path to the video file.
        path: std::path::PathBuf,
        /// Underlying OpenCV error.
        #[source]
        source: opencv::Error,
    },

    /// Video file could not be opened or has no usable stream.
    #[error("invalid video file '{path}': {message}")]
    InvalidVideo {
        /// Path to the video file.
        path: std::path::PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// Export directory is missing or not a directory.
    #[error("export directory does not exist: {path}")]
    ExportDirNotFound {
        /// Path to the export directory.
        path: std::path::PathBuf,
    },

    /// Failed to create an output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Every candidate export name in a directory is taken.
    #[error("no free export name for '{name}' in '{dir}'")]
    ExportNameExhausted {
        /// Base file name.
        name: String,
        /// Export directory.
        dir: std::path::PathBuf,
    },

    /// Failed to read a caption font file.
    #[error("failed to read font '{path}'")]
    FontRead {
        /// Path to the font file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Font file could not be parsed.
    #[error("invalid font file '{path}'")]
    InvalidFont {
        /// Path to the font file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: ab_glyph::InvalidFont,
    },

    /// Target option outside the options of the latest frame.
    #[error("target option {option} does not exist, the last frame has options 0-{last}")]
    InvalidTarget {
        /// Requested option.
        option: usize,
        /// Highest valid option.
        last: usize,
    },

    /// No input images were given to export.
    #[error("no images to export")]
    NoInputImages,
}
