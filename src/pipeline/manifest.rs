//! Run manifests: recorded detector output for one source.

use crate::detection::RawDetection;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of source a run was recorded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A single still image.
    #[default]
    Image,
    /// A video file.
    Video,
    /// A live camera.
    Camera,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Camera => write!(f, "camera"),
        }
    }
}

/// One frame of a run: the image file and what the detector found in it.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestFrame {
    /// Image file, relative to the manifest's directory unless absolute.
    pub image: PathBuf,
    /// Unvalidated detections.
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

/// A recorded detector run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunManifest {
    /// Source identifier written to the log, e.g. a file name or `Camera: 0`.
    pub source: String,
    /// Kind of source.
    #[serde(default)]
    pub kind: SourceKind,
    /// Frames in capture order.
    #[serde(default)]
    pub frames: Vec<ManifestFrame>,
    /// Directory relative image paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl RunManifest {
    /// Resolved path of `frame`'s image.
    pub fn image_path(&self, frame: &ManifestFrame) -> PathBuf {
        if frame.image.is_absolute() {
            frame.image.clone()
        } else {
            self.base_dir.join(&frame.image)
        }
    }
}

/// Read a manifest from a JSON file.
pub fn load_manifest(path: &Path) -> Result<RunManifest> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::ManifestRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut manifest: RunManifest =
        serde_json::from_str(&contents).map_err(|e| Error::ManifestParse {
            path: path.to_path_buf(),
            source: e,
        })?;

    manifest.base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    Ok(manifest)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "source": "Camera: 0",
        "kind": "camera",
        "frames": [
            { "image": "frame0.png",
              "detections": [ { "label": "stop", "bbox": [10, 10, 50, 50],
                                "confidence": 0.91, "elapsed_seconds": 0.02,
                                "class_id": 10 } ] },
            { "image": "/abs/frame1.png" }
        ]
    }"#;

    #[test]
    fn test_load_manifest_resolves_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, MANIFEST).unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(manifest.source, "Camera: 0");
        assert_eq!(manifest.kind, SourceKind::Camera);
        assert_eq!(manifest.frames.len(), 2);
        assert_eq!(manifest.frames[0].detections.len(), 1);
        assert!(manifest.frames[1].detections.is_empty());

        assert_eq!(
            manifest.image_path(&manifest.frames[0]),
            dir.path().join("frame0.png")
        );
        assert_eq!(
            manifest.image_path(&manifest.frames[1]),
            PathBuf::from("/abs/frame1.png")
        );
    }

    #[test]
    fn test_load_manifest_missing_file() {
        let result = load_manifest(Path::new("/nonexistent/run.json"));
        assert!(matches!(result, Err(Error::ManifestRead { .. })));
    }

    #[test]
    fn test_load_manifest_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_manifest(&path),
            Err(Error::ManifestParse { .. })
        ));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"source": "x", "kind": "radar"}"#).unwrap();
        assert!(load_manifest(&path).is_err());
    }
}
