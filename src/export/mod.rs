//! Export of buffered frames as a still image or a video.

mod naming;
mod still;
mod video;

pub use naming::{export_name, timestamp_now, unique_export_path};
pub use still::write_still;
pub use video::{VideoEncoder, VideoInfo, read_video_info};

use crate::constants::export::{STILL_EXTENSION, STILL_PREFIX, VIDEO_EXTENSION, VIDEO_PREFIX};
use crate::error::{Error, Result};
use crate::frames::FrameBuffer;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Artifact produced by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportedMedia {
    /// A single frame saved as an image.
    Still(PathBuf),
    /// Several frames saved as a video.
    Video {
        /// Path of the video file.
        path: PathBuf,
        /// Number of frames written.
        frames: u32,
    },
}

impl ExportedMedia {
    /// Path of the written file.
    pub fn path(&self) -> &Path {
        match self {
            Self::Still(path) | Self::Video { path, .. } => path,
        }
    }
}

/// Writes frame buffers to a fixed directory.
#[derive(Debug, Clone)]
pub struct MediaExporter {
    dir: PathBuf,
    video: VideoEncoder,
}

impl MediaExporter {
    /// Create an exporter writing into `dir` with videos at `fps`.
    pub fn new(dir: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            dir: dir.into(),
            video: VideoEncoder::new(fps),
        }
    }

    /// Directory exports are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Export `frames` with the current local time in the file name.
    pub fn export(&self, frames: &FrameBuffer) -> Result<Option<ExportedMedia>> {
        self.export_at(frames, &timestamp_now())
    }

    /// Export `frames` using `timestamp` in the file name.
    ///
    /// Returns `Ok(None)` without touching the filesystem when the buffer is
    /// empty. One frame becomes a PNG still, more frames an MJPEG video.
    ///
    /// # Errors
    ///
    /// Returns an error if the export directory does not exist or the file
    /// cannot be written.
    pub fn export_at(
        &self,
        frames: &FrameBuffer,
        timestamp: &str,
    ) -> Result<Option<ExportedMedia>> {
        if frames.is_empty() {
            debug!("Nothing to export: frame buffer is empty");
            return Ok(None);
        }

        if !self.dir.is_dir() {
            return Err(Error::ExportDirNotFound {
                path: self.dir.clone(),
            });
        }

        if let [frame] = frames.iter().as_slice() {
            let path = unique_export_path(&self.dir, STILL_PREFIX, timestamp, STILL_EXTENSION)?;
            write_still(&path, &frame.processed)?;
            info!("Exported frame to {}", path.display());
            return Ok(Some(ExportedMedia::Still(path)));
        }

        let path = unique_export_path(&self.dir, VIDEO_PREFIX, timestamp, VIDEO_EXTENSION)?;
        let written = self.video.write(&path, frames.processed_images())?;
        info!(
            "Exported {} frames ({}x{} @ {} fps) to {}",
            written.frames,
            written.width,
            written.height,
            written.fps,
            path.display()
        );
        Ok(Some(ExportedMedia::Video {
            path,
            frames: written.frames,
        }))
    }
}
