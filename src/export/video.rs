//! Video export through OpenCV's `VideoWriter`.
//!
//! Frames are written as Motion JPEG into an AVI container, the codec
//! OpenCV ships without external backends.

use crate::constants::export::{JPEG_QUALITY, VIDEO_FOURCC};
use crate::error::{Error, Result};
use image::RgbImage;
use image::imageops::{self, FilterType};
use opencv::core::{Mat, Size};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, VideoCaptureTraitConst, VideoWriter};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

/// Stream properties of a written or read-back video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    /// Number of frames.
    pub frames: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback rate in frames per second.
    pub fps: u32,
}

/// Writes frame sequences as MJPEG AVI files.
#[derive(Debug, Clone)]
pub struct VideoEncoder {
    fps: u32,
    quality: u8,
}

impl VideoEncoder {
    /// Create an encoder producing videos at `fps` frames per second.
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            quality: JPEG_QUALITY,
        }
    }

    /// Set the JPEG quality (1-100) of the frames.
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Write `frames` in order to `path`.
    ///
    /// The video takes the size of the first frame; frames of another size
    /// are resized to it.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no frames, the path is not UTF-8, or
    /// OpenCV cannot open the file or encode a frame.
    pub fn write<'a, I>(&self, path: &Path, frames: I) -> Result<VideoInfo>
    where
        I: IntoIterator<Item = &'a RgbImage>,
    {
        let mut frames = frames.into_iter();
        let Some(first) = frames.next() else {
            return Err(invalid(path, "no frames to write"));
        };
        let (width, height) = first.dimensions();
        let filename = utf8_path(path)?;
        let backend = |e| Error::Video {
            path: path.to_path_buf(),
            source: e,
        };

        let fourcc = VideoWriter::fourcc(
            VIDEO_FOURCC[0],
            VIDEO_FOURCC[1],
            VIDEO_FOURCC[2],
            VIDEO_FOURCC[3],
        )
        .map_err(backend)?;
        let mut writer = VideoWriter::new(
            filename,
            fourcc,
            f64::from(self.fps),
            Size::new(to_i32(path, width)?, to_i32(path, height)?),
            true,
        )
        .map_err(backend)?;
        if !writer.is_opened().map_err(backend)? {
            return Err(invalid(path, "writer could not be opened"));
        }
        if !writer
            .set(videoio::VIDEOWRITER_PROP_QUALITY, f64::from(self.quality))
            .map_err(backend)?
        {
            debug!("Video backend ignored JPEG quality {}", self.quality);
        }

        let mut written: u32 = 0;
        for frame in std::iter::once(first).chain(frames) {
            let frame = if frame.dimensions() == (width, height) {
                Cow::Borrowed(frame)
            } else {
                Cow::Owned(imageops::resize(frame, width, height, FilterType::Triangle))
            };
            let bgr = to_bgr(&frame);
            let mat = Mat::from_slice(bgr.as_slice()).map_err(backend)?;
            let mat = mat.reshape(3, to_i32(path, height)?).map_err(backend)?;
            writer.write(&mat).map_err(backend)?;
            written += 1;
        }
        writer.release().map_err(backend)?;

        Ok(VideoInfo {
            frames: written,
            width,
            height,
            fps: self.fps,
        })
    }
}

/// Read frame count, size and frame rate of the video at `path`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn read_video_info(path: &Path) -> Result<VideoInfo> {
    let backend = |e| Error::Video {
        path: path.to_path_buf(),
        source: e,
    };
    let cap = VideoCapture::from_file(utf8_path(path)?, videoio::CAP_ANY).map_err(backend)?;
    if !cap.is_opened().map_err(backend)? {
        return Err(invalid(path, "no readable video stream"));
    }

    let prop = |id| VideoCaptureTraitConst::get(&cap, id).map_err(backend);
    let frames = prop(videoio::CAP_PROP_FRAME_COUNT)?;
    let width = prop(videoio::CAP_PROP_FRAME_WIDTH)?;
    let height = prop(videoio::CAP_PROP_FRAME_HEIGHT)?;
    let fps = prop(videoio::CAP_PROP_FPS)?;
    if frames < 1.0 || width < 1.0 || height < 1.0 {
        return Err(invalid(path, "video has no frames"));
    }

    Ok(VideoInfo {
        frames: frames.round() as u32,
        width: width.round() as u32,
        height: height.round() as u32,
        fps: fps.round() as u32,
    })
}

/// Interleaved BGR bytes, the channel order OpenCV expects.
fn to_bgr(image: &RgbImage) -> Vec<u8> {
    image
        .pixels()
        .flat_map(|p| [p[2], p[1], p[0]])
        .collect()
}

fn utf8_path(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| invalid(path, "path is not valid UTF-8"))
}

fn to_i32(path: &Path, value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| invalid(path, &format!("frame dimension {value} too large")))
}

fn invalid(path: &Path, message: &str) -> Error {
    Error::InvalidVideo {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}
