//! Still image export.

use crate::error::{Error, Result};
use image::{ImageFormat, RgbImage};
use std::path::Path;

/// Write a frame as a lossless PNG.
pub fn write_still(path: &Path, image: &RgbImage) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::ImageWrite {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_still_is_lossless() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("frame.png");
        let image = RgbImage::from_fn(8, 6, |x, y| image::Rgb([x as u8 * 30, y as u8 * 40, 7]));

        write_still(&path, &image).unwrap();

        let read = image::open(&path).unwrap().to_rgb8();
        assert_eq!(read, image);
    }

    #[test]
    fn test_write_still_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        let result = write_still(&path, &RgbImage::new(2, 2));
        assert!(matches!(result, Err(Error::ImageWrite { .. })));
    }
}
