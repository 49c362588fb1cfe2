//! Export file naming.

use crate::constants::export::{MAX_NAME_SUFFIX, TIMESTAMP_FORMAT};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Local time formatted for export file names, e.g. `2024-05-01-13-45-09`.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Generate an export file name.
///
/// Format: `kind_timestamp.ext`
/// Example: `video_2024-05-01-13-45-09.avi`
pub fn export_name(kind: &str, timestamp: &str, extension: &str) -> String {
    format!("{kind}_{timestamp}.{extension}")
}

/// First path in `dir` for the export name that does not exist yet.
///
/// Two exports within the same second get `_1`, `_2`, ... suffixes instead
/// of overwriting each other.
pub fn unique_export_path(
    dir: &Path,
    kind: &str,
    timestamp: &str,
    extension: &str,
) -> Result<PathBuf> {
    let path = dir.join(export_name(kind, timestamp, extension));
    if !path.exists() {
        return Ok(path);
    }

    (1..=MAX_NAME_SUFFIX)
        .map(|n| dir.join(export_name(kind, &format!("{timestamp}_{n}"), extension)))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| Error::ExportNameExhausted {
            name: export_name(kind, timestamp, extension),
            dir: dir.to_path_buf(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_name() {
        assert_eq!(
            export_name("pic", "2024-05-01-13-45-09", "png"),
            "pic_2024-05-01-13-45-09.png"
        );
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), 19);
        assert_eq!(ts.matches('-').count(), 5);
    }

    #[test]
    fn test_unique_export_path_adds_suffix() {
        let dir = TempDir::new().unwrap();
        let first = unique_export_path(dir.path(), "pic", "ts", "png").unwrap();
        assert!(first.ends_with("pic_ts.png"));

        std::fs::write(&first, b"x").unwrap();
        let second = unique_export_path(dir.path(), "pic", "ts", "png").unwrap();
        assert!(second.ends_with("pic_ts_1.png"));

        std::fs::write(&second, b"x").unwrap();
        let third = unique_export_path(dir.path(), "pic", "ts", "png").unwrap();
        assert!(third.ends_with("pic_ts_2.png"));
    }
}
