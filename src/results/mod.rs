//! Result log: per-run frame buffer, detection table and its durable store.
//!
//! A [`ResultLog`] is created once per session and bound to a CSV path. It
//! keeps two independent pieces of state:
//!
//! - the frame buffer of the current run, cleared before each run and used
//!   only for media export;
//! - the detection table, shown newest first, appended to the CSV file by
//!   [`ResultLog::persist`] and kept across runs until [`ResultLog::clear_log`].
//!
//! Rows are held oldest first internally so the durable append stays
//! chronological; a watermark records how many of them are already on disk.

mod entry;
mod store;

pub use entry::LogEntry;
pub use store::CsvStore;

use crate::constants::EXPORT_FPS;
use crate::detection::DetectionRecord;
use crate::error::Result;
use crate::export::{ExportedMedia, MediaExporter};
use crate::frames::{Frame, FrameBuffer};
use image::RgbImage;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rows of the table, newest first.
pub type Rows<'a> = std::iter::Rev<std::slice::Iter<'a, LogEntry>>;

/// Detection log of one application session.
#[derive(Debug)]
pub struct ResultLog {
    store: CsvStore,
    exporter: MediaExporter,
    frames: FrameBuffer,
    /// Oldest first.
    entries: Vec<LogEntry>,
    /// Number of leading `entries` already written to the store.
    persisted: usize,
}

impl ResultLog {
    /// Bind a log to `path`, creating the CSV file with its header if needed.
    ///
    /// Rows already in the file are not loaded; see [`ResultLog::reload`].
    /// Exports go to the file's directory at the default frame rate until
    /// [`ResultLog::with_exporter`] says otherwise.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let store = CsvStore::open(path)?;
        let export_dir = store
            .path()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        debug!("Result log bound to {}", store.path().display());

        Ok(Self {
            store,
            exporter: MediaExporter::new(export_dir, EXPORT_FPS),
            frames: FrameBuffer::new(),
            entries: Vec::new(),
            persisted: 0,
        })
    }

    /// Use `exporter` for [`ResultLog::export_frames`].
    #[must_use]
    pub fn with_exporter(mut self, exporter: MediaExporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Path of the CSV file.
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Directory exports are written to.
    pub fn export_dir(&self) -> &Path {
        self.exporter.dir()
    }

    /// Append a frame to the buffer of the current run.
    pub fn add_frame(
        &mut self,
        processed: RgbImage,
        detections: Vec<DetectionRecord>,
        original: RgbImage,
    ) {
        self.frames.push(Frame {
            processed,
            detections,
            original,
        });
    }

    /// Empty the frame buffer. The detection table is not affected.
    pub fn clear_frames(&mut self) {
        self.frames.clear();
    }

    /// Frames of the current run.
    pub fn frames(&self) -> &FrameBuffer {
        &self.frames
    }

    /// Export the buffered frames.
    ///
    /// `Ok(None)` means there was nothing to export and no file was written.
    /// One frame is saved as a still image, several as a video.
    pub fn export_frames(&self) -> Result<Option<ExportedMedia>> {
        self.exporter.export(&self.frames)
    }

    /// Put a row at the front of the table and return the updated table.
    pub fn add_log_entry(
        &mut self,
        source_path: impl Display,
        label: impl Into<String>,
        bbox: impl Display,
        confidence: f32,
        elapsed_seconds: f64,
    ) -> Rows<'_> {
        self.entries.push(LogEntry {
            source_path: source_path.to_string(),
            label: label.into(),
            bbox: bbox.to_string(),
            confidence,
            elapsed_seconds,
        });
        self.rows()
    }

    /// Put a row for `record` from `source` at the front of the table.
    pub fn add_detection(&mut self, source: &str, record: &DetectionRecord) {
        self.entries.push(LogEntry::from_record(source, record));
    }

    /// Empty the table. The CSV file keeps its rows.
    pub fn clear_log(&mut self) {
        self.entries.clear();
        self.persisted = 0;
    }

    /// Append rows not yet written to the CSV file, oldest first.
    ///
    /// Returns the number of rows written; zero when nothing is pending.
    ///
    /// # Errors
    ///
    /// I/O and CSV errors are returned unchanged and the rows stay pending.
    pub fn persist(&mut self) -> Result<usize> {
        let pending = &self.entries[self.persisted..];
        if pending.is_empty() {
            return Ok(0);
        }

        let written = self.store.append(pending)?;
        self.persisted = self.entries.len();
        info!(
            "Saved {written} row(s) to {}",
            self.store.path().display()
        );
        Ok(written)
    }

    /// At most `limit` rows, newest first.
    pub fn render(&self, limit: usize) -> std::iter::Take<Rows<'_>> {
        self.rows().take(limit)
    }

    /// Every row, newest first.
    pub fn rows(&self) -> Rows<'_> {
        self.entries.iter().rev()
    }

    /// Row at `index`, counted from the newest.
    pub fn get(&self, index: usize) -> Option<&LogEntry> {
        self.entries.iter().rev().nth(index)
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of rows not yet written to the CSV file.
    pub fn pending(&self) -> usize {
        self.entries.len() - self.persisted
    }

    /// Replace the table with the rows stored in the CSV file.
    ///
    /// Loaded rows count as persisted, so a later [`ResultLog::persist`]
    /// does not write them again. Returns the number of rows loaded.
    pub fn reload(&mut self) -> Result<usize> {
        self.entries = self.store.read_all()?;
        self.persisted = self.entries.len();
        info!(
            "Loaded {} row(s) from {}",
            self.entries.len(),
            self.store.path().display()
        );
        Ok(self.entries.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;
    use tempfile::TempDir;

    fn log_in(dir: &TempDir) -> ResultLog {
        ResultLog::create(dir.path().join("log.csv")).unwrap()
    }

    fn line_count(path: &Path) -> usize {
        std::fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn test_add_log_entry_returns_newest_first() {
        let dir = TempDir::new().unwrap();
        let mut log = log_in(&dir);

        log.add_log_entry("a.png", "stop", "[1, 1, 2, 2]", 0.9, 0.01);
        let labels: Vec<String> = log
            .add_log_entry("a.png", "yield", "[3, 3, 4, 4]", 0.8, 0.01)
            .map(|e| e.label.clone())
            .collect();

        assert_eq!(labels, vec!["yield", "stop"]);
        assert_eq!(log.get(0).unwrap().label, "yield");
        assert_eq!(log.get(1).unwrap().label, "stop");
        assert!(log.get(2).is_none());
        assert!(log.get(usize::MAX).is_none());
    }

    #[test]
    fn test_add_log_entry_stringifies_bbox_and_source() {
        let dir = TempDir::new().unwrap();
        let mut log = log_in(&dir);
        log.add_log_entry(
            Path::new("media/a.png").display(),
            "stop",
            BoundingBox::new(1, 2, 3, 4),
            0.5,
            0.1,
        );
        let row = log.get(0).unwrap();
        assert_eq!(row.source_path, "media/a.png");
        assert_eq!(row.bbox, "[1, 2, 3, 4]");
    }

    #[test]
    fn test_persist_writes_only_new_rows() {
        let dir = TempDir::new().unwrap();
        let mut log = log_in(&dir);

        log.add_log_entry("cam0", "stop", "[1, 1, 2, 2]", 0.9, 0.01);
        assert_eq!(log.persist().unwrap(), 1);
        assert_eq!(log.persist().unwrap(), 0);

        log.add_log_entry("cam0", "yield", "[1, 1, 2, 2]", 0.9, 0.01);
        log.add_log_entry("cam0", "parking", "[1, 1, 2, 2]", 0.9, 0.01);
        assert_eq!(log.pending(), 2);
        assert_eq!(log.persist().unwrap(), 2);
        assert_eq!(line_count(log.path()), 4);

        let stored = CsvStore::open(log.path()).unwrap().read_all().unwrap();
        let labels: Vec<&str> = stored.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["stop", "yield", "parking"]);
    }

    #[test]
    fn test_failed_persist_keeps_rows_pending_without_duplicates() {
        let dir = TempDir::new().unwrap();
        let mut log = log_in(&dir);
        log.add_log_entry("cam0", "stop", "[1, 1, 2, 2]", 0.9, 0.01);
        log.add_log_entry("cam0", "yield", "[1, 1, 2, 2]", 0.8, 0.01);
        std::fs::remove_file(log.path()).unwrap();

        assert!(log.persist().is_err());
        assert_eq!(log.pending(), 2);

        CsvStore::open(log.path()).unwrap();
        assert_eq!(log.persist().unwrap(), 2);
        assert_eq!(line_count(log.path()), 3);
    }

    #[test]
    fn test_clear_log_keeps_file() {
        let dir = TempDir::new().unwrap();
        let mut log = log_in(&dir);
        log.add_log_entry("cam0", "stop", "[1, 1, 2, 2]", 0.9, 0.01);
        log.persist().unwrap();

        log.clear_log();
        assert!(log.is_empty());
        assert_eq!(log.persist().unwrap(), 0);
        assert_eq!(line_count(log.path()), 2);
    }

    #[test]
    fn test_frames_and_table_are_independent() {
        let dir = TempDir::new().unwrap();
        let mut log = log_in(&dir);
        log.add_frame(RgbImage::new(4, 4), Vec::new(), RgbImage::new(4, 4));
        log.add_log_entry("cam0", "stop", "[1, 1, 2, 2]", 0.9, 0.01);

        log.clear_frames();
        assert_eq!(log.len(), 1);

        log.add_frame(RgbImage::new(4, 4), Vec::new(), RgbImage::new(4, 4));
        log.clear_log();
        assert_eq!(log.frames().len(), 1);
    }

    #[test]
    fn test_render_caps_rows() {
        let dir = TempDir::new().unwrap();
        let mut log = log_in(&dir);
        for i in 0..20 {
            log.add_log_entry("cam0", format!("sign{i}"), "[0, 0, 1, 1]", 0.5, 0.0);
        }
        let shown: Vec<&LogEntry> = log.render(5).collect();
        assert_eq!(shown.len(), 5);
        assert_eq!(shown[0].label, "sign19");
        assert_eq!(log.len(), 20);
    }

    #[test]
    fn test_create_does_not_load_existing_rows() {
        let dir = TempDir::new().unwrap();
        let mut log = log_in(&dir);
        log.add_log_entry("cam0", "stop", "[1, 1, 2, 2]", 0.9, 0.01);
        log.persist().unwrap();

        let fresh = log_in(&dir);
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_reload_marks_rows_persisted() {
        let dir = TempDir::new().unwrap();
        let mut log = log_in(&dir);
        log.add_log_entry("cam0", "stop", "[1, 1, 2, 2]", 0.9, 0.01);
        log.add_log_entry("cam0", "yield", "[1, 1, 2, 2]", 0.8, 0.01);
        log.persist().unwrap();

        let mut next = log_in(&dir);
        assert_eq!(next.reload().unwrap(), 2);
        assert_eq!(next.get(0).unwrap().label, "yield");
        assert_eq!(next.pending(), 0);
        assert_eq!(next.persist().unwrap(), 0);
        assert_eq!(line_count(next.path()), 3);
    }

    #[test]
    fn test_default_export_dir_is_log_directory() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        assert_eq!(log.export_dir(), dir.path());
    }

    #[test]
    fn test_add_detection() {
        let dir = TempDir::new().unwrap();
        let mut log = log_in(&dir);
        let record = DetectionRecord {
            label: "stop".to_string(),
            bbox: BoundingBox::new(10, 10, 50, 50),
            confidence: 0.91,
            elapsed_seconds: 0.02,
            class_id: 10,
        };
        log.add_detection("Camera: 0", &record);
        let row = log.get(0).unwrap();
        assert_eq!(row.bbox, "[10, 10, 50, 50]");
        assert_eq!(row.confidence, 0.91);
    }
}
