//! Durable CSV store of the log table.

use crate::constants::LOG_COLUMNS;
use crate::error::{Error, Result};
use crate::results::LogEntry;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only CSV file with a fixed header.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Bind to `path`, creating the file with its header if it is missing or empty.
    ///
    /// Existing rows are left untouched and not read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::OutputDirCreateFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let needs_header = std::fs::metadata(&path).map_or(true, |meta| meta.len() == 0);
        if needs_header {
            let mut writer = csv::Writer::from_path(&path).map_err(|e| Error::LogWrite {
                path: path.clone(),
                source: e,
            })?;
            writer
                .write_record(LOG_COLUMNS)
                .map_err(|e| Error::LogWrite {
                    path: path.clone(),
                    source: e,
                })?;
            writer.flush()?;
        }

        Ok(Self { path })
    }

    /// Path of the CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `rows` in order, without a header. Returns the number written.
    ///
    /// Rows are encoded in memory first and reach the file in a single
    /// write, so an encoding failure leaves the file unchanged.
    pub fn append<'a, I>(&self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a LogEntry>,
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        let mut written = 0;
        for row in rows {
            writer.serialize(row).map_err(|e| self.write_error(e))?;
            written += 1;
        }
        if written == 0 {
            return Ok(0);
        }
        let encoded = writer.into_inner().map_err(|e| e.into_error())?;

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(&encoded)?;
        file.flush()?;

        Ok(written)
    }

    /// Read every stored row, oldest first.
    pub fn read_all(&self) -> Result<Vec<LogEntry>> {
        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        reader
            .deserialize::<LogEntry>()
            .map(|row| {
                row.map_err(|e| Error::LogRead {
                    path: self.path.clone(),
                    source: e,
                })
            })
            .collect()
    }

    fn write_error(&self, source: csv::Error) -> Error {
        Error::LogWrite {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(label: &str) -> LogEntry {
        LogEntry {
            source_path: "cam0".to_string(),
            label: label.to_string(),
            bbox: "[10, 10, 50, 50]".to_string(),
            confidence: 0.91,
            elapsed_seconds: 0.02,
        }
    }

    #[test]
    fn test_open_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");

        CsvStore::open(&path).unwrap();
        CsvStore::open(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "source_path,label,bbox,confidence,elapsed_seconds\n");
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("log.csv");
        CsvStore::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_keeps_existing_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        let store = CsvStore::open(&path).unwrap();
        store.append(&[entry("stop")]).unwrap();

        let reopened = CsvStore::open(&path).unwrap();
        assert_eq!(reopened.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_append_quotes_bbox() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path().join("log.csv")).unwrap();
        store.append(&[entry("stop")]).unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "cam0,stop,\"[10, 10, 50, 50]\",0.91,0.02");
    }

    #[test]
    fn test_append_nothing_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path().join("log.csv")).unwrap();
        let before = std::fs::read(store.path()).unwrap();
        assert_eq!(store.append(&Vec::<LogEntry>::new()).unwrap(), 0);
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_read_all_round_trips_rows() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path().join("log.csv")).unwrap();
        store.append(&[entry("stop"), entry("yield")]).unwrap();

        let rows = store.read_all().unwrap();
        assert_eq!(rows, vec![entry("stop"), entry("yield")]);
    }

    #[test]
    fn test_append_to_removed_file_fails() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path().join("log.csv")).unwrap();
        std::fs::remove_file(store.path()).unwrap();
        assert!(store.append(&[entry("stop")]).is_err());
    }

    #[test]
    fn test_failed_append_then_retry_writes_rows_once() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::open(dir.path().join("log.csv")).unwrap();
        std::fs::remove_file(store.path()).unwrap();
        let rows = [entry("stop"), entry("yield"), entry("parking")];

        assert!(store.append(&rows).is_err());
        assert!(!store.path().exists());

        CsvStore::open(store.path()).unwrap();
        assert_eq!(store.append(&rows).unwrap(), 3);
        assert_eq!(store.read_all().unwrap(), rows.to_vec());
    }
}
