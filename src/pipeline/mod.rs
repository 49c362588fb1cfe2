//! Replay of recorded detector runs.

mod manifest;
mod processor;

pub use manifest::{ManifestFrame, RunManifest, SourceKind, load_manifest};
pub use processor::{RunSummary, load_image, process_run, to_frame_size};
