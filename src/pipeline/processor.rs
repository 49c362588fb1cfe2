//! Replay of one recorded run into the result log.

use crate::annotate::annotate;
use crate::context::AppContext;
use crate::detection::{DetectionRecord, count_classes, display_label};
use crate::error::{Error, Result};
use crate::output::progress;
use crate::pipeline::{ManifestFrame, RunManifest};
use image::RgbImage;
use image::imageops::{self, FilterType};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Frames added to the buffer.
    pub frames: usize,
    /// Detections logged.
    pub detections: usize,
    /// Detections rejected as malformed.
    pub rejected: usize,
    /// Detections below the confidence threshold.
    pub below_threshold: usize,
    /// Logged detections per configured class, in class order.
    pub class_counts: Vec<(String, usize)>,
    /// Rows appended to the CSV file.
    pub persisted: usize,
    /// Whether the run was stopped before its last frame.
    pub cancelled: bool,
    /// Processing time in seconds.
    pub duration_secs: f64,
}

/// Load an image file as RGB.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|e| Error::ImageRead {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Resize `image` to the square frame size the buffer stores originals at.
pub fn to_frame_size(image: &RgbImage, frame_size: u32) -> RgbImage {
    if image.dimensions() == (frame_size, frame_size) {
        return image.clone();
    }
    imageops::resize(image, frame_size, frame_size, FilterType::Triangle)
}

/// Replay `manifest` into the context's result log.
///
/// Clears the frame buffer, then for each frame loads the image, validates
/// its detections, logs those at or above the confidence threshold,
/// annotates a copy of the image and buffers it. New rows are persisted at
/// the end, also when the run is stopped early or a frame fails.
///
/// `stop` is checked between frames.
pub fn process_run(
    ctx: &mut AppContext,
    manifest: &RunManifest,
    stop: &AtomicBool,
    progress_enabled: bool,
) -> Result<RunSummary> {
    let start_time = Instant::now();
    info!(
        "Processing {} run '{}' ({} frames)",
        manifest.kind,
        manifest.source,
        manifest.frames.len()
    );

    ctx.log.clear_frames();

    let pb = progress::create_frame_progress(manifest.frames.len(), &manifest.source, progress_enabled);
    let mut summary = RunSummary::default();
    let mut logged: Vec<DetectionRecord> = Vec::new();

    let outcome = run_frames(ctx, manifest, stop, pb.as_ref(), &mut summary, &mut logged);

    progress::finish_progress(pb, "Run complete");

    summary.persisted = ctx.log.persist()?;
    outcome?;

    let classes = &ctx.config.detection.classes;
    summary.class_counts = classes
        .iter()
        .cloned()
        .zip(count_classes(&logged, classes))
        .collect();
    summary.duration_secs = start_time.elapsed().as_secs_f64();

    info!(
        "Logged {} detection(s) from {} frame(s) in {:.2}s",
        summary.detections, summary.frames, summary.duration_secs
    );
    Ok(summary)
}

fn run_frames(
    ctx: &mut AppContext,
    manifest: &RunManifest,
    stop: &AtomicBool,
    pb: Option<&ProgressBar>,
    summary: &mut RunSummary,
    logged: &mut Vec<DetectionRecord>,
) -> Result<()> {
    for frame in &manifest.frames {
        if stop.load(Ordering::Relaxed) {
            warn!("Run '{}' stopped after {} frame(s)", manifest.source, summary.frames);
            summary.cancelled = true;
            break;
        }
        logged.extend(process_frame(ctx, manifest, frame, summary)?);
        progress::inc_progress(pb);
    }
    Ok(())
}

fn process_frame(
    ctx: &mut AppContext,
    manifest: &RunManifest,
    frame: &ManifestFrame,
    summary: &mut RunSummary,
) -> Result<Vec<DetectionRecord>> {
    let path = manifest.image_path(frame);
    let original = load_image(&path)?;
    debug!("Frame {}: {}", summary.frames, path.display());

    let min_confidence = ctx.config.detection.min_confidence;
    let mut records = Vec::with_capacity(frame.detections.len());
    for raw in &frame.detections {
        match DetectionRecord::try_from(raw.clone()) {
            Ok(record) if record.confidence >= min_confidence => records.push(record),
            Ok(record) => {
                debug!(
                    "Skipping {} at {:.2} (below {:.2})",
                    record.label, record.confidence, min_confidence
                );
                summary.below_threshold += 1;
            }
            Err(e) => {
                warn!("Rejected detection in {}: {e}", path.display());
                summary.rejected += 1;
            }
        }
    }

    for record in &records {
        debug!("{} at {}", display_label(&record.label, record.confidence), record.bbox);
        ctx.log.add_detection(&manifest.source, record);
    }

    let mut processed = original.clone();
    annotate(&mut processed, &records, &mut ctx.palette, ctx.font.as_ref());
    let original = to_frame_size(&original, ctx.config.detection.frame_size);

    summary.frames += 1;
    summary.detections += records.len();
    ctx.log.add_frame(processed, records.clone(), original);

    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::annotate::render_selection;
    use crate::config::Config;
    use crate::detection::TargetFilter;
    use crate::pipeline::load_manifest;
    use image::Rgb;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        ctx: AppContext,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.log.path = Some(dir.path().join("log.csv"));
        config.detection.frame_size = 32;
        let ctx = AppContext::init(config).unwrap();
        for name in ["f0.png", "f1.png", "f2.png"] {
            RgbImage::new(64, 48).save(dir.path().join(name)).unwrap();
        }
        Fixture { dir, ctx }
    }

    fn manifest(dir: &TempDir, json: &str) -> RunManifest {
        let path = dir.path().join("run.json");
        std::fs::write(&path, json).unwrap();
        load_manifest(&path).unwrap()
    }

    const THREE_FRAMES: &str = r#"{
        "source": "Camera: 0", "kind": "camera",
        "frames": [
            { "image": "f0.png", "detections": [
                { "label": "stop", "bbox": [10, 10, 50, 40], "confidence": 0.91,
                  "elapsed_seconds": 0.02, "class_id": 10 },
                { "label": "stop", "bbox": [1, 1, 5, 5], "confidence": 0.1,
                  "elapsed_seconds": 0.02, "class_id": 10 } ] },
            { "image": "f1.png", "detections": [
                { "label": "no entry", "bbox": [1, 2], "confidence": 0.8, "class_id": 3 } ] },
            { "image": "f2.png", "detections": [
                { "label": "no entry", "bbox": [0, 0, 20, 20], "confidence": 0.8,
                  "elapsed_seconds": 0.03, "class_id": 3 } ] }
        ]
    }"#;

    #[test]
    fn test_process_run_logs_and_buffers() {
        let Fixture { dir, mut ctx } = fixture();
        let run = manifest(&dir, THREE_FRAMES);

        let summary = process_run(&mut ctx, &run, &AtomicBool::new(false), false).unwrap();

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.detections, 2);
        assert_eq!(summary.below_threshold, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.persisted, 2);
        assert!(!summary.cancelled);

        assert_eq!(ctx.log.frames().len(), 3);
        let latest = ctx.log.frames().latest().unwrap();
        assert_eq!(latest.original.dimensions(), (32, 32));
        assert_eq!(latest.processed.dimensions(), (64, 48));

        assert_eq!(ctx.log.get(0).unwrap().label, "no entry");
        assert_eq!(ctx.log.get(1).unwrap().source_path, "Camera: 0");
        assert_eq!(ctx.log.get(1).unwrap().bbox, "[10, 10, 50, 40]");

        let counts: Vec<usize> = summary
            .class_counts
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(_, n)| *n)
            .collect();
        assert_eq!(counts, vec![1, 1]);
    }

    #[test]
    fn test_process_run_clears_previous_frames() {
        let Fixture { dir, mut ctx } = fixture();
        let run = manifest(&dir, THREE_FRAMES);
        let stop = AtomicBool::new(false);

        process_run(&mut ctx, &run, &stop, false).unwrap();
        let second = process_run(&mut ctx, &run, &stop, false).unwrap();

        assert_eq!(ctx.log.frames().len(), 3);
        assert_eq!(ctx.log.len(), 4);
        assert_eq!(second.persisted, 2);
    }

    #[test]
    fn test_stopped_run_processes_nothing_but_persists() {
        let Fixture { dir, mut ctx } = fixture();
        let run = manifest(&dir, THREE_FRAMES);
        ctx.log.add_log_entry("cam1", "stop", "[1, 1, 2, 2]", 0.9, 0.01);

        let summary = process_run(&mut ctx, &run, &AtomicBool::new(true), false).unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.persisted, 1);
        assert!(ctx.log.frames().is_empty());
    }

    #[test]
    fn test_missing_image_fails_after_persisting() {
        let Fixture { dir, mut ctx } = fixture();
        let run = manifest(
            &dir,
            r#"{ "source": "clip.mp4", "kind": "video", "frames": [
                { "image": "f0.png", "detections": [
                    { "label": "stop", "bbox": [1, 1, 9, 9], "confidence": 0.9,
                      "elapsed_seconds": 0.01, "class_id": 10 } ] },
                { "image": "missing.png" } ] }"#,
        );

        let result = process_run(&mut ctx, &run, &AtomicBool::new(false), false);

        assert!(matches!(result, Err(Error::ImageRead { .. })));
        assert_eq!(ctx.log.pending(), 0);
        let stored = std::fs::read_to_string(ctx.log.path()).unwrap();
        assert_eq!(stored.lines().count(), 2);
    }

    #[test]
    fn test_selection_boxes_follow_resized_original() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.log.path = Some(dir.path().join("log.csv"));
        config.annotate.captions = false;
        let mut ctx = AppContext::init(config).unwrap();
        RgbImage::new(1280, 640).save(dir.path().join("wide.png")).unwrap();
        let run = manifest(
            &dir,
            r#"{ "source": "wide.png", "kind": "image", "frames": [
                { "image": "wide.png", "detections": [
                    { "label": "stop", "bbox": [1000, 100, 1200, 300], "confidence": 0.9,
                      "elapsed_seconds": 0.05, "class_id": 10 } ] } ] }"#,
        );

        process_run(&mut ctx, &run, &AtomicBool::new(false), false).unwrap();
        let image =
            render_selection(ctx.log.frames(), TargetFilter::All, &mut ctx.palette, None).unwrap();

        assert_eq!(image.dimensions(), (640, 640));
        let colour = ctx.palette.colour(10);
        assert_eq!(*image.get_pixel(500, 100), colour);
        assert_eq!(*image.get_pixel(600, 300), colour);
        assert_ne!(*image.get_pixel(550, 200), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(639, 200), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_to_frame_size() {
        let image = RgbImage::new(100, 50);
        assert_eq!(to_frame_size(&image, 640).dimensions(), (640, 640));
    }
}
