//! Signwatch - traffic-sign detection result log.
//!
//! This crate keeps the detection log of a traffic-sign detector: it buffers
//! the frames of a run, keeps a newest-first table of detections, appends
//! that table to a CSV file and exports buffered frames as an image or video.

#![warn(missing_docs)]

pub mod annotate;
pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod detection;
pub mod error;
pub mod export;
pub mod frames;
pub mod output;
pub mod pipeline;
pub mod results;

use annotate::render_selection;
use clap::Parser;
use cli::{Cli, Command, ConfigAction, RunArgs};
use config::{Config, config_file_path, load_config_file, load_default_config, save_config};
use constants::export::{SELECTION_PREFIX, STILL_EXTENSION};
use context::AppContext;
use detection::{TargetFilter, result_rows, target_options};
use export::{timestamp_now, unique_export_path, write_still};
use pipeline::{load_image, load_manifest, process_run, to_frame_size};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

pub use error::{Error, Result};

/// Main entry point for the signwatch CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config_file_path()?,
    };

    if let Command::Config { action } = cli.command {
        return handle_config_command(action, &config_path);
    }

    let mut config = if cli.config.is_some() {
        load_config_file(&config_path)?
    } else {
        load_default_config()?
    };
    if let Some(path) = cli.log_file {
        config.log.path = Some(path);
    }

    match cli.command {
        Command::Run(args) => run_manifests(config, &args, cli.quiet),
        Command::History { limit } => show_history(config, limit),
        Command::Export { images } => export_images(config, &images),
        Command::Config { .. } => Ok(()),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    // Tables go to stdout; keep log lines apart from them.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Install a Ctrl+C handler that raises the returned stop flag.
fn install_stop_handler() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }
    stop
}

/// Replay every manifest in order, then print the newest rows.
fn run_manifests(mut config: Config, args: &RunArgs, quiet: bool) -> Result<()> {
    if let Some(min_confidence) = args.min_confidence {
        config.detection.min_confidence = min_confidence;
    }
    let mut ctx = AppContext::init(config)?;
    let stop = install_stop_handler();
    let progress_enabled = !quiet && !args.no_progress;

    let mut processed = 0;
    let mut first_error = None;

    for path in &args.manifests {
        let outcome = load_manifest(path)
            .and_then(|manifest| process_run(&mut ctx, &manifest, &stop, progress_enabled));

        match outcome {
            Ok(summary) => {
                processed += 1;
                println!(
                    "{}: {} frame(s), {} detection(s), {} row(s) saved",
                    path.display(),
                    summary.frames,
                    summary.detections,
                    summary.persisted
                );
                for (class, count) in summary.class_counts.iter().filter(|(_, n)| *n > 0) {
                    println!("  {class}: {count}");
                }
                if args.details {
                    print_frame_details(&ctx);
                }
                if let Some(option) = args.target {
                    export_selection(&mut ctx, option)?;
                }
                if args.export {
                    report_export(ctx.log.export_frames()?);
                }
                if summary.cancelled {
                    warn!("Interrupted, remaining runs skipped");
                    break;
                }
            }
            Err(e) => {
                error!("Failed to process {}: {e}", path.display());
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if !ctx.log.is_empty() {
        print!("{}", output::render_table(ctx.log.render(ctx.display_limit())));
    }

    match first_error {
        Some(e) if processed == 0 => Err(e),
        Some(_) => {
            warn!("Some runs failed, see above");
            Ok(())
        }
        None => Ok(()),
    }
}

/// Print the result rows and target options of the run's last frame.
fn print_frame_details(ctx: &AppContext) {
    let Some(frame) = ctx.log.frames().latest() else {
        return;
    };
    print!("{}", output::render_frame_rows(&result_rows(&frame.detections)));
    for (option, name) in target_options(&frame.detections).iter().enumerate() {
        println!("  [{option}] {name}");
    }
}

/// Redraw the last frame with only target `option` and save it as a still.
fn export_selection(ctx: &mut AppContext, option: usize) -> Result<()> {
    let Some(frame) = ctx.log.frames().latest() else {
        println!("Nothing to export");
        return Ok(());
    };
    let options = target_options(&frame.detections);
    let Some(name) = options.get(option).cloned() else {
        return Err(Error::InvalidTarget {
            option,
            last: options.len() - 1,
        });
    };

    let filter = TargetFilter::from_option(option);
    let Some(image) =
        render_selection(ctx.log.frames(), filter, &mut ctx.palette, ctx.font.as_ref())
    else {
        return Ok(());
    };
    let path = unique_export_path(
        ctx.log.export_dir(),
        SELECTION_PREFIX,
        &timestamp_now(),
        STILL_EXTENSION,
    )?;
    write_still(&path, &image)?;
    info!("Redrew last frame with target '{name}'");
    println!("Exported {name}: {}", path.display());
    Ok(())
}

/// Print stored rows, newest first.
fn show_history(config: Config, limit: Option<usize>) -> Result<()> {
    let mut ctx = AppContext::init(config)?;
    let loaded = ctx.log.reload()?;
    let limit = limit.unwrap_or_else(|| ctx.display_limit());

    print!("{}", output::render_table(ctx.log.render(limit)));
    if loaded > limit {
        info!("Showing {limit} of {loaded} stored rows");
    }
    Ok(())
}

/// Buffer `images` as one run and export them.
fn export_images(config: Config, images: &[PathBuf]) -> Result<()> {
    if images.is_empty() {
        return Err(Error::NoInputImages);
    }
    let mut ctx = AppContext::init(config)?;
    let frame_size = ctx.config.detection.frame_size;

    ctx.log.clear_frames();
    for path in images {
        let image = load_image(path)?;
        let original = to_frame_size(&image, frame_size);
        ctx.log.add_frame(image, Vec::new(), original);
    }

    report_export(ctx.log.export_frames()?);
    Ok(())
}

fn report_export(media: Option<export::ExportedMedia>) {
    match media {
        Some(export::ExportedMedia::Still(path)) => {
            println!("Exported image: {}", path.display());
        }
        Some(export::ExportedMedia::Video { path, frames }) => {
            println!("Exported video ({frames} frames): {}", path.display());
        }
        None => println!("Nothing to export"),
    }
}

fn handle_config_command(action: ConfigAction, path: &Path) -> Result<()> {
    match action {
        ConfigAction::Init => {
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                save_config(&Config::default(), path)?;
                println!("Created configuration file: {}", path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config_file(path)?;
            let contents = toml::to_string_pretty(&config)
                .map_err(|e| Error::ConfigSerialize { source: e })?;
            print!("{contents}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}
