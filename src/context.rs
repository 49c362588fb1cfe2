//! Application context shared by every entry point.

use crate::annotate::{CaptionFont, Palette};
use crate::config::{AnnotateConfig, Config, export_dir, log_file_path, validate_config};
use crate::error::{Error, Result};
use crate::export::MediaExporter;
use crate::results::ResultLog;
use tracing::{debug, info, warn};

/// Session state: configuration, result log, palette and caption font.
///
/// Built once by [`AppContext::init`] and passed explicitly to whatever
/// needs it.
#[derive(Debug)]
pub struct AppContext {
    /// Validated configuration.
    pub config: Config,
    /// Result log of this session.
    pub log: ResultLog,
    /// Box colours per class id.
    pub palette: Palette,
    /// Caption font, `None` when captions are off or no font was found.
    pub font: Option<CaptionFont>,
}

impl AppContext {
    /// Build the context from `config`.
    ///
    /// Validates the configuration, resolves the log path and export
    /// directory, creates the export directory, binds the result log,
    /// reloads stored rows when `log.reload_on_start` is set and loads the
    /// caption font.
    pub fn init(config: Config) -> Result<Self> {
        validate_config(&config)?;

        let log_path = log_file_path(&config)?;
        let export_dir = export_dir(&config)?;
        debug!(
            "Log file: {}, export directory: {}",
            log_path.display(),
            export_dir.display()
        );

        std::fs::create_dir_all(&export_dir).map_err(|e| Error::OutputDirCreateFailed {
            path: export_dir.clone(),
            source: e,
        })?;

        let mut log = ResultLog::create(log_path)?
            .with_exporter(MediaExporter::new(export_dir, config.export.fps));

        if config.log.reload_on_start {
            let loaded = log.reload()?;
            info!("Restored {loaded} stored row(s)");
        }

        let palette = Palette::new(config.detection.classes.len());
        let font = load_caption_font(&config.annotate)?;

        Ok(Self {
            config,
            log,
            palette,
            font,
        })
    }

    /// Number of rows the table shows.
    pub fn display_limit(&self) -> usize {
        self.config.log.display_limit
    }
}

/// A configured font must load; without one, common system fonts are tried.
fn load_caption_font(config: &AnnotateConfig) -> Result<Option<CaptionFont>> {
    if !config.captions {
        return Ok(None);
    }
    if let Some(path) = &config.font {
        return CaptionFont::load(path, config.font_size).map(Some);
    }
    let font = CaptionFont::discover(config.font_size);
    match &font {
        Some(font) => debug!("Caption font: {}", font.path().display()),
        None => warn!("No caption font found, boxes are drawn without captions"),
    }
    Ok(font)
}
