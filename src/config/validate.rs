//! Configuration validation.

use crate::config::Config;
use crate::error::{Error, Result};

/// Highest export frame rate accepted.
const MAX_FPS: u32 = 240;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_log(config)?;
    validate_export(config)?;
    validate_detection(config)?;
    validate_annotate(config)?;
    Ok(())
}

fn validate_log(config: &Config) -> Result<()> {
    if config.log.display_limit == 0 {
        return Err(Error::ConfigValidation {
            message: "log.display_limit must be at least 1".to_string(),
        });
    }

    if let Some(path) = &config.log.path
        && path.is_dir()
    {
        return Err(Error::ConfigValidation {
            message: format!("log.path points to a directory: {}", path.display()),
        });
    }

    Ok(())
}

fn validate_export(config: &Config) -> Result<()> {
    let fps = config.export.fps;
    if fps == 0 || fps > MAX_FPS {
        return Err(Error::ConfigValidation {
            message: format!("export.fps must be between 1 and {MAX_FPS}, got {fps}"),
        });
    }
    Ok(())
}

fn validate_detection(config: &Config) -> Result<()> {
    let detection = &config.detection;

    if !(0.0..=1.0).contains(&detection.min_confidence) {
        return Err(Error::ConfigValidation {
            message: format!(
                "detection.min_confidence must be between 0 and 1, got {}",
                detection.min_confidence
            ),
        });
    }

    if detection.frame_size == 0 {
        return Err(Error::ConfigValidation {
            message: "detection.frame_size must be at least 1".to_string(),
        });
    }

    if let Some(idx) = detection.classes.iter().position(|c| c.trim().is_empty()) {
        return Err(Error::ConfigValidation {
            message: format!("detection.classes[{idx}] is empty"),
        });
    }

    Ok(())
}

fn validate_annotate(config: &Config) -> Result<()> {
    let size = config.annotate.font_size;
    if !size.is_finite() || size <= 0.0 {
        return Err(Error::ConfigValidation {
            message: format!("annotate.font_size must be positive, got {size}"),
        });
    }
    Ok(())
}
