//! Logging initialization and startup diagnostics

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs cookies configuration at application startup
///
/// Cookies are optional; downloads from most platforms work without them,
/// so a missing file is only a warning.
pub fn log_cookies_configuration() {
    match *config::YTDLP_COOKIES {
        Some(ref cookies_path) => {
            if std::path::Path::new(cookies_path).exists() {
                log::info!("🍪 YTDLP_COOKIES: {} (will be passed to yt-dlp)", cookies_path);
            } else {
                log::warn!(
                    "🍪 YTDLP_COOKIES is set but the file does not exist: {}. \
                     Extraction will proceed without cookies.",
                    cookies_path
                );
            }
        }
        None => {
            log::info!("🍪 YTDLP_COOKIES not set, extraction runs unauthenticated");
        }
    }
}
