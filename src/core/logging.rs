//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the effective configuration

use anyhow::Result;
use simplelog::*;
use std::fs::File;
use std::path::Path;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger is already installed
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

/// Logs the effective configuration at application startup
///
/// Warns when the output folder is missing (it is created on first download)
/// and when the token is absent.
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    log::info!("yt-dlp binary: {}", *config::YTDL_BIN);

    let output = config::OUTPUT_FOLDER.as_str();
    if Path::new(output).is_dir() {
        log::info!("✅ Output folder: {}", output);
    } else {
        log::warn!("⚠️  Output folder {} does not exist yet, it will be created", output);
    }

    log::info!(
        "Max file size: {} bytes ({}MB)",
        *config::MAX_FILESIZE,
        config::max_filesize_mb(*config::MAX_FILESIZE)
    );
    log::info!("Progress edit interval: {}s", config::PROGRESS_INTERVAL.as_secs());

    match config::BOT_API_URL.as_deref() {
        Some(url) => log::info!("Bot API: {}", url),
        None => log::info!("Bot API: api.telegram.org"),
    }

    if config::BOT_TOKEN.is_empty() {
        log::error!("❌ BOT_TOKEN / TELOXIDE_TOKEN is not set");
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
