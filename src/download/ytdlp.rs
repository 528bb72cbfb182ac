//! yt-dlp binary maintenance: version check and self-update.

use tokio::process::Command;
use tokio::time::timeout;

use crate::core::config;
use crate::download::error::DownloadError;

/// Outcome of `yt-dlp -U`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate,
    Updated(String),
    /// Installed through pip or a package manager, which refuses self-update
    Unsupported(String),
    Other(String),
}

/// Returns the installed yt-dlp version string.
pub async fn ytdlp_version() -> Result<String, DownloadError> {
    let bin = &*config::YTDL_BIN;
    let output = timeout(config::download::update_timeout(), Command::new(bin).arg("--version").output())
        .await
        .map_err(|_| DownloadError::Timeout("yt-dlp --version timed out".to_string()))?
        .map_err(|e| DownloadError::Process(format!("Failed to get yt-dlp version: {}", e)))?;

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        return Err(DownloadError::Process(
            "yt-dlp is not installed or --version produced no output".to_string(),
        ));
    }

    Ok(version)
}

/// Logs the version; used at bot startup.
pub async fn log_ytdlp_version() {
    match ytdlp_version().await {
        Ok(version) => log::info!("yt-dlp version: {}", version),
        Err(e) => log::warn!("Failed to get yt-dlp version: {}. Downloads will fail until it is installed.", e),
    }
}

/// Prints the version for the `update-ytdlp --check` command.
pub async fn print_ytdlp_version() -> Result<(), DownloadError> {
    let version = ytdlp_version().await?;
    println!("yt-dlp version: {}", version);
    log::info!("yt-dlp version: {}", version);
    Ok(())
}

/// Interprets the output of `yt-dlp -U`.
pub fn classify_update_output(exit_code: Option<i32>, stdout: &str, stderr: &str) -> UpdateOutcome {
    let combined = format!("{}\n{}", stdout, stderr);
    let lower = combined.to_lowercase();

    if lower.contains("up to date") || lower.contains("up-to-date") {
        return UpdateOutcome::UpToDate;
    }
    // Exit code 100: installed with pip, self-update disabled
    if exit_code == Some(100) || lower.contains("use pip") || lower.contains("package manager") {
        return UpdateOutcome::Unsupported(combined.trim().to_string());
    }
    if lower.contains("updated yt-dlp") || lower.contains("updating to") {
        return UpdateOutcome::Updated(combined.trim().to_string());
    }
    UpdateOutcome::Other(combined.trim().to_string())
}

/// Runs `yt-dlp -U` with a timeout.
pub async fn update_ytdlp() -> Result<UpdateOutcome, DownloadError> {
    let bin = &*config::YTDL_BIN;
    log::info!("Checking for yt-dlp updates...");

    let output = timeout(config::download::update_timeout(), Command::new(bin).arg("-U").output())
        .await
        .map_err(|_| {
            DownloadError::Timeout(format!(
                "yt-dlp -U timed out after {}s",
                config::download::UPDATE_TIMEOUT_SECS
            ))
        })?
        .map_err(|e| DownloadError::Process(format!("Failed to run yt-dlp -U: {}", e)))?;

    let outcome = classify_update_output(
        output.status.code(),
        &String::from_utf8_lossy(&output.stdout),
        &String::from_utf8_lossy(&output.stderr),
    );

    match &outcome {
        UpdateOutcome::UpToDate => log::info!("yt-dlp is already up to date"),
        UpdateOutcome::Updated(text) => log::info!("yt-dlp updated successfully: {}", text),
        UpdateOutcome::Unsupported(text) => log::warn!("yt-dlp cannot update itself: {}", text),
        UpdateOutcome::Other(text) => log::info!("yt-dlp update check completed: {}", text),
    }

    Ok(outcome)
}
