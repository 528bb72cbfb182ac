use thiserror::Error;

use crate::core::validation::ValidationError;
use crate::download::error::DownloadError;

/// Centralized error types for the application
///
/// Errors from the download pipeline, the Telegram client and the
/// filesystem are converted to this enum so handlers can log them uniformly.
///
/// # Example
///
/// ```no_run
/// use yt_courier::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Download/yt-dlp errors
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// yt-dlp JSON output errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Short category name used in log lines
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Telegram(_) => "telegram",
            AppError::Download(e) => e.subcategory(),
            AppError::Io(_) => "io",
            AppError::Url(_) => "url",
            AppError::Json(_) => "json",
            AppError::Validation(_) => "validation",
            AppError::Anyhow(_) => "other",
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_category_passes_through() {
        let err = AppError::from(DownloadError::Timeout("yt-dlp timed out".to_string()));
        assert_eq!(err.category(), "timeout");
        assert_eq!(err.to_string(), "Download error: yt-dlp timed out");
    }

    #[test]
    fn test_io_error_conversion() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.category(), "io");
    }
}
