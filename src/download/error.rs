use thiserror::Error;

/// Structured error type for download operations.
///
/// Every variant carries enough text for the log line; users only ever see
/// the generic size/unsupported notice.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// yt-dlp exited with a failure status
    #[error("{0}")]
    YtDlp(String),
    /// Expected file not found after the download finished
    #[error("{0}")]
    FileNotFound(String),
    /// Download or metadata fetch timed out
    #[error("{0}")]
    Timeout(String),
    /// File exceeds the configured upload cap
    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    /// The extractor returned no selectable renditions
    #[error("no downloadable formats for {0}")]
    NoFormats(String),
    /// Malformed extractor output
    #[error("{0}")]
    Parse(String),
    /// Process execution failure (spawn, pipes)
    #[error("{0}")]
    Process(String),
    /// Failed to send file via Telegram API
    #[error("{0}")]
    SendFailed(String),
}

impl DownloadError {
    /// Returns subcategory for log lines
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::YtDlp(_) => "ytdlp",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::TooLarge { .. } => "too_large",
            DownloadError::NoFormats(_) => "no_formats",
            DownloadError::Parse(_) => "parse",
            DownloadError::Process(_) => "process",
            DownloadError::SendFailed(_) => "send_failed",
        }
    }
}

impl From<serde_json::Error> for DownloadError {
    fn from(err: serde_json::Error) -> Self {
        DownloadError::Parse(format!("invalid yt-dlp JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_display() {
        let err = DownloadError::TooLarge {
            size: 60_000_000,
            limit: 50_000_000,
        };
        assert_eq!(err.to_string(), "file is 60000000 bytes, limit is 50000000 bytes");
        assert_eq!(err.subcategory(), "too_large");
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = DownloadError::from(json_err);
        assert_eq!(err.subcategory(), "parse");
        assert!(err.to_string().starts_with("invalid yt-dlp JSON"));
    }
}
