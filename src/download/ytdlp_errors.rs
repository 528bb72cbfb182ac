//! Classification of yt-dlp failures from its stderr output.

use std::fmt;

/// Kinds of yt-dlp errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// YouTube asked to sign in or blocked the request
    BotDetection,
    /// Video is private, removed or region-locked
    VideoUnavailable,
    /// Selected format id no longer offered, or URL not supported
    Unsupported,
    /// File exceeds --max-filesize
    FileTooLarge,
    /// Timeouts, DNS, refused connections
    NetworkError,
    Unknown,
}

impl fmt::Display for YtDlpErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            YtDlpErrorType::BotDetection => "bot detection",
            YtDlpErrorType::VideoUnavailable => "video unavailable",
            YtDlpErrorType::Unsupported => "unsupported",
            YtDlpErrorType::FileTooLarge => "file too large",
            YtDlpErrorType::NetworkError => "network error",
            YtDlpErrorType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Analyzes yt-dlp stderr and picks the error type
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    let stderr_lower = stderr.to_lowercase();

    if stderr_lower.contains("larger than max-filesize") {
        return YtDlpErrorType::FileTooLarge;
    }

    if stderr_lower.contains("sign in to confirm you're not a bot")
        || stderr_lower.contains("please sign in")
        || stderr_lower.contains("http error 403")
        || stderr_lower.contains("http error 429")
    {
        return YtDlpErrorType::BotDetection;
    }

    if stderr_lower.contains("private video")
        || stderr_lower.contains("video unavailable")
        || stderr_lower.contains("this video is not available")
        || stderr_lower.contains("video has been removed")
        || stderr_lower.contains("not available in your country")
    {
        return YtDlpErrorType::VideoUnavailable;
    }

    if stderr_lower.contains("requested format is not available") || stderr_lower.contains("unsupported url") {
        return YtDlpErrorType::Unsupported;
    }

    if stderr_lower.contains("timed out")
        || stderr_lower.contains("connection")
        || stderr_lower.contains("network")
        || stderr_lower.contains("name resolution")
        || stderr_lower.contains("failed to connect")
    {
        return YtDlpErrorType::NetworkError;
    }

    YtDlpErrorType::Unknown
}

/// Last `ERROR:` line of the output, or the last non-empty line.
pub fn summarize_stderr(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| "yt-dlp produced no error output".to_string())
}
