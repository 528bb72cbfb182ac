use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration constants for the bot
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Folder for temporary downloads
/// Read from OUTPUT_FOLDER environment variable
/// Supports tilde (~) expansion for home directory
pub static OUTPUT_FOLDER: Lazy<String> = Lazy::new(|| {
    let raw = env::var("OUTPUT_FOLDER").unwrap_or_else(|_| "~/downloads/yt-courier".to_string());
    shellexpand::tilde(&raw).into_owned()
});

/// Maximum file size in bytes, passed to yt-dlp and checked before upload
/// Read from MAX_FILESIZE environment variable
/// Default: 50 MB (Telegram cloud Bot API upload limit)
pub static MAX_FILESIZE: Lazy<u64> = Lazy::new(|| parse_max_filesize(env::var("MAX_FILESIZE").ok().as_deref()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: yt-courier.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "yt-courier.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Custom Bot API server (for example a local telegram-bot-api instance)
pub static BOT_API_URL: Lazy<Option<String>> =
    Lazy::new(|| env::var("BOT_API_URL").ok().filter(|url| !url.trim().is_empty()));

/// Minimum gap between two progress edits of the same status message
/// Read from PROGRESS_INTERVAL_SECS environment variable
pub static PROGRESS_INTERVAL: Lazy<Duration> = Lazy::new(|| {
    let secs = env::var("PROGRESS_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(progress::DEFAULT_INTERVAL_SECS);
    Duration::from_secs(secs)
});

/// Parses a byte count, falling back to the default on missing, zero or garbage input.
pub fn parse_max_filesize(raw: Option<&str>) -> u64 {
    raw.map(|s| s.trim().replace('_', ""))
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|bytes| *bytes > 0)
        .unwrap_or(download::DEFAULT_MAX_FILESIZE)
}

/// Size limit shown to users, in decimal megabytes.
pub fn max_filesize_mb(bytes: u64) -> u64 {
    (bytes as f64 / 1_000_000.0).round() as u64
}

/// Settings one download session runs with.
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub output_dir: PathBuf,
    pub max_filesize: u64,
    pub progress_interval: Duration,
}

impl DownloadSettings {
    pub fn from_env() -> Self {
        Self {
            output_dir: PathBuf::from(OUTPUT_FOLDER.as_str()),
            max_filesize: *MAX_FILESIZE,
            progress_interval: *PROGRESS_INTERVAL,
        }
    }
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Default upload cap in bytes
    pub const DEFAULT_MAX_FILESIZE: u64 = 50_000_000;

    /// Timeout for a full yt-dlp download run (in seconds)
    pub const YTDLP_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Timeout for metadata-only yt-dlp runs (in seconds)
    pub const METADATA_TIMEOUT_SECS: u64 = 90;

    /// Timeout for `yt-dlp -U` (in seconds)
    pub const UPDATE_TIMEOUT_SECS: u64 = 30;

    /// Number of stderr lines kept for error analysis
    pub const STDERR_TAIL_LINES: usize = 200;

    /// yt-dlp download timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(YTDLP_TIMEOUT_SECS)
    }

    /// yt-dlp metadata timeout duration
    pub fn metadata_timeout() -> Duration {
        Duration::from_secs(METADATA_TIMEOUT_SECS)
    }

    /// yt-dlp self-update timeout duration
    pub fn update_timeout() -> Duration {
        Duration::from_secs(UPDATE_TIMEOUT_SECS)
    }
}

/// Progress reporting configuration
pub mod progress {
    /// Telegram tolerates roughly one edit per message every few seconds
    pub const DEFAULT_INTERVAL_SECS: u64 = 5;

    /// Title used when the extractor reports none
    pub const FALLBACK_TITLE: &str = "video";
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }

    /// Base for exponential backoff calculation
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

    /// Attempts to reach the Bot API at startup
    pub const STARTUP_MAX_RETRIES: u32 = 60;

    /// Delay between startup attempts (in seconds)
    pub const STARTUP_RETRY_DELAY_SECS: u64 = 5;

    /// Startup retry delay duration
    pub fn startup_delay() -> Duration {
        Duration::from_secs(STARTUP_RETRY_DELAY_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests (in seconds)
    /// Uploads of large videos go through the same client
    pub const REQUEST_TIMEOUT_SECS: u64 = 600; // 10 minutes

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Callback URL cache configuration
pub mod cache {
    use super::Duration;

    /// How long a format keyboard stays usable (in seconds)
    pub const URL_TTL_SECS: u64 = 3600;

    /// Interval between sweeps of expired entries (in seconds)
    pub const CLEANUP_INTERVAL_SECS: u64 = 600;

    pub fn url_ttl() -> Duration {
        Duration::from_secs(URL_TTL_SECS)
    }

    pub fn cleanup_interval() -> Duration {
        Duration::from_secs(CLEANUP_INTERVAL_SECS)
    }
}

/// Telegram protocol limits
pub mod telegram {
    /// Hard limit on inline button callback data, in bytes
    pub const CALLBACK_DATA_MAX_LEN: usize = 64;

    /// Buttons per keyboard row
    pub const KEYBOARD_ROW_WIDTH: usize = 2;
}
