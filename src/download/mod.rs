//! Download management: yt-dlp backend, progress, delivery and cleanup

pub mod downloader;
pub mod error;
pub mod files;
pub mod formats;
pub mod pipeline;
pub mod progress;
pub mod send;
pub mod source;
pub mod ytdlp;
pub mod ytdlp_errors;

// Re-exports for convenience
pub use error::DownloadError;
pub use formats::{build_format_options, FormatInfo, FormatOption};
pub use pipeline::{download_and_send, DownloadJob};
pub use source::{DownloadOutput, DownloadRequest, DownloadSource, MediaInfo, MediaKind, SourceProgress, YtDlpSource};
