//! Download source abstraction.
//!
//! The pipeline talks to the extractor through the `DownloadSource` trait so
//! the Telegram side never depends on how renditions are fetched. The only
//! production backend is `YtDlpSource`; tests plug in their own.

pub mod ytdlp;

use async_trait::async_trait;
use std::path::PathBuf;
use strum::{Display, EnumString};
use tokio::sync::mpsc;
use url::Url;

use crate::core::config::DownloadSettings;
use crate::download::error::DownloadError;
use crate::download::formats::FormatInfo;
use crate::download::progress::progress_percent;

pub use ytdlp::YtDlpSource;

/// What the user asked for: the audio track alone or a playable video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// yt-dlp `-f` selector for a chosen format id.
    ///
    /// Video formats are merged with the best audio track, falling back to the
    /// format alone when no separate audio stream exists.
    pub fn format_selector(self, format_id: &str) -> String {
        match self {
            MediaKind::Audio => format_id.to_string(),
            MediaKind::Video => format!("{id}+bestaudio/{id}", id = format_id),
        }
    }
}

/// Progress event emitted while yt-dlp is downloading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceProgress {
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    /// Used when the exact size is unknown (DASH fragments)
    pub total_bytes_estimate: Option<u64>,
    pub title: Option<String>,
}

impl SourceProgress {
    pub fn percent(&self) -> u64 {
        progress_percent(
            self.downloaded_bytes,
            self.total_bytes.or(self.total_bytes_estimate),
        )
    }
}

/// Request parameters for a download operation.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: Url,
    pub format_selector: String,
    pub kind: MediaKind,
    pub output_dir: PathBuf,
    /// File name prefix shared by every file this download creates
    pub stem: String,
    pub max_filesize: u64,
}

impl DownloadRequest {
    pub fn new(url: Url, format_id: &str, kind: MediaKind, settings: &DownloadSettings, stem: String) -> Self {
        Self {
            url,
            format_selector: kind.format_selector(format_id),
            kind,
            output_dir: settings.output_dir.clone(),
            stem,
            max_filesize: settings.max_filesize,
        }
    }

    /// yt-dlp `-o` template: `{output_dir}/{stem}.%(ext)s`
    pub fn output_template(&self) -> String {
        format!("{}/{}.%(ext)s", self.output_dir.display(), self.stem)
    }
}

/// Output from a successful download operation.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOutput {
    pub file_path: PathBuf,
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Metadata returned by a format listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub formats: Vec<FormatInfo>,
}

/// Trait for download source implementations.
#[async_trait]
pub trait DownloadSource: Send + Sync {
    /// Human-readable name of this source (e.g., "yt-dlp")
    fn name(&self) -> &str;

    /// Lists available renditions without downloading anything.
    async fn list_formats(&self, url: &str) -> Result<MediaInfo, DownloadError>;

    /// Execute the download, sending progress updates through the channel.
    async fn download(
        &self,
        request: &DownloadRequest,
        progress_tx: mpsc::UnboundedSender<SourceProgress>,
    ) -> Result<DownloadOutput, DownloadError>;
}
