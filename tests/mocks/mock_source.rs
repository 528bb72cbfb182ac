//! Mock download source
//!
//! Writes a file of a configured size into the request's output directory
//! and emits progress events the way yt-dlp reports them.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use yt_courier::download::formats::FormatInfo;
use yt_courier::download::source::{DownloadOutput, DownloadRequest, DownloadSource, MediaInfo, SourceProgress};
use yt_courier::download::DownloadError;

/// Configuration for the mock source
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Size of the written file in bytes
    pub file_size: u64,
    /// Number of progress events before the file is complete
    pub progress_steps: u64,
    /// Title reported with progress and output
    pub title: Option<String>,
    /// Fail with a yt-dlp error carrying this message
    pub fail_with: Option<String>,
    /// Leave a `.part` file behind, as an interrupted yt-dlp run does
    pub leave_partial: bool,
    pub formats: Vec<FormatInfo>,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            file_size: 4_096,
            progress_steps: 4,
            title: Some("Test Video".to_string()),
            fail_with: None,
            leave_partial: false,
            formats: Vec::new(),
        }
    }
}

pub struct MockSource {
    config: MockSourceConfig,
    downloads: AtomicU64,
}

impl MockSource {
    pub fn new(config: MockSourceConfig) -> Self {
        Self {
            config,
            downloads: AtomicU64::new(0),
        }
    }

    pub fn download_count(&self) -> u64 {
        self.downloads.load(Ordering::SeqCst)
    }

    fn extension(request: &DownloadRequest) -> &'static str {
        match request.kind {
            yt_courier::download::MediaKind::Audio => "mp3",
            yt_courier::download::MediaKind::Video => "mp4",
        }
    }
}

#[async_trait]
impl DownloadSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_formats(&self, url: &str) -> Result<MediaInfo, DownloadError> {
        if let Some(message) = &self.config.fail_with {
            return Err(DownloadError::YtDlp(message.clone()));
        }
        if self.config.formats.is_empty() {
            return Err(DownloadError::NoFormats(url.to_string()));
        }
        Ok(MediaInfo {
            title: self.config.title.clone(),
            formats: self.config.formats.clone(),
        })
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        progress_tx: mpsc::UnboundedSender<SourceProgress>,
    ) -> Result<DownloadOutput, DownloadError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        fs_err::create_dir_all(&request.output_dir).map_err(|e| DownloadError::Process(e.to_string()))?;

        if self.config.leave_partial {
            let partial = request.output_dir.join(format!("{}.mp4.part", request.stem));
            fs_err::write(&partial, b"partial").map_err(|e| DownloadError::Process(e.to_string()))?;
        }

        let steps = self.config.progress_steps.max(1);
        for step in 1..=steps {
            let _ = progress_tx.send(SourceProgress {
                downloaded_bytes: Some(self.config.file_size * step / steps),
                total_bytes: Some(self.config.file_size),
                total_bytes_estimate: None,
                title: self.config.title.clone(),
            });
        }

        if let Some(message) = &self.config.fail_with {
            return Err(DownloadError::YtDlp(message.clone()));
        }

        let file_path = request
            .output_dir
            .join(format!("{}.{}", request.stem, Self::extension(request)));
        let size = usize::try_from(self.config.file_size).map_err(|e| DownloadError::Process(e.to_string()))?;
        fs_err::write(&file_path, vec![0u8; size]).map_err(|e| DownloadError::Process(e.to_string()))?;

        Ok(DownloadOutput {
            file_path,
            title: self.config.title.clone(),
            width: Some(1280),
            height: Some(720),
        })
    }
}
