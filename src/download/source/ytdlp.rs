//! yt-dlp download backend.
//!
//! Runs the yt-dlp binary as a child process. Metadata comes from
//! `--dump-single-json`; downloads report progress through a line-oriented
//! template that `download::downloader` parses.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::{DownloadOutput, DownloadRequest, DownloadSource, MediaInfo, MediaKind, SourceProgress};
use crate::core::config;
use crate::download::downloader::{done_template, parse_output_line, progress_template, OutputLine};
use crate::download::error::DownloadError;
use crate::download::files::find_actual_downloaded_file;
use crate::download::formats::parse_media_info;
use crate::download::ytdlp_errors::{analyze_ytdlp_error, summarize_stderr, YtDlpErrorType};

/// yt-dlp backed source.
#[derive(Debug, Clone)]
pub struct YtDlpSource {
    bin: String,
    download_timeout: Duration,
    metadata_timeout: Duration,
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self::new(config::YTDL_BIN.clone())
    }
}

impl YtDlpSource {
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            download_timeout: config::download::ytdlp_timeout(),
            metadata_timeout: config::download::metadata_timeout(),
        }
    }

    pub fn with_timeouts(mut self, download_timeout: Duration, metadata_timeout: Duration) -> Self {
        self.download_timeout = download_timeout;
        self.metadata_timeout = metadata_timeout;
        self
    }
}

/// Arguments for a metadata-only run.
pub fn build_info_args(url: &str) -> Vec<String> {
    vec![
        "--dump-single-json".to_string(),
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        url.to_string(),
    ]
}

/// Arguments for a download run.
pub fn build_download_args(request: &DownloadRequest) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        request.format_selector.clone(),
        "-o".to_string(),
        request.output_template(),
        "--max-filesize".to_string(),
        request.max_filesize.to_string(),
        "--no-playlist".to_string(),
        "--newline".to_string(),
        "--progress".to_string(),
        "--progress-template".to_string(),
        progress_template(),
        "--print".to_string(),
        done_template(),
    ];

    if request.kind == MediaKind::Audio {
        args.extend(["-x".to_string(), "--audio-format".to_string(), "mp3".to_string()]);
    }

    args.push(request.url.to_string());
    args
}

/// What the stdout/stderr readers learned from the output.
#[derive(Debug, Default)]
struct OutputState {
    finished: Option<(PathBuf, Option<u32>, Option<u32>)>,
    too_large: Option<(Option<u64>, Option<u64>)>,
    title: Option<String>,
}

impl OutputState {
    fn absorb(&mut self, line: &str, progress_tx: &mpsc::UnboundedSender<SourceProgress>) {
        match parse_output_line(line) {
            OutputLine::Progress(progress) => {
                if progress.title.is_some() {
                    self.title = progress.title.clone();
                }
                // Receiver gone means nobody is watching, not a failure
                let _ = progress_tx.send(progress);
            }
            OutputLine::Finished {
                file_path,
                width,
                height,
            } => self.finished = Some((file_path, width, height)),
            OutputLine::TooLarge { size, limit } => self.too_large = Some((size, limit)),
            OutputLine::Other => {}
        }
    }
}

/// Reads stderr, forwards progress lines and keeps the tail for error analysis.
async fn read_stderr<R>(stream: R, progress_tx: mpsc::UnboundedSender<SourceProgress>) -> (String, OutputState)
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::<String>::new();
    let mut state = OutputState::default();
    let mut lines = BufReader::new(stream).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        log::debug!("yt-dlp stderr: {}", line);
        state.absorb(&line, &progress_tx);
        tail.push_back(line);
        if tail.len() > config::download::STDERR_TAIL_LINES {
            tail.pop_front();
        }
    }

    (tail.make_contiguous().join("\n"), state)
}

#[async_trait]
impl DownloadSource for YtDlpSource {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn list_formats(&self, url: &str) -> Result<MediaInfo, DownloadError> {
        log::info!("Listing formats for {}", url);

        let run = Command::new(&self.bin)
            .args(build_info_args(url))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.metadata_timeout, run)
            .await
            .map_err(|_| {
                DownloadError::Timeout(format!(
                    "yt-dlp metadata fetch timed out after {}s",
                    self.metadata_timeout.as_secs()
                ))
            })?
            .map_err(|e| DownloadError::Process(format!("Failed to spawn {}: {}", self.bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let error_type = analyze_ytdlp_error(&stderr);
            log::warn!("yt-dlp metadata fetch failed ({}): {}", error_type, summarize_stderr(&stderr));
            return Err(DownloadError::YtDlp(format!("{}: {}", error_type, summarize_stderr(&stderr))));
        }

        parse_info_output(url, &output.stdout)
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        progress_tx: mpsc::UnboundedSender<SourceProgress>,
    ) -> Result<DownloadOutput, DownloadError> {
        fs_err::tokio::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| DownloadError::Process(e.to_string()))?;

        let args = build_download_args(request);
        log::info!("Starting yt-dlp download: {} {}", self.bin, args.join(" "));

        let mut child = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DownloadError::Process(format!("Failed to spawn {}: {}", self.bin, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Process("yt-dlp stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Process("yt-dlp stderr not captured".to_string()))?;

        let stderr_task = tokio::spawn(read_stderr(stderr, progress_tx.clone()));

        let run = async {
            let mut state = OutputState::default();
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                log::debug!("yt-dlp stdout: {}", line);
                state.absorb(&line, &progress_tx);
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, state))
        };

        let (status, mut state) = match timeout(self.download_timeout, run).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => return Err(DownloadError::Process(format!("yt-dlp process failed: {}", e))),
            Err(_) => {
                log::error!(
                    "yt-dlp process timed out after {}s, killing",
                    self.download_timeout.as_secs()
                );
                return Err(DownloadError::Timeout(format!(
                    "yt-dlp timed out after {}s",
                    self.download_timeout.as_secs()
                )));
            }
        };

        let (stderr_text, stderr_state) = stderr_task.await.unwrap_or_default();
        state.finished = state.finished.or(stderr_state.finished);
        state.too_large = state.too_large.or(stderr_state.too_large);
        state.title = state.title.or(stderr_state.title);

        if !status.success() {
            let error_type = analyze_ytdlp_error(&stderr_text);
            let summary = summarize_stderr(&stderr_text);
            log::error!("yt-dlp exited with {} ({}): {}", status, error_type, summary);
            if error_type == YtDlpErrorType::FileTooLarge {
                return Err(DownloadError::TooLarge {
                    size: 0,
                    limit: request.max_filesize,
                });
            }
            return Err(DownloadError::YtDlp(format!("{}: {}", error_type, summary)));
        }

        if let Some((size, limit)) = state.too_large {
            return Err(DownloadError::TooLarge {
                size: size.unwrap_or(0),
                limit: limit.unwrap_or(request.max_filesize),
            });
        }

        let (reported_path, width, height) = match state.finished {
            Some((path, width, height)) => (Some(path), width, height),
            None => (None, None, None),
        };

        let file_path = reported_path
            .filter(|path| path.is_file())
            .or_else(|| find_actual_downloaded_file(&request.output_dir, &request.stem))
            .ok_or_else(|| {
                DownloadError::FileNotFound(format!(
                    "no file for {} in {}",
                    request.stem,
                    request.output_dir.display()
                ))
            })?;

        log::info!("yt-dlp finished: {}", file_path.display());

        Ok(DownloadOutput {
            file_path,
            title: state.title,
            width,
            height,
        })
    }
}

/// Turns `--dump-single-json` stdout into [`MediaInfo`].
///
/// A document with an empty `formats` array is reported as `NoFormats`.
fn parse_info_output(url: &str, stdout: &[u8]) -> Result<MediaInfo, DownloadError> {
    let json: serde_json::Value = serde_json::from_slice(stdout)?;
    let info = parse_media_info(&json)?;
    if info.formats.is_empty() {
        return Err(DownloadError::NoFormats(url.to_string()));
    }
    log::debug!("yt-dlp reported {} formats for {}", info.formats.len(), url);
    Ok(info)
}
