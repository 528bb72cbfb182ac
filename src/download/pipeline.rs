//! Download orchestration: status message, yt-dlp run, upload, cleanup.

use std::sync::Arc;
use std::time::{Duration, Instant};

use teloxide::prelude::*;
use teloxide::types::{MessageId, ReplyParameters};
use tokio::sync::mpsc;

use crate::core::config::{self, DownloadSettings};
use crate::core::error::AppResult;
use crate::core::utils::download_stem;
use crate::core::validation::require_scheme;
use crate::download::error::DownloadError;
use crate::download::files::cleanup_stem;
use crate::download::progress::{throttle_event, DownloadStatus, ProgressMessage, ProgressThrottle};
use crate::download::send::{check_file_size, send_media};
use crate::download::source::{DownloadOutput, DownloadRequest, DownloadSource, MediaKind, SourceProgress};
use crate::telegram::Bot;

/// A download the user asked for by pressing a format button.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub chat_id: ChatId,
    /// Message the status and the file reply to
    pub reply_to: MessageId,
    pub url: String,
    pub format_id: String,
    pub kind: MediaKind,
}

/// Runs the source and checks the result against the size cap.
pub async fn run_download(
    source: &dyn DownloadSource,
    request: &DownloadRequest,
    progress_tx: mpsc::UnboundedSender<SourceProgress>,
) -> Result<DownloadOutput, DownloadError> {
    let output = source.download(request, progress_tx).await?;
    let size = check_file_size(&output.file_path, request.max_filesize)?;
    log::info!(
        "Downloaded {} ({} bytes) via {}",
        output.file_path.display(),
        size,
        source.name()
    );
    Ok(output)
}

/// Forwards throttled progress into the status message until the source
/// drops its sender.
async fn relay_progress(
    bot: Bot,
    status: ProgressMessage,
    mut progress_rx: mpsc::UnboundedReceiver<SourceProgress>,
    interval: Duration,
) {
    let mut throttle = ProgressThrottle::new(interval);
    let key = status.key();

    while let Some(progress) = progress_rx.recv().await {
        let Some(update) = throttle_event(&mut throttle, key, &progress, Instant::now()) else {
            continue;
        };
        if let Err(e) = status.update(&bot, &update).await {
            log::warn!("Failed to edit progress message {}: {}", key, e);
        }
    }

    throttle.forget(&key);
}

async fn fetch_and_deliver(
    bot: &Bot,
    source: &dyn DownloadSource,
    settings: &DownloadSettings,
    job: &DownloadJob,
    request: &DownloadRequest,
    status: ProgressMessage,
) -> Result<(), DownloadError> {
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let relay = tokio::spawn(relay_progress(
        bot.clone(),
        status,
        progress_rx,
        settings.progress_interval,
    ));

    let result = run_download(source, request, progress_tx).await;
    // A late progress edit must not overwrite the next status
    relay.abort();
    let output = result?;

    if let Err(e) = status.update(bot, &DownloadStatus::Sending).await {
        log::warn!("Failed to show sending status: {}", e);
    }

    send_media(bot, job.chat_id, job.reply_to, job.kind, &output).await?;

    if let Err(e) = status.delete(bot).await {
        log::warn!("Failed to delete status message: {}", e);
    }
    Ok(())
}

/// Downloads the chosen rendition and sends it to the chat.
///
/// Download and upload failures are reported by editing the status message;
/// only failures to post that message are returned. Temporary files are
/// removed whatever the outcome.
pub async fn download_and_send(
    bot: Bot,
    source: Arc<dyn DownloadSource>,
    settings: DownloadSettings,
    job: DownloadJob,
) -> AppResult<()> {
    let url = match require_scheme(&job.url) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("Refusing download for chat {}: {}", job.chat_id, e);
            bot.send_message(job.chat_id, "Invalid URL")
                .reply_parameters(ReplyParameters::new(job.reply_to))
                .await?;
            return Ok(());
        }
    };

    let status_msg = bot
        .send_message(job.chat_id, DownloadStatus::Starting.to_message())
        .reply_parameters(ReplyParameters::new(job.reply_to))
        .await?;
    let status = ProgressMessage::new(job.chat_id, status_msg.id);

    let stem = download_stem();
    let request = DownloadRequest::new(url, &job.format_id, job.kind, &settings, stem.clone());
    log::info!(
        "Download {} started for chat {}: {} format {} ({})",
        stem,
        job.chat_id,
        job.url,
        request.format_selector,
        job.kind
    );

    match fetch_and_deliver(&bot, source.as_ref(), &settings, &job, &request, status).await {
        Ok(()) => log::info!("Download {} delivered to chat {}", stem, job.chat_id),
        Err(e) => {
            log::error!("Download {} failed [{}]: {}", stem, e.subcategory(), e);
            let notice = DownloadStatus::Failed {
                limit_mb: config::max_filesize_mb(settings.max_filesize),
            };
            if let Err(edit_err) = status.update(&bot, &notice).await {
                log::warn!("Failed to show error notice: {}", edit_err);
            }
        }
    }

    cleanup_stem(&request.output_dir, &stem);
    Ok(())
}
