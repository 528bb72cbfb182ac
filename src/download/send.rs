//! Delivery of a finished download to the chat.

use std::path::Path;

use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ReplyParameters};

use crate::download::error::DownloadError;
use crate::download::source::{DownloadOutput, MediaKind};
use crate::telegram::Bot;

/// Returns the file size, or `TooLarge` when it exceeds `limit`.
pub fn check_file_size(path: &Path, limit: u64) -> Result<u64, DownloadError> {
    let size = fs_err::metadata(path)
        .map_err(|e| DownloadError::FileNotFound(e.to_string()))?
        .len();

    if size > limit {
        return Err(DownloadError::TooLarge { size, limit });
    }
    Ok(size)
}

/// Uploads the file as audio or video, replying to `reply_to`.
pub async fn send_media(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    kind: MediaKind,
    output: &DownloadOutput,
) -> Result<Message, DownloadError> {
    let file = InputFile::file(output.file_path.clone());
    let reply = ReplyParameters::new(reply_to).allow_sending_without_reply();

    let result = match kind {
        MediaKind::Audio => {
            let mut request = bot.send_audio(chat_id, file).reply_parameters(reply);
            if let Some(title) = &output.title {
                request = request.title(title.clone());
            }
            request.await
        }
        MediaKind::Video => {
            let mut request = bot
                .send_video(chat_id, file)
                .reply_parameters(reply)
                .supports_streaming(true);
            if let Some(width) = output.width {
                request = request.width(width);
            }
            if let Some(height) = output.height {
                request = request.height(height);
            }
            request.await
        }
    };

    result.map_err(|e| DownloadError::SendFailed(format!("Failed to send {}: {}", kind, e)))
}
