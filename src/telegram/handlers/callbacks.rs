//! Format button presses

use teloxide::prelude::*;

use super::types::{HandlerDeps, HandlerError};
use crate::download::pipeline::{download_and_send, DownloadJob};
use crate::telegram::callback::CallbackData;
use crate::telegram::Bot;

pub const ERROR_TEXT: &str = "Error while processing.";
pub const EXPIRED_TEXT: &str = "This link has expired, please send it again.";

/// Handle a press on one of the format buttons.
///
/// The download runs on its own task so the dispatcher keeps serving other chats.
pub async fn handle_format_callback(bot: Bot, q: CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(data) = q.data.as_deref().and_then(CallbackData::parse) else {
        log::warn!("Ignoring callback with unrecognised data: {:?}", q.data);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let Some(message) = q.regular_message() else {
        log::warn!("Callback {:?} has no accessible message", q.id);
        bot.answer_callback_query(q.id.clone()).text(ERROR_TEXT).await?;
        return Ok(());
    };

    let Some(url) = deps.url_cache.get(&data.url_id).await else {
        log::info!("Callback for expired link {} in chat {}", data.url_id, message.chat.id);
        bot.answer_callback_query(q.id.clone()).text(EXPIRED_TEXT).await?;
        return Ok(());
    };

    bot.answer_callback_query(q.id.clone()).text(data.ack_text()).await?;

    let job = DownloadJob {
        chat_id: message.chat.id,
        reply_to: message.id,
        url,
        format_id: data.format_id,
        kind: data.kind,
    };
    let source = deps.source.clone();
    let settings = deps.settings.clone();

    tokio::spawn(async move {
        let chat_id = job.chat_id;
        if let Err(e) = download_and_send(bot, source, settings, job).await {
            log::error!("Download task for chat {} failed [{}]: {}", chat_id, e.category(), e);
        }
    });

    Ok(())
}
