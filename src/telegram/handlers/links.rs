//! Text messages: link validation and the format keyboard

use teloxide::prelude::*;
use teloxide::types::{Message, ReplyParameters};

use super::types::{HandlerDeps, HandlerError};
use crate::core::validation::validate_youtube_url;
use crate::download::formats::build_format_options;
use crate::telegram::keyboard::{format_keyboard, keyboard_stats};
use crate::telegram::Bot;

pub const INVALID_LINK_TEXT: &str = "Please send a valid YouTube or YouTube Music URL.";
pub const MUSIC_NOTICE_TEXT: &str =
    "🎶 YouTube Music link detected — showing available audio & video formats...";
pub const FETCHING_TEXT: &str = "Fetching available formats...";
pub const SELECT_TEXT: &str = "Select format:";
pub const FETCH_FAILED_TEXT: &str = "❌ Failed to fetch formats.";

/// Handle a plain text message
pub async fn handle_link_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let reply_to = ReplyParameters::new(msg.id);
    let text = msg.text().unwrap_or_default();

    let link = match validate_youtube_url(text) {
        Ok(link) => link,
        Err(e) => {
            log::debug!("Rejected message from chat {}: {}", chat_id, e);
            bot.send_message(chat_id, INVALID_LINK_TEXT)
                .reply_parameters(reply_to)
                .await?;
            return Ok(());
        }
    };

    if link.is_music {
        bot.send_message(chat_id, MUSIC_NOTICE_TEXT)
            .reply_parameters(reply_to.clone())
            .await?;
    }

    let status = bot
        .send_message(chat_id, FETCHING_TEXT)
        .reply_parameters(reply_to)
        .await?;
    let url = link.normalized_url();
    log::info!("Listing formats of {} (video {}) for chat {}", url, link.video_id, chat_id);

    let options = match deps.source.list_formats(&url).await {
        Ok(info) => build_format_options(&info.formats),
        Err(e) => {
            log::error!("Failed to fetch formats for {} [{}]: {}", url, e.subcategory(), e);
            Vec::new()
        }
    };

    if options.is_empty() {
        bot.edit_message_text(chat_id, status.id, FETCH_FAILED_TEXT).await?;
        return Ok(());
    }

    let url_id = deps.url_cache.store(&url).await;
    let keyboard = format_keyboard(&options, &url_id);
    let (rows, buttons) = keyboard_stats(&keyboard);
    if buttons == 0 {
        bot.edit_message_text(chat_id, status.id, FETCH_FAILED_TEXT).await?;
        return Ok(());
    }
    log::info!("Offering {} formats in {} rows to chat {}", buttons, rows, chat_id);

    bot.edit_message_text(chat_id, status.id, SELECT_TEXT)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}
