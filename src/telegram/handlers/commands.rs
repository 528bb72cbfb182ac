//! Command handler implementations (/start, /help)

use teloxide::prelude::*;
use teloxide::types::{LinkPreviewOptions, Message, ReplyParameters};

use super::types::HandlerError;
use crate::telegram::bot::WELCOME_TEXT;
use crate::telegram::Bot;

fn no_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

/// Handle /start and /help
pub async fn handle_start_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, WELCOME_TEXT)
        .reply_parameters(ReplyParameters::new(msg.id))
        .link_preview_options(no_link_preview())
        .await?;
    Ok(())
}
