//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::callbacks::{handle_format_callback, ERROR_TEXT};
use super::commands::handle_start_command;
use super::links::handle_link_message;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are tried first, then any other text message, then button presses.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps.clone()))
        .branch(callback_handler(deps))
}

fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
            match cmd {
                Command::Start | Command::Help => handle_start_command(&bot, &msg).await,
            }
        },
    ))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_link_message(&bot, &msg, &deps).await {
                    log::error!("Message handler failed for chat {}: {}", msg.chat.id, e);
                    return Err(e);
                }
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let query_id = q.id.clone();
            if let Err(e) = handle_format_callback(bot.clone(), q, &deps).await {
                log::error!("Callback handler failed: {}", e);
                if let Err(answer_err) = bot.answer_callback_query(query_id).text(ERROR_TEXT).await {
                    log::debug!("Could not answer failed callback: {}", answer_err);
                }
            }
            Ok(())
        }
    })
}
