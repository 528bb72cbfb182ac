//! Telegram bot handler tree configuration
//!
//! The handlers are organized so that integration tests can build the same
//! handler tree as production code.

mod callbacks;
mod commands;
mod links;
mod schema;
mod types;

pub use callbacks::{handle_format_callback, ERROR_TEXT, EXPIRED_TEXT};
pub use commands::handle_start_command;
pub use links::{
    handle_link_message, FETCHING_TEXT, FETCH_FAILED_TEXT, INVALID_LINK_TEXT, MUSIC_NOTICE_TEXT, SELECT_TEXT,
};
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
