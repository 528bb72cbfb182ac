//! Telegram bot integration and handlers

pub mod bot;
pub mod cache;
pub mod callback;
pub mod handlers;
pub mod keyboard;

pub use teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use cache::UrlCache;
pub use callback::CallbackData;
pub use handlers::{
    handle_format_callback, handle_link_message, handle_start_command, schema, HandlerDeps, HandlerError,
};
pub use keyboard::format_keyboard;
