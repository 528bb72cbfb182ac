//! yt-courier - Telegram bot that delivers YouTube and YouTube Music media
//!
//! A user sends a link, picks one of the offered audio or video formats and
//! receives the file, with a status message that tracks the download.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, link validation and utilities
//! - `download`: yt-dlp backend, format listing, progress, delivery and cleanup
//! - `telegram`: Bot setup, callback encoding, keyboards and handlers
//! - `cli`: Command line interface

pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use download::{download_and_send, DownloadSource, YtDlpSource};
pub use telegram::{create_bot, schema, HandlerDeps};
