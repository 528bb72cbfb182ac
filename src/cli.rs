use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "yt-courier")]
#[command(author, version, about = "Telegram bot that delivers YouTube audio and video", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot with long polling
    Run,

    /// List the formats the bot would offer for a link
    Formats {
        /// YouTube or YouTube Music URL
        url: String,
    },

    /// Download one format without Telegram
    Download {
        /// YouTube or YouTube Music URL
        url: String,

        /// Format id as shown by `formats`
        #[arg(short, long)]
        format: String,

        /// Extract audio to mp3 instead of merging with the best audio stream
        #[arg(long)]
        audio: bool,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Update yt-dlp to the latest version
    UpdateYtdlp {
        /// Only print the installed version
        #[arg(long)]
        check: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
