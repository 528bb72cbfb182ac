use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tokio::time::sleep;

use yt_courier::cli::{Cli, Commands};
use yt_courier::core::config::{self, DownloadSettings};
use yt_courier::core::utils::{download_stem, format_bytes};
use yt_courier::core::validation::{require_scheme, validate_youtube_url};
use yt_courier::core::{init_logger, log_startup_configuration};
use yt_courier::download::files::cleanup_stem;
use yt_courier::download::pipeline::run_download;
use yt_courier::download::source::{DownloadRequest, DownloadSource, MediaKind, SourceProgress, YtDlpSource};
use yt_courier::download::ytdlp::{self, UpdateOutcome};
use yt_courier::download::build_format_options;
use yt_courier::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, UrlCache};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, bot creation) or a
/// CLI subcommand fails.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env before any config static is read
    let _ = dotenv();

    let cli = Cli::parse_args();

    // Log panics in spawned tasks and the dispatcher instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) => run_bot().await,
        Some(Commands::Formats { url }) => run_cli_formats(url).await,
        Some(Commands::Download {
            url,
            format,
            audio,
            output,
        }) => run_cli_download(url, format, audio, output).await,
        Some(Commands::UpdateYtdlp { check }) => run_ytdlp_update(check).await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot().await
        }
    }
}

/// Run the update-ytdlp command
async fn run_ytdlp_update(check: bool) -> Result<()> {
    if check {
        ytdlp::print_ytdlp_version().await?;
        return Ok(());
    }

    match ytdlp::update_ytdlp().await? {
        UpdateOutcome::UpToDate => println!("yt-dlp is up to date"),
        UpdateOutcome::Updated(text) => println!("✅ {}", text),
        UpdateOutcome::Unsupported(text) => {
            println!("⚠️ yt-dlp cannot update itself here, use the package manager it was installed with:");
            println!("{}", text);
        }
        UpdateOutcome::Other(text) => println!("{}", text),
    }
    Ok(())
}

/// Print the format options the bot would offer for `url`
async fn run_cli_formats(url: String) -> Result<()> {
    let link = validate_youtube_url(&url)?;
    let source = YtDlpSource::default();
    let info = source.list_formats(&link.normalized_url()).await?;
    let options = build_format_options(&info.formats);

    println!("{}", info.title.as_deref().unwrap_or(config::progress::FALLBACK_TITLE));
    if options.is_empty() {
        println!("No downloadable formats");
        return Ok(());
    }
    for option in options {
        println!("{:<24} {:>6}  {}", option.label, option.format_id, option.kind);
    }
    Ok(())
}

/// Download one format into a local directory, printing progress
async fn run_cli_download(url: String, format: String, audio: bool, output: Option<PathBuf>) -> Result<()> {
    let link = validate_youtube_url(&url)?;
    let url = require_scheme(&link.normalized_url())?;
    let kind = if audio { MediaKind::Audio } else { MediaKind::Video };

    let mut settings = DownloadSettings::from_env();
    settings.output_dir = output.unwrap_or_else(|| PathBuf::from("."));

    let stem = download_stem();
    let request = DownloadRequest::new(url, &format, kind, &settings, stem.clone());
    println!("⬇️  {} [{} {}] -> {}", link.text, kind, request.format_selector, settings.output_dir.display());

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<SourceProgress>();
    let printer = tokio::spawn(async move {
        let mut last_percent = None;
        while let Some(progress) = progress_rx.recv().await {
            let percent = progress.percent();
            if last_percent != Some(percent) {
                println!("{:>3}% {}", percent, format_bytes(progress.downloaded_bytes.unwrap_or(0)));
                last_percent = Some(percent);
            }
        }
    });

    let source = YtDlpSource::default();
    let result = run_download(&source, &request, progress_tx).await;
    let _ = printer.await;

    match result {
        Ok(output) => {
            let size = fs_err::metadata(&output.file_path)?.len();
            println!("✅ Saved {} ({})", output.file_path.display(), format_bytes(size));
            Ok(())
        }
        Err(e) => {
            let removed = cleanup_stem(&settings.output_dir, &stem);
            log::debug!("Removed {} partial files of {}", removed, stem);
            Err(e.into())
        }
    }
}

async fn run_bot() -> Result<()> {
    let bot_init_start = std::time::Instant::now();
    log::info!("Starting bot...");

    log_startup_configuration();
    ytdlp::log_ytdlp_version().await;

    let bot = create_bot()?;

    // Retry while a local Bot API server is still starting
    let bot_info = {
        let startup_max_retries = config::retry::STARTUP_MAX_RETRIES;
        let mut startup_retry = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    let err_str = e.to_string();
                    let is_retryable = err_str.contains("restart")
                        || err_str.contains("network")
                        || err_str.contains("connection")
                        || err_str.contains("timed out")
                        || err_str.contains("Connection refused");

                    startup_retry += 1;
                    if startup_retry >= startup_max_retries || !is_retryable {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to Bot API after {} retries: {}",
                            startup_retry,
                            e
                        ));
                    }

                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in {}s...",
                        startup_retry,
                        startup_max_retries,
                        err_str,
                        config::retry::STARTUP_RETRY_DELAY_SECS
                    );
                    sleep(config::retry::startup_delay()).await;
                }
            }
        }
    };
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    setup_bot_commands(&bot).await?;

    let url_cache = Arc::new(UrlCache::new(config::cache::url_ttl()));
    url_cache.clone().spawn_cleanup_task(config::cache::cleanup_interval());

    let source: Arc<dyn DownloadSource> = Arc::new(YtDlpSource::default());
    let deps = HandlerDeps::new(source, url_cache, DownloadSettings::from_env());
    let handler = schema(deps);

    log::info!("================================================");
    log::info!("🎉 Bot initialization complete in {:.2}s", bot_init_start.elapsed().as_secs_f64());
    log::info!("📡 Ready to receive updates!");
    log::info!("================================================");

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // A panicking dispatcher surfaces through the JoinHandle
        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);

                if retry_count < max_retries {
                    retry_count += 1;
                    log::info!(
                        "Retrying dispatcher after panic (attempt {}/{})...",
                        retry_count,
                        max_retries
                    );
                    exponential_backoff(retry_count).await;
                } else {
                    log::error!("Max retries reached after panic. Exiting...");
                    break;
                }
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                break;
            }
        }

        sleep(config::retry::dispatcher_delay()).await;
    }

    Ok(())
}

/// Exponential backoff delay for retries
async fn exponential_backoff(retry_count: u32) {
    sleep(backoff_delay(retry_count)).await;
}

fn backoff_delay(retry_count: u32) -> Duration {
    Duration::from_secs(config::retry::EXPONENTIAL_BACKOFF_BASE.pow(retry_count))
}
