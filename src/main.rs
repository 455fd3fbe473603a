use anyhow::Result;
use dotenvy::dotenv;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::{interval, sleep};

use yukla::cli::{Cli, Commands};
use yukla::core::logging::{init_logger, log_cookies_configuration};
use yukla::core::{config, platform};
use yukla::download::metadata::fetch_video_info;
use yukla::download::quality::quality_options;
use yukla::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Catch dispatcher panics so the retry loop can log them and reconnect
    // instead of the process dying
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

    // Load environment variables from .env if present
    let _ = dotenv();

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::Info { url }) => run_cli_info(&url).await,
    }
}

/// Prints extractor metadata and the derived quality menu for a URL
async fn run_cli_info(url: &str) -> Result<()> {
    let platform = platform::detect_platform(url).unwrap_or("Unknown");
    println!("URL: {}", url);
    println!("Platform: {}", platform);

    let metadata = fetch_video_info(url).await?;
    println!("Title: {}", metadata.title.as_deref().unwrap_or("?"));
    if let Some(duration) = metadata.duration {
        println!("Duration: {:.0}s", duration);
    }
    println!("Formats: {}", metadata.formats.len());

    let options = quality_options(&metadata);
    if options.is_empty() {
        println!("No quality options derivable");
        return Ok(());
    }

    println!("\nQuality options:");
    for opt in options {
        println!("  [{}] {}", opt.format_id, opt.button_text());
    }

    Ok(())
}

/// Runs the Telegram bot in long polling mode
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    log_cookies_configuration();

    let bot = create_bot()?;

    let bot_info = bot.get_me().await?;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    setup_bot_commands(&bot).await?;

    let deps = HandlerDeps::new();

    // Periodic sweep of expired pending selections
    let selections_cleanup = deps.selections.clone();
    tokio::spawn(async move {
        let mut interval = interval(config::selection::cleanup_interval());
        loop {
            interval.tick().await;
            selections_cleanup.cleanup().await;
        }
    });

    let handler = schema(deps);

    log::info!(
        "Ready to receive updates (max {} concurrent downloads)",
        config::download::max_concurrent_downloads()
    );

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    // Run the dispatcher with retry logic; panics inside the dispatcher
    // task surface through the JoinHandle
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

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
            Err(join_err) => {
                if join_err.is_panic() {
                    log::error!("Dispatcher panicked: {}", join_err);

                    if retry_count < max_retries {
                        retry_count += 1;
                        log::info!(
                            "Retrying dispatcher connection after panic (attempt {}/{})...",
                            retry_count,
                            max_retries
                        );
                        sleep(Duration::from_secs(config::retry::DISPATCHER_RETRY_DELAY_SECS)).await;
                    } else {
                        log::error!("Max retries reached after panic. Exiting...");
                        break;
                    }
                } else {
                    log::warn!("Dispatcher task was cancelled: {}", join_err);
                    break;
                }
            }
        }
    }

    Ok(())
}
