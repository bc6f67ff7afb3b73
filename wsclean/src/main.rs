// wsclean/src/main.rs
use std::{fs, process};

use clap::Parser;
use colored::Colorize;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, warn};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;
use wsclean_common::error::{Result as WscleanResult, WscleanError};
use wsclean_common::{CancelToken, Config};

mod cli;
use cli::CliArgs;

#[tokio::main]
async fn main() -> WscleanResult<()> {
    let cli_args = CliArgs::parse();

    let config = Config::load()
        .map_err(|e| WscleanError::Config(format!("Could not load config: {e}")))?;

    let level_filter = match cli_args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let max_log_level = level_filter.into_level().unwrap_or(tracing::Level::INFO);

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("WSCLEAN_LOG")
        .from_env_lossy();

    let log_dir = config.logs_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!(
            "{} Failed to create log directory {}: {}",
            "Error:".red().bold(),
            log_dir.display(),
            e
        );
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .without_time()
            .try_init();
    } else {
        let file_appender = tracing_appender::rolling::daily(&log_dir, "wsclean.log");
        let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);

        let stderr_writer = std::io::stderr.with_max_level(max_log_level);
        let file_writer = non_blocking_appender.with_max_level(max_log_level);

        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(stderr_writer.and(file_writer))
            .with_ansi(true)
            .without_time()
            .try_init();

        Box::leak(Box::new(guard)); // Keep guard alive

        debug!(
            "Writing logs to: {}/wsclean.log",
            log_dir.display()
        );
    }

    // One token spans the whole invocation; Ctrl-C requests cancellation
    // and the engine finishes recording the in-flight entry before exiting.
    let cancel = CancelToken::new();
    let ctrlc_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling after the current step");
            ctrlc_token.cancel();
        }
    });

    if let Err(e) = cli_args.command.run(&config, &cancel).await {
        error!("Command failed: {:#}", e);
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }

    debug!("Command completed successfully.");
    Ok(())
}
