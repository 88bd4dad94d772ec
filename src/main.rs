use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod commands;
mod config;
mod hook;
mod mannerism;
mod notify;
mod store;

use cli::{Cli, Commands};
use config::{Config, LogLevel};
use notify::{KEY_INIT, Localizer};

fn setup_logging(log_level: &LogLevel) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mannerisms")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("mannerisms.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(match log_level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        });
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Check { pattern, position, text } => {
            commands::check::run(&pattern, position, text.as_deref(), cli.verbose)
        }
        Commands::Hook { action } => commands::hook::run(action, &config),
        Commands::Rule { action } => commands::rule::run(action, &config),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Hook dispatch answers the host even when startup goes wrong
    let fail_open = matches!(cli.command, Commands::Hook { .. });

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = match Config::load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) if fail_open => {
            eprintln!("{} {:#}, using default configuration", "⚠".yellow(), e);
            Config::default()
        }
        Err(e) => return Err(e.wrap_err("Failed to load configuration")),
    };

    // Setup logging with log level from config (or RUST_LOG env var)
    if let Err(e) = setup_logging(&config.log_level) {
        if !fail_open {
            return Err(e.wrap_err("Failed to setup logging"));
        }
        eprintln!("{} {:#}, continuing without logging", "⚠".yellow(), e);
    }

    info!("{}", Localizer::with_overrides(&config.messages).localize(KEY_INIT));
    info!("Starting mannerisms with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
