use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;
use trsu::app::{Overrides, run_chunks, run_summarize, spawn_interrupt_watcher};
use trsu::cli::{Cli, Commands};
use trsu::config::Config;
use trsu::defaults::LOG_TAG;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv();
    init_tracing(cli.quiet, cli.verbose)?;

    let span = tracing::info_span!(LOG_TAG);
    let result = run(cli).instrument(span).await;
    if let Err(e) = &result {
        eprintln!("{}", format!("Error: {e:#}").red());
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        model: cli.model.clone(),
        token_limit: cli.token_limit,
        poll_interval: cli.poll_interval,
        timeout: cli.timeout,
    };

    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "trsu", &mut std::io::stdout());
        }
        Some(Commands::Chunks { file }) => {
            let config = load_config(cli.config.as_deref(), &overrides)?;
            run_chunks(config, &file).await?;
        }
        None => {
            let file = cli
                .file
                .context("missing input file (usage: trsu <FILE>)")?;
            let config = load_config(cli.config.as_deref(), &overrides)?;

            let cancel = CancellationToken::new();
            spawn_ctrl_c_handler(cancel.clone());

            let outcome = run_summarize(config, &file, cli.quiet, cancel).await?;
            tracing::debug!(
                run = %outcome.summary.run_id,
                chunks = outcome.chunks,
                polls = outcome.summary.polls,
                "done"
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/trsu/config.toml)
/// 3. Built-in defaults
///
/// Environment variable overrides apply on top, then command-line flags.
fn load_config(custom_path: Option<&Path>, overrides: &Overrides) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)?,
            None => Config::default(),
        },
    };

    let mut config = config.with_env_overrides()?;
    overrides.apply(&mut config);
    Ok(config)
}

/// Load a `.env` file from the working directory, if there is one.
fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("Warning: failed to load .env file: {err}");
    }
}

/// Log to stderr at a level picked from `-q`/`-v`, unless `RUST_LOG` is set.
fn init_tracing(quiet: bool, verbosity: u8) -> Result<()> {
    let level = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))
}

/// Cancel `token` on the first Ctrl-C and exit on the second.
fn spawn_ctrl_c_handler(token: CancellationToken) {
    let watcher = spawn_interrupt_watcher(token, tokio::signal::ctrl_c);
    tokio::spawn(async move {
        if let Ok(true) = watcher.await {
            std::process::exit(130);
        }
    });
}
