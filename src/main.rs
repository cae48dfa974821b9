use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docwatch_cli::config::load_config;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::classify::{cmd_classify, ClassifyArgs};
use cli::info::cmd_info;
use cli::output::OutputFormat;
use cli::replay::{cmd_replay, ReplayArgs};
use cli::rules::cmd_rules;

#[derive(Parser)]
#[command(name = "docwatch")]
#[command(about = "Semantic edit telemetry for hosted document editors")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Enable debug mode
    #[arg(short, long)]
    debug: bool,

    /// Output format
    #[arg(short, long, default_value = "human")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded host trace and emit annotated events as JSON lines
    Replay(ReplayArgs),

    /// Print the active rule table
    Rules,

    /// Classify and annotate a single self-contained record
    Classify(ClassifyArgs),

    /// Show build and configuration details
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.debug)?;
    info!("Starting docwatch v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Replay(args) => cmd_replay(args, &config, cli.output).await,
        Commands::Rules => cmd_rules(&config, cli.output).await,
        Commands::Classify(args) => cmd_classify(args, &config, cli.output).await,
        Commands::Info => cmd_info(&config, cli.output).await,
    };

    if let Err(err) = &result {
        error!("Command failed: {:#}", err);
    }
    result
}

fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    // Events go to stdout, so diagnostics stay on stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
