//! Recapitan - host entry point
//!
//! Runs the reflection commands against a vault directory, so a scheduler
//! (cron, a plugin timer) or a person can trigger them.

use anyhow::Context;
use clap::{Parser, Subcommand};
use recapitan_core::{
    build_ai_service, Command, CommandManager, FsVault, RecapitanError, Settings, SystemClock,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recapitan")]
#[command(about = "AI reflections on your journal notes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Vault directory containing the notes
    #[arg(long, env = "RECAPITAN_VAULT")]
    vault: PathBuf,

    /// Settings file (TOML, snake_case keys)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Reflect on the past week of daily notes
    Weekly,

    /// Reflect on a single note
    Analyze {
        /// Note path relative to the vault
        note: String,
    },
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Weekly => Command::WeeklyAnalysis,
            Commands::Analyze { note } => Command::AnalyzeNote { path: note },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Keep HTTP client internals quiet unless tracing
    let filter = EnvFilter::new(format!(
        "recapitan={level},recapitan_core={level},hyper=warn,reqwest=warn",
        level = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("Recapitan v{} starting...", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(note) => {
            println!("{}", note.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<PathBuf> {
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    debug!("Settings: {:?}", settings);

    let ai = build_ai_service(&settings)?;
    let vault = FsVault::new(&cli.vault);
    let root = vault.root().to_path_buf();

    let commands = CommandManager::new(&settings, Arc::new(vault), ai, Arc::new(SystemClock))?;
    let note = commands.execute(cli.command.into()).await?;

    Ok(root.join(&note.path))
}

/// Log the final error once, with its kind and cause chain
fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<RecapitanError>() {
        Some(e) => error!("{} [{}]", err, e.kind()),
        None => error!("{}", err),
    }

    for cause in err.chain().skip(1) {
        error!("Caused by: {}", cause);
    }
}
