use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use squiggles_core::{Config, JsonSettingsStore, Notifier, SettingsStore, ToggleEngine};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Hide or restore diagnostic squiggles by rewriting editor color overrides.
#[derive(Debug, Parser)]
#[command(name = "squiggles", version)]
struct Cli {
    /// Path to a squiggles config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Editor settings.json to operate on.
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hide the selected squiggles, or restore them if already hidden.
    Toggle,
    /// Show the status indicator for the current settings.
    Status,
}

/// Prints notifications to the terminal.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn transient(&mut self, message: &str, _ttl: Duration) {
        println!("{message}");
    }

    fn error(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading squiggles config")?;
    init_tracing(&config, cli.verbose);

    let settings = config
        .resolve_settings_path(cli.settings.as_deref())
        .context("could not determine the editor settings path; pass --settings")?;
    tracing::debug!(path = %settings.display(), "using editor settings");

    match cli.command {
        Command::Toggle => toggle(&settings),
        Command::Status => status(&settings),
    }
}

fn init_tracing(config: &Config, verbose: u8) {
    let fallback = match verbose {
        0 => config.log_filter().to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn toggle(settings: &Path) -> Result<ExitCode> {
    let mut engine = ToggleEngine::new(JsonSettingsStore::new(settings));
    match engine.invoke(&mut ConsoleNotifier) {
        Some(_) => {
            print_indicator(&engine);
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

fn status(settings: &Path) -> Result<ExitCode> {
    let mut engine = ToggleEngine::new(JsonSettingsStore::new(settings));
    let state = engine
        .refresh()
        .with_context(|| format!("reading {}", engine.store().path().display()))?;
    print_indicator(&engine);
    println!("state: {state}");
    Ok(ExitCode::SUCCESS)
}

fn print_indicator<S: SettingsStore>(engine: &ToggleEngine<S>) {
    let indicator = engine.indicator();
    println!("{} ({})", indicator.text(), indicator.tooltip());
}
