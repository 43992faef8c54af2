//! Command line entry point: translates every source file of a workspace.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use token_i18n::config::{
    ConfigError,
    ConfigManager,
    MatcherError,
    Policy,
    TranslatorSettings,
    ValidationError,
    find_workspace_root,
};
use token_i18n::dictionary::{
    DictionaryStore,
    LoadError,
};
use token_i18n::pipeline::{
    FsSink,
    Pipeline,
    RunReport,
    discover_sources,
};
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Renders one translated copy of each source file per language")]
struct Cli {
    /// Workspace containing `.token-i18n.json` (defaults to the nearest one above the current directory)
    workspace: Option<PathBuf>,

    /// Translate without writing any output
    #[arg(long)]
    dry_run: bool,

    /// Log every missing key and debug progress
    #[arg(short, long)]
    verbose: bool,
}

/// Failures that stop the whole run.
#[derive(Error, Debug)]
enum CliError {
    /// The current directory is unavailable
    #[error("Failed to determine the workspace: {0}")]
    Workspace(#[source] std::io::Error),
    /// Settings file unreadable or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Delimiter settings rejected
    #[error("{0}")]
    Delimiter(#[from] ValidationError),
    /// Dictionaries could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Source patterns invalid
    #[error(transparent)]
    Matcher(#[from] MatcherError),
}

/// Exits with failure when any file failed or the run could not start.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = load_settings(&cli);
    let verbose = cli.verbose || settings.as_ref().is_ok_and(|settings| settings.verbose);
    init_logging(verbose);

    match settings.and_then(|settings| run(&settings)) {
        Ok(report) if report.has_failures() => {
            tracing::error!(failures = report.failures().count(), "Finished with errors");
            ExitCode::FAILURE
        }
        Ok(report) => {
            tracing::info!(outputs = report.emitted().count(), "Finished");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr subscriber; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Reads the workspace settings and resolves every configured path against it.
fn load_settings(cli: &Cli) -> Result<TranslatorSettings, CliError> {
    let workspace = match &cli.workspace {
        Some(workspace) => workspace.clone(),
        None => {
            let current_dir = std::env::current_dir().map_err(CliError::Workspace)?;
            find_workspace_root(&current_dir).unwrap_or(current_dir)
        }
    };

    let mut manager = ConfigManager::new();
    manager.load_settings(Some(workspace))?;

    let mut settings = manager.resolved_settings();
    settings.verbose |= cli.verbose;
    if cli.dry_run {
        settings.dry_run = Policy::Always;
    }

    Ok(settings)
}

/// Loads dictionaries, discovers sources and writes every output.
fn run(settings: &TranslatorSettings) -> Result<RunReport, CliError> {
    let dictionaries = DictionaryStore::new().load(&settings.locales, settings.cache)?;
    tracing::info!(
        languages = ?dictionaries.languages().collect::<Vec<_>>(),
        "Loaded dictionaries from {}",
        settings.locales.display()
    );

    let sources = discover_sources(settings, &settings.source_root)?;
    tracing::info!(files = sources.len(), "Translating {}", settings.source_root.display());

    let mut pipeline = Pipeline::new(settings, dictionaries, FsSink)?;
    Ok(pipeline.run(&sources))
}
