mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{check, completions, import, orders, prefill, resolve, Context};
use crate::error::{exit_for, report_error};
use gatekeeper_config as config;
use gatekeeper_store::{paths, Access, Store};

#[derive(Debug, Parser)]
#[command(name = "gatekeeper", version, about = "Customer duplicate gate")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a new customer against the pipeline for duplicates
    Check(check::CheckArgs),
    /// Find the existing customer matching partial details
    Resolve(resolve::ResolveArgs),
    /// List the orders filed under a customer
    Orders(orders::OrdersArgs),
    /// Build a prefilled order form link
    #[command(name = "prefill-url")]
    PrefillUrl(prefill::PrefillUrlArgs),
    #[command(subcommand)]
    Import(import::ImportCommand),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

impl Command {
    /// Only imports write; everything else reads the last imported snapshot.
    fn access(&self) -> Access {
        match self {
            Command::Import(_) => Access::ReadWrite,
            _ => Access::Snapshot,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_for(&err).into()
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose: _,
        command,
    } = cli;

    // Completions never touch the config or the database.
    if let Command::Completions(args) = command {
        return completions::emit(args);
    }

    let app_config = load_config(config_path)?;
    let access = command.access();
    let db_path = paths::resolve_db_path(db_path, access)?;
    debug!(path = %db_path.display(), ?access, "database path resolved");

    let store = Store::open(&db_path, access)
        .with_context(|| format!("open database {}", db_path.display()))?;
    let ctx = Context {
        store: &store,
        json,
        config: &app_config,
    };

    match command {
        Command::Check(args) => check::check(&ctx, args),
        Command::Resolve(args) => resolve::resolve(&ctx, args),
        Command::Orders(args) => orders::orders(&ctx, args),
        Command::PrefillUrl(args) => prefill::prefill_url(&ctx, args),
        Command::Import(import::ImportCommand::Csv(args)) => import::import_csv(&ctx, args),
        Command::Completions(args) => completions::emit(args),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<config::AppConfig> {
    match config::resolve_config_path(path.clone()) {
        Ok(resolved) => debug!(
            path = %resolved.display(),
            exists = resolved.exists(),
            "config resolved"
        ),
        Err(err) => debug!(error = %err, "config unavailable"),
    }
    config::load(path).with_context(|| "load config")
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
