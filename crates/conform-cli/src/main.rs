//! Conform CLI
//!
//! Runs the conformance sequence against adapters found in the adapters
//! directory, or lists them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use conform_core::config::{Config, Directories};
use conform_core::handler::{HandlerAdapter, discover, resolve};
use conform_core::{Adapter, Tester, TesterOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Conform - conformance tests for search adapters
#[derive(Debug, Parser)]
#[command(name = "conform")]
#[command(about = "Check that search adapters behave correctly")]
#[command(version)]
#[command(after_help = "\
Examples:
  conform list                    List installed adapters
  conform test                    Test every installed adapter
  conform test mytracker          Test one adapter by id
  conform test ./my-adapter       Test an adapter directory
  conform test --download         Also fetch every result link
")]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the conformance sequence against adapters
    Test {
        /// Adapter ids or directories (default: every installed adapter)
        adapters: Vec<String>,

        /// Download every result link and check it can be read
        #[arg(long)]
        download: bool,

        /// Disable coloured status markers
        #[arg(long)]
        no_color: bool,

        /// Config file (default: ~/.config/conform/config.json)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Directory containing adapters (default: ~/.config/conform/adapters)
        #[arg(long, value_name = "DIR")]
        adapters_dir: Option<PathBuf>,
    },

    /// List installed adapters
    List {
        /// Directory containing adapters (default: ~/.config/conform/adapters)
        #[arg(long, value_name = "DIR")]
        adapters_dir: Option<PathBuf>,
    },
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose || cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("conform={default_level}")));

    if cfg!(debug_assertions) {
        let temp_dir = std::env::temp_dir();
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_filename = format!("conform-{timestamp}.log");
        let log_path = temp_dir.join(&log_filename);

        let file_appender = tracing_appender::rolling::never(&temp_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        std::mem::forget(guard);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true);

        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbose);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .with(filter)
            .init();

        debug!("Logging to: {} (and stderr)", log_path.display());
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbose);

        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(filter)
            .init();
    }
}

fn directories(config: Option<PathBuf>, adapters_dir: Option<PathBuf>) -> Result<Directories> {
    let mut dirs = Directories::new().context("Failed to locate config directory")?;
    if let Some(config) = config {
        dirs = dirs.with_config_file(config);
    }
    if let Some(adapters_dir) = adapters_dir {
        dirs = dirs.with_adapters(adapters_dir);
    }
    first_run_setup(&dirs)?;
    Ok(dirs)
}

/// Create the config and adapters directories, and a default config file
/// when there is none yet.
fn first_run_setup(dirs: &Directories) -> Result<()> {
    dirs.ensure_exists()
        .with_context(|| format!("Failed to create {}", dirs.adapters.display()))?;

    if !dirs.config_file.exists() {
        Config::default()
            .save(&dirs.config_file)
            .with_context(|| format!("Failed to write {}", dirs.config_file.display()))?;
        info!("Created default config at {}", dirs.config_file.display());
    }
    Ok(())
}

/// Adapters named on the command line, or every installed one
fn select_adapters(names: &[String], dir: &Path, config: &Config) -> Result<Vec<HandlerAdapter>> {
    if names.is_empty() {
        return discover(dir, config)
            .with_context(|| format!("Failed to read adapters from {}", dir.display()));
    }

    names
        .iter()
        .map(|name| {
            resolve(name, dir, config).with_context(|| format!("Failed to load adapter {name}"))
        })
        .collect()
}

fn tester_options(config: &Config, download: bool, no_color: bool) -> TesterOptions {
    let mut options = TesterOptions::from(&config.tester);
    options.download |= download;
    options.color = options.color && !no_color && std::io::stdout().is_terminal();
    options
}

async fn run_test(
    names: &[String],
    download: bool,
    no_color: bool,
    dirs: &Directories,
) -> Result<ExitCode> {
    let config = Config::load(&dirs.config_file)
        .with_context(|| format!("Failed to load {}", dirs.config_file.display()))?;

    let adapters = select_adapters(names, &dirs.adapters, &config)?;
    if adapters.is_empty() {
        println!("No adapters found in {}", dirs.adapters.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut tester = Tester::new(tester_options(&config, download, no_color));
    let mut failed = Vec::new();

    for adapter in &adapters {
        if tester.test(adapter).await.is_err() {
            failed.push(adapter.id().to_string());
        }
    }

    info!(
        "Tested {} adapters, {} failed",
        adapters.len(),
        failed.len()
    );

    if failed.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("\nFailed adapters: {}", failed.join(", "));
        Ok(ExitCode::FAILURE)
    }
}

fn run_list(dirs: &Directories) -> Result<ExitCode> {
    let config = Config::load(&dirs.config_file)
        .with_context(|| format!("Failed to load {}", dirs.config_file.display()))?;
    let adapters = discover(&dirs.adapters, &config)
        .with_context(|| format!("Failed to read adapters from {}", dirs.adapters.display()))?;

    if adapters.is_empty() {
        println!("No adapters found in {}", dirs.adapters.display());
        return Ok(ExitCode::SUCCESS);
    }

    println!("\nInstalled Adapters:\n");

    for adapter in &adapters {
        let info = adapter.info();
        let caps = adapter.capabilities();
        let modes: Vec<&str> = caps.search_modes.iter().map(|mode| mode.key.as_str()).collect();
        let categories: Vec<String> = caps.categories.iter().map(ToString::to_string).collect();

        print!("  {:<16} {}", info.id, info.link);
        if adapter.requires_login() {
            print!(" [login]");
        }
        println!();
        if !modes.is_empty() {
            println!("  {:<16} modes: {}", "", modes.join(", "));
        }
        if !categories.is_empty() {
            println!("  {:<16} categories: {}", "", categories.join(", "));
        }
    }

    println!();
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Test {
            adapters,
            download,
            no_color,
            config,
            adapters_dir,
        } => {
            let dirs = directories(config, adapters_dir)?;
            run_test(&adapters, download, no_color, &dirs).await
        }
        Commands::List { adapters_dir } => {
            let dirs = directories(None, adapters_dir)?;
            run_list(&dirs)
        }
    }
}
