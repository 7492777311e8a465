pub mod commands;

use clap::{Parser, Subcommand};
use pricecast_core::config::{LogFormat, LoggingConfig};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pricecast",
    about = "Pricecast demand forecasting and price optimization CLI",
    long_about = "Forecast next-month demand for every product in the catalog and write profit-maximizing price suggestions back to the product store.",
    after_help = "Examples:\n  pricecast forecast\n  pricecast optimize\n  pricecast doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Train on the catalog and write predicted_sales for the current month")]
    Forecast,
    #[command(about = "Train on the catalog and write suggested_price and pricing_reason")]
    Optimize,
    #[command(about = "Apply pending SQLite migrations to the product store")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog into a SQLite product store")]
    Seed,
    #[command(about = "Validate config, store connectivity, and product table columns")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Forecast => commands::forecast::run(),
        Command::Optimize => commands::optimize::run(),
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber. Log lines go to stderr so stdout carries
/// only the command outcome. `RUST_LOG` wins over the configured level.
/// A second call keeps the first subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| configured_filter(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Accepts a bare level or full filter directives; unparsable input means `info`.
fn configured_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level.trim()).unwrap_or_else(|_| EnvFilter::new("info"))
}
