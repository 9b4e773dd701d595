//! tigris CLI - Census Bureau geography downloads from the command line.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::cache::CacheAction;
use commands::fetch::FetchCommands;
use commands::geocode::GeocodeAction;

#[derive(Debug, Parser)]
#[command(name = "tigris", version, about = "Download US Census Bureau TIGER/Line and cartographic boundary files")]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download a Census geography as GeoJSON
    #[command(subcommand)]
    Fetch(FetchCommands),

    /// Manage the archive cache
    #[command(subcommand)]
    Cache(CacheAction),

    /// Geocode addresses and coordinates
    #[command(subcommand)]
    Geocode(GeocodeAction),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Fetch(command) => commands::fetch::run(command),
        Commands::Cache(action) => commands::cache::run(action),
        Commands::Geocode(action) => commands::geocode::run(action),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tigris={default},tigris_cli={default}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
