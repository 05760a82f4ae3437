//! Grayzip CLI - unpack a ZIP of PNG images and convert every image to grayscale.
//!
//! # Usage
//!
//! ```bash
//! # Extract photos.zip into ./work/unzipped and write grayscale copies to ./gray
//! grayzip run photos.zip --extract-to ./work --output ./gray
//!
//! # Print a JSON summary of the run
//! grayzip run photos.zip --json
//!
//! # View configuration
//! grayzip config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Grayzip - unpack a ZIP of PNG images and convert them to grayscale.
#[derive(Parser, Debug)]
#[command(name = "grayzip")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract an archive and convert its images to grayscale
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match grayzip_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `grayzip config path`."
            );
            grayzip_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Grayzip v{}", grayzip_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config).await,
    }
}
