//! Showcase CLI - compare page rendering strategies from the terminal.
//!
//! Commands:
//! - `showcase csr` - Mount the client-fetched page and report its metrics
//! - `showcase build` - Fetch once and write the build-time and static pages
//! - `showcase strategies` - List strategies and their cache policies
//! - `showcase init` - Write a default `showcase.toml`

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use showcase_observability::{init_logging, LogFormat};

use commands::{BuildArgs, CsrArgs, InitArgs, StrategiesArgs};

/// Showcase CLI - client-fetched vs build-time vs static rendering
#[derive(Parser)]
#[command(name = "showcase")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the client-fetched page and fetch its listing
    Csr(CsrArgs),

    /// Generate the build-time and static pages
    Build(BuildArgs),

    /// List rendering strategies
    Strategies(StrategiesArgs),

    /// Write a default configuration file
    Init(InitArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json { LogFormat::Json } else { LogFormat::Human };
    init_logging(format, cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Csr(args) => commands::csr::run(args, &ctx).await,
        Commands::Build(args) => commands::build::run(args, &ctx).await,
        Commands::Strategies(args) => commands::strategies::run(args, &ctx).await,
        Commands::Init(args) => commands::init::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
