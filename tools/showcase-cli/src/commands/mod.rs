//! CLI command implementations.

pub mod build;
pub mod csr;
pub mod init;
pub mod strategies;

use clap::Args;

/// Arguments for the csr command.
#[derive(Args)]
pub struct CsrArgs {
    /// Number of products to request (overrides fetch.limit).
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Tear the page down if no result arrives within this many milliseconds.
    #[arg(long)]
    pub cancel_after_ms: Option<u64>,

    /// Request deadline in milliseconds (overrides fetch.timeout_ms).
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Write the rendered page to this file.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Serve this JSON file instead of calling the listing endpoint.
    #[arg(long)]
    pub fixture: Option<String>,
}

/// Arguments for the build command.
#[derive(Args)]
pub struct BuildArgs {
    /// Output directory (overrides build.out_dir).
    #[arg(short, long)]
    pub out: Option<String>,

    /// Revalidation window in seconds (overrides build.revalidate_secs).
    #[arg(long)]
    pub revalidate_secs: Option<u64>,

    /// Serve this JSON file instead of calling the build-time endpoint.
    #[arg(long)]
    pub fixture: Option<String>,
}

/// Arguments for the strategies command.
#[derive(Args)]
pub struct StrategiesArgs {
    /// Revalidation window in seconds used for the build-time policy.
    #[arg(long)]
    pub revalidate_secs: Option<u64>,
}

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Write showcase.json instead of showcase.toml.
    #[arg(long)]
    pub json_format: bool,

    /// Overwrite an existing config file.
    #[arg(short, long)]
    pub force: bool,
}
