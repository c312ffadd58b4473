#![forbid(unsafe_code)]
#![allow(unreachable_pub)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use allowlist_cli::Settings;

mod build_tree;
mod claim;
mod root;
mod verify;

#[derive(Parser, Debug)]
#[command(name = "allowlist")]
#[command(about = "Allowlist Merkle commitment tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (contract address, ABI, RPC endpoint, signing key)
    #[arg(long, default_value = "allowlist.config.json")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the Merkle root and per-address proofs from an allowlist CSV
    Build(build_tree::Cli),
    /// Check proofs in a bundle against its root
    Verify(verify::Cli),
    /// Prepare an allowlist mint request for one wallet
    Claim(claim::Cli),
    /// Print the root and setMerkleRoot calldata of a bundle
    Root(root::Cli),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::load_from(path)
        .with_context(|| format!("Failed to load settings from {:?}", path))?;
    settings.apply_env();
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build(args) => build_tree::run(args)?,
        Commands::Verify(args) => verify::run(args)?,
        Commands::Claim(args) => claim::run(args, load_settings(&cli.config)?)?,
        Commands::Root(args) => root::run(args)?,
    }

    Ok(())
}
