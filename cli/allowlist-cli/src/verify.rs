use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

use allowlist_cli::ProofBundle;

#[derive(Args, Debug)]
pub struct Cli {
    /// Proof bundle produced by `build`
    #[arg(short, long)]
    bundle: PathBuf,

    /// Address to verify
    #[arg(short, long, conflicts_with = "all", required_unless_present = "all")]
    address: Option<String>,

    /// Verify every entry in the bundle
    #[arg(long)]
    all: bool,
}

pub fn run(cli: Cli) -> Result<()> {
    let bundle = ProofBundle::load(&cli.bundle)
        .with_context(|| format!("Failed to load proof bundle {:?}", cli.bundle))?;

    let addresses: Vec<String> = match cli.address {
        Some(address) => vec![address],
        None => bundle.proofs.keys().cloned().collect(),
    };

    for address in &addresses {
        let valid = bundle
            .verify_entry(address)
            .with_context(|| format!("Failed to verify {}", address))?;
        if !valid {
            warn!("Proof for {} does not reproduce root {}", address, bundle.root);
            anyhow::bail!("Invalid proof for {}", address);
        }
        println!("{}: valid", address);
    }

    info!("Verified {} proofs against {}", addresses.len(), bundle.root);
    Ok(())
}
