use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use allowlist_cli::{abi, hex_encode, load_allowlist, ProofBundle};

#[derive(Args, Debug)]
pub struct Cli {
    /// Input CSV: header line, then `address,maxAllowance` per line
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file for the root and proofs
    #[arg(short, long, default_value = "proofs.json")]
    output: PathBuf,
}

pub fn run(cli: Cli) -> Result<()> {
    info!("Reading allowlist from {:?}...", cli.input);
    let records = load_allowlist(&cli.input)
        .with_context(|| format!("Failed to load allowlist {:?}", cli.input))?;
    info!("Total records: {}", records.len());

    info!("Building Merkle tree...");
    let bundle = ProofBundle::build(&records).context("Failed to build Merkle commitment")?;

    bundle
        .write(&cli.output)
        .with_context(|| format!("Failed to write proofs to {:?}", cli.output))?;

    let root = bundle.root_hash()?;
    println!("Merkle Root: {}", bundle.root);
    println!(
        "setMerkleRoot calldata: {}",
        hex_encode(abi::encode_set_merkle_root(&root))
    );
    println!("Saved to {}", cli.output.display());

    Ok(())
}
