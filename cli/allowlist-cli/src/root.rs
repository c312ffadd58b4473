use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use allowlist_cli::{abi, hex_encode, ProofBundle};

#[derive(Args, Debug)]
pub struct Cli {
    /// Proof bundle produced by `build`
    #[arg(short, long)]
    bundle: PathBuf,
}

pub fn run(cli: Cli) -> Result<()> {
    let bundle = ProofBundle::load(&cli.bundle)
        .with_context(|| format!("Failed to load proof bundle {:?}", cli.bundle))?;
    let root = bundle.root_hash()?;

    println!("Merkle Root: {}", bundle.root);
    println!("Addresses: {}", bundle.proofs.len());
    println!(
        "{} calldata: {}",
        abi::SET_MERKLE_ROOT_SIGNATURE,
        hex_encode(abi::encode_set_merkle_root(&root))
    );
    Ok(())
}
