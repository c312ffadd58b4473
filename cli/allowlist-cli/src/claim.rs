use anyhow::{Context, Result};
use clap::Args;
use k256::ecdsa::SigningKey;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use zeroize::{Zeroize, Zeroizing};

use allowlist_cli::{
    hex_encode, keccak256, verify_proof, write_file_atomic, AllowlistRecord, ProofBundle, Settings,
};

#[derive(Args, Debug)]
pub struct Cli {
    /// Proof bundle produced by `build`
    #[arg(short, long)]
    bundle: PathBuf,

    /// Wallet address to mint for
    #[arg(short, long, conflicts_with = "private_key")]
    address: Option<String>,

    /// Private key of the minting wallet (hex, with or without 0x prefix).
    /// Use "-" to read it from stdin. Falls back to PRIVATE_KEY / settings.
    #[arg(short = 'k', long)]
    private_key: Option<String>,

    /// Number of tokens to mint
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    quantity: u64,

    /// Output JSON file for the mint request
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MintRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rpc_url: Option<String>,
    minter: String,
    quantity: u64,
    max_allowance: u64,
    merkle_root: String,
    proof: Vec<String>,
}

fn private_key_to_address(signing_key: &SigningKey) -> [u8; 20] {
    let public_key = signing_key.verifying_key();
    let encoded = public_key.to_encoded_point(false);
    let pub_bytes = encoded.as_bytes();
    let hash = keccak256(&pub_bytes[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    address
}

/// Parses a hex private key and derives the wallet address from it.
fn address_from_private_key(key_str: &str) -> Result<[u8; 20]> {
    let key_str = key_str.trim();
    let key_str = key_str.strip_prefix("0x").unwrap_or(key_str);
    if key_str.is_empty() {
        anyhow::bail!("Private key is empty");
    }
    let key_bytes = Zeroizing::new(hex::decode(key_str).context("Invalid private key format")?);
    if key_bytes.len() != 32 {
        anyhow::bail!(
            "Invalid private key length: expected 32 bytes, got {}",
            key_bytes.len()
        );
    }
    let signing_key = SigningKey::from_slice(&key_bytes).context("Invalid private key")?;
    Ok(private_key_to_address(&signing_key))
}

fn read_private_key_from_stdin() -> Result<Zeroizing<String>> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_line(&mut buffer)
        .context("Failed to read private key from stdin")?;
    let trimmed = Zeroizing::new(buffer.trim().to_string());
    buffer.zeroize();
    Ok(trimmed)
}

fn resolve_minter(cli: &Cli, settings: &Settings) -> Result<String> {
    if let Some(address) = &cli.address {
        return Ok(address.clone());
    }

    let key = match (&cli.private_key, &settings.private_key) {
        (Some(k), _) if k == "-" => read_private_key_from_stdin()?,
        (Some(k), _) => Zeroizing::new(k.clone()),
        (None, Some(k)) => Zeroizing::new(k.clone()),
        (None, None) => {
            anyhow::bail!("Provide --address, --private-key, or PRIVATE_KEY in settings")
        }
    };

    info!("Deriving address from private key...");
    Ok(hex_encode(address_from_private_key(&key)?))
}

pub fn run(cli: Cli, settings: Settings) -> Result<()> {
    info!("Loading proof bundle from {:?}...", cli.bundle);
    let bundle = ProofBundle::load(&cli.bundle)
        .with_context(|| format!("Failed to load proof bundle {:?}", cli.bundle))?;

    let minter = resolve_minter(&cli, &settings)?;

    info!("Looking up {} in allowlist...", minter);
    let (minter, entry) = bundle.lookup(&minter)?;
    if cli.quantity > entry.max_allowance {
        anyhow::bail!(
            "Quantity {} exceeds allowance {} for {}",
            cli.quantity,
            entry.max_allowance,
            minter
        );
    }

    info!("Verifying proof locally...");
    let record = AllowlistRecord::new(&minter, entry.max_allowance)?;
    if !verify_proof(&bundle.root_hash()?, &record.leaf(), &entry.proof_hashes()?) {
        anyhow::bail!("Proof for {} does not match root {}", minter, bundle.root);
    }

    let request = MintRequest {
        contract_address: settings.contract_address.clone(),
        rpc_url: settings.rpc_url.clone(),
        minter: minter.clone(),
        quantity: cli.quantity,
        max_allowance: entry.max_allowance,
        merkle_root: bundle.root.clone(),
        proof: entry.proof.clone(),
    };

    info!("Writing mint request to {:?}...", cli.output);
    let json_output =
        serde_json::to_string_pretty(&request).context("Failed to serialize mint request")?;
    write_file_atomic(&cli.output, &json_output).context("Failed to write mint request")?;

    println!("Minter: {}", minter);
    println!("Quantity: {} of {}", cli.quantity, entry.max_allowance);
    println!("Proof length: {} nodes", entry.proof.len());

    Ok(())
}
