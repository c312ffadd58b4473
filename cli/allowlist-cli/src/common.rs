use sha3::{Digest, Keccak256};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{AddressError, AllowlistError, Result};

/// A 32-byte Keccak256 digest.
pub type Hash = [u8; 32];

/// Parses an Ethereum address from a hex string.
///
/// # Arguments
/// * `addr_str` - The address string, with or without "0x" prefix, any case
///
/// # Returns
/// A 20-byte array representing the address
///
/// # Errors
/// Returns an error if the address is not 40 hex characters, contains invalid
/// hex, or is the zero address
pub fn parse_address(addr_str: &str) -> std::result::Result<[u8; 20], AddressError> {
    let trimmed = addr_str.trim();
    let cleaned = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if cleaned.len() != 40 {
        return Err(AddressError::Length(cleaned.len()));
    }
    let mut address = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut address)?;
    if address == [0u8; 20] {
        return Err(AddressError::Zero);
    }
    Ok(address)
}

/// Normalizes an address string to `0x` followed by 40 lowercase hex chars.
pub fn normalize_address(addr_str: &str) -> std::result::Result<String, AddressError> {
    parse_address(addr_str).map(hex_encode)
}

/// Computes the Keccak256 digest of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Combines two sibling hashes in byte-sorted order.
///
/// The smaller hash always goes first, so a verifier never needs to know
/// whether a sibling sat on the left or the right.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new()
        .chain_update(first)
        .chain_update(second)
        .finalize()
        .into()
}

/// Encodes bytes as a `0x`-prefixed lowercase hex string.
pub fn hex_encode<T: AsRef<[u8]>>(data: T) -> String {
    format!("0x{}", hex::encode(data))
}

/// Parses a `0x`-prefixed (or bare) 32-byte hex hash.
pub fn parse_hash(value: &str) -> Result<Hash> {
    let cleaned = value.trim().strip_prefix("0x").unwrap_or(value.trim());
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash)
        .map_err(|_| AllowlistError::InvalidHash(value.to_string()))?;
    Ok(hash)
}

/// Writes `content` to `path` through a temporary sibling file and a rename,
/// so readers never observe a partially written file.
pub fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        std::fs::rename(&temp_path, path)
    })();
    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    Ok(result?)
}
