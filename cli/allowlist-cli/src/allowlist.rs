//! Allowlist CSV loading.
//!
//! The input is a header line followed by one `address,maxAllowance` record
//! per line. Any malformed line rejects the whole file.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::common::{keccak256, normalize_address, Hash};
use crate::error::{AllowlistError, Result};

/// One allowlisted address and the maximum quantity it may mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowlistRecord {
    /// `0x` followed by 40 lowercase hex chars.
    pub address: String,
    pub max_allowance: u64,
}

impl AllowlistRecord {
    /// Creates a record, normalizing the address to lowercase `0x` form.
    pub fn new(address: &str, max_allowance: u64) -> Result<Self> {
        let address = normalize_address(address).map_err(|source| AllowlistError::Address {
            address: address.to_string(),
            source,
        })?;
        Ok(Self {
            address,
            max_allowance,
        })
    }

    /// The exact byte string the contract hashes: lowercase address
    /// immediately followed by the decimal allowance.
    pub fn leaf_preimage(&self) -> String {
        format!("{}{}", self.address, self.max_allowance)
    }

    /// Keccak256 of [`Self::leaf_preimage`].
    pub fn leaf(&self) -> Hash {
        keccak256(self.leaf_preimage().as_bytes())
    }
}

/// Parses allowlist text into records, skipping the header and blank lines.
pub fn parse_allowlist(content: &str) -> Result<Vec<AllowlistRecord>> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut header_skipped = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_num = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !header_skipped {
            header_skipped = true;
            debug!("Skipping header: {}", trimmed);
            continue;
        }

        let record = parse_line(line_num, trimmed)?;
        if !seen.insert(record.address.clone()) {
            warn!(
                "line {}: duplicate address {}, later entry overrides earlier proof",
                line_num, record.address
            );
        }
        records.push(record);
    }

    Ok(records)
}

fn parse_line(line_num: usize, line: &str) -> Result<AllowlistRecord> {
    let malformed = || AllowlistError::MalformedLine {
        line: line_num,
        content: line.to_string(),
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [address, allowance] = fields.as_slice() else {
        return Err(malformed());
    };
    if address.is_empty() || allowance.is_empty() {
        return Err(malformed());
    }

    let address = normalize_address(address).map_err(|e| AllowlistError::InvalidAddress {
        line: line_num,
        address: address.to_string(),
        reason: e.to_string(),
    })?;
    let max_allowance = allowance
        .parse::<u64>()
        .map_err(|source| AllowlistError::InvalidAllowance {
            line: line_num,
            value: allowance.to_string(),
            source,
        })?;

    Ok(AllowlistRecord {
        address,
        max_allowance,
    })
}

/// Reads and parses an allowlist file.
pub fn load_allowlist(path: &Path) -> Result<Vec<AllowlistRecord>> {
    let content = std::fs::read_to_string(path)?;
    parse_allowlist(&content)
}
