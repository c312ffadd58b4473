//! Proof bundle export.
//!
//! A [`ProofBundle`] is the only artifact handed to the minting frontend:
//!
//! ```json
//! {
//!   "root": "0x…",
//!   "proofs": {
//!     "0xabc…": { "maxAllowance": 2, "proof": ["0x…", "0x…"] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::allowlist::AllowlistRecord;
use crate::common::{hex_encode, normalize_address, parse_hash, write_file_atomic, Hash};
use crate::error::{AllowlistError, Result};
use crate::merkle::{build_commitment, verify_proof};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofEntry {
    pub max_allowance: u64,
    pub proof: Vec<String>,
}

impl ProofEntry {
    pub fn proof_hashes(&self) -> Result<Vec<Hash>> {
        self.proof.iter().map(|h| parse_hash(h)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub root: String,
    /// Keyed by lowercase `0x` address, sorted so output is stable.
    pub proofs: BTreeMap<String, ProofEntry>,
}

impl ProofBundle {
    /// Builds the tree over `records` and extracts every record's proof.
    ///
    /// A repeated address keeps the entry of its last occurrence.
    pub fn build(records: &[AllowlistRecord]) -> Result<Self> {
        let (root, tree) = build_commitment(records)?;

        let mut proofs = BTreeMap::new();
        for record in records {
            let proof = tree.proof(&record.leaf())?;
            debug!("{} -> {} proof nodes", record.address, proof.len());
            proofs.insert(
                record.address.clone(),
                ProofEntry {
                    max_allowance: record.max_allowance,
                    proof: proof.iter().map(hex_encode).collect(),
                },
            );
        }

        info!(
            "Built proofs for {} addresses ({} records, depth {})",
            proofs.len(),
            records.len(),
            tree.depth()
        );

        Ok(Self {
            root: hex_encode(root),
            proofs,
        })
    }

    pub fn root_hash(&self) -> Result<Hash> {
        parse_hash(&self.root)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the bundle to `path` atomically.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_file_atomic(path, &self.to_json()?)?;
        info!("Saved proof bundle to {:?}", path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let bundle: ProofBundle = serde_json::from_str(&content)?;
        bundle.root_hash()?;
        Ok(bundle)
    }

    /// Finds the entry for `address` in any case, with or without `0x`.
    pub fn lookup(&self, address: &str) -> Result<(String, &ProofEntry)> {
        let normalized = normalize_address(address).map_err(|source| AllowlistError::Address {
            address: address.to_string(),
            source,
        })?;
        let entry = self
            .proofs
            .get(&normalized)
            .ok_or_else(|| AllowlistError::AddressNotFound(normalized.clone()))?;
        Ok((normalized, entry))
    }

    /// Recomputes the leaf for `address` and checks its proof against the root.
    pub fn verify_entry(&self, address: &str) -> Result<bool> {
        let (normalized, entry) = self.lookup(address)?;
        let record = AllowlistRecord::new(&normalized, entry.max_allowance)?;
        Ok(verify_proof(
            &self.root_hash()?,
            &record.leaf(),
            &entry.proof_hashes()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowlist::parse_allowlist;
    use crate::common::hash_pair;

    const ADDR_1: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1";
    const ADDR_2: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2";
    const ADDR_3: &str = "0xccccccccccccccccccccccccccccccccccccccc3";

    fn records(csv_body: &str) -> Vec<AllowlistRecord> {
        parse_allowlist(&format!("address,maxAllowance\n{}", csv_body)).unwrap()
    }

    #[test]
    fn test_two_record_example() {
        let recs = records(&format!("{},2\n{},1\n", ADDR_1, ADDR_2));
        let (l1, l2) = (recs[0].leaf(), recs[1].leaf());
        let bundle = ProofBundle::build(&recs).unwrap();

        assert_eq!(bundle.root, hex_encode(hash_pair(&l1, &l2)));
        assert_eq!(bundle.proofs[ADDR_1].proof, vec![hex_encode(l2)]);
        assert_eq!(bundle.proofs[ADDR_2].proof, vec![hex_encode(l1)]);
        assert_eq!(bundle.proofs[ADDR_1].max_allowance, 2);
        assert!(bundle.verify_entry(ADDR_1).unwrap());
        assert!(bundle.verify_entry(ADDR_2).unwrap());
    }

    #[test]
    fn test_single_record_bundle() {
        let recs = records(&format!("{},4\n", ADDR_3));
        let bundle = ProofBundle::build(&recs).unwrap();
        assert_eq!(bundle.root, hex_encode(recs[0].leaf()));
        assert!(bundle.proofs[ADDR_3].proof.is_empty());
        assert!(bundle.verify_entry(ADDR_3).unwrap());
    }

    #[test]
    fn test_empty_allowlist_rejected() {
        assert!(matches!(
            ProofBundle::build(&[]),
            Err(AllowlistError::EmptyAllowlist)
        ));
    }

    #[test]
    fn test_duplicate_address_last_wins() {
        let recs = records(&format!("{},1\n{},2\n{},5\n", ADDR_1, ADDR_2, ADDR_1));
        let bundle = ProofBundle::build(&recs).unwrap();
        assert_eq!(bundle.proofs.len(), 2);
        assert_eq!(bundle.proofs[ADDR_1].max_allowance, 5);
        assert!(bundle.verify_entry(ADDR_1).unwrap());
    }

    #[test]
    fn test_json_schema() {
        let recs = records(&format!("{},2\n{},1\n", ADDR_1, ADDR_2));
        let bundle = ProofBundle::build(&recs).unwrap();
        let value: serde_json::Value = serde_json::from_str(&bundle.to_json().unwrap()).unwrap();
        assert!(value["root"].as_str().unwrap().starts_with("0x"));
        assert_eq!(value["proofs"][ADDR_1]["maxAllowance"], 2);
        assert_eq!(value["proofs"][ADDR_1]["proof"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_build_is_byte_for_byte_deterministic() {
        let body = format!("{},2\n{},1\n{},3\n", ADDR_2, ADDR_1, ADDR_3);
        let first = ProofBundle::build(&records(&body)).unwrap().to_json().unwrap();
        let second = ProofBundle::build(&records(&body)).unwrap().to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_lookup_normalizes_address() {
        let recs = records(&format!("{},2\n", ADDR_1));
        let bundle = ProofBundle::build(&recs).unwrap();
        let (addr, entry) = bundle.lookup(&ADDR_1.to_uppercase().replace("0X", "0x")).unwrap();
        assert_eq!(addr, ADDR_1);
        assert_eq!(entry.max_allowance, 2);
        assert!(matches!(
            bundle.lookup(ADDR_2),
            Err(AllowlistError::AddressNotFound(_))
        ));
    }

    #[test]
    fn test_tampered_allowance_fails_verification() {
        let recs = records(&format!("{},2\n{},1\n", ADDR_1, ADDR_2));
        let mut bundle = ProofBundle::build(&recs).unwrap();
        bundle.proofs.get_mut(ADDR_1).unwrap().max_allowance = 3;
        assert!(!bundle.verify_entry(ADDR_1).unwrap());
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proofs.json");
        let recs = records(&format!("{},2\n{},1\n", ADDR_1, ADDR_2));
        let bundle = ProofBundle::build(&recs).unwrap();
        bundle.write(&path).unwrap();
        assert_eq!(ProofBundle::load(&path).unwrap(), bundle);
    }
}
