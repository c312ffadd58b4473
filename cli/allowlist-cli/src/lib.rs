//! Allowlist Merkle commitments for proof-gated mints.
//!
//! Loads an `address,maxAllowance` CSV, hashes each row into a Keccak256 leaf,
//! builds a sorted-pair Merkle tree and exports a proof per address that the
//! collection contract can check with OpenZeppelin's `MerkleProof`.
//!
//! ```
//! use allowlist_cli::{parse_allowlist, verify_proof, ProofBundle};
//!
//! let csv = "address,maxAllowance\n\
//!            0x1111111111111111111111111111111111111111,2\n\
//!            0x2222222222222222222222222222222222222222,1\n";
//! let records = parse_allowlist(csv).unwrap();
//! let bundle = ProofBundle::build(&records).unwrap();
//!
//! let entry = &bundle.proofs["0x1111111111111111111111111111111111111111"];
//! assert!(verify_proof(
//!     &bundle.root_hash().unwrap(),
//!     &records[0].leaf(),
//!     &entry.proof_hashes().unwrap(),
//! ));
//! ```

pub mod abi;
pub mod allowlist;
pub mod bundle;
pub mod common;
pub mod error;
pub mod merkle;
pub mod settings;

pub use allowlist::{load_allowlist, parse_allowlist, AllowlistRecord};
pub use bundle::{ProofBundle, ProofEntry};
pub use common::{
    hash_pair, hex_encode, keccak256, normalize_address, parse_address, parse_hash,
    write_file_atomic, Hash,
};
pub use error::{AddressError, AllowlistError, Result};
pub use merkle::{build_commitment, compute_root, verify_proof, MerkleTree};
pub use settings::{Settings, SettingsError};
