//! Minimal ABI encoding for the administrative root update.
//!
//! The tool never sends transactions; it prints calldata that an operator can
//! paste into any wallet or multisig.

use crate::common::{keccak256, Hash};

pub const SET_MERKLE_ROOT_SIGNATURE: &str = "setMerkleRoot(bytes32)";

/// First four bytes of `keccak256(signature)`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for `setMerkleRoot(bytes32 root)`.
pub fn encode_set_merkle_root(root: &Hash) -> Vec<u8> {
    let mut calldata = Vec::with_capacity(4 + 32);
    calldata.extend_from_slice(&function_selector(SET_MERKLE_ROOT_SIGNATURE));
    calldata.extend_from_slice(root);
    calldata
}
