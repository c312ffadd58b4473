//! Sorted-pair Keccak256 Merkle tree.
//!
//! ## Tree Structure
//!
//! - Leaf nodes: supplied by the caller (see [`AllowlistRecord::leaf`])
//! - Internal nodes: `keccak256(min(a, b) || max(a, b))`
//! - Odd node at the end of a level is promoted unchanged to the next level
//!
//! These are the conventions of `merkletreejs` with `sortPairs` and of
//! OpenZeppelin's `MerkleProof.verify`, so proofs produced here verify
//! on-chain without any position bits.

use std::collections::HashMap;

use tracing::debug;

use crate::allowlist::AllowlistRecord;
use crate::common::{hash_pair, hex_encode, Hash};
use crate::error::{AllowlistError, Result};

#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `levels[0]` holds the leaves in input order, the last level the root.
    levels: Vec<Vec<Hash>>,
    /// First position of each distinct leaf in `levels[0]`.
    positions: HashMap<Hash, usize>,
}

impl MerkleTree {
    /// Builds the tree bottom-up from `leaves`.
    ///
    /// # Errors
    /// Returns [`AllowlistError::EmptyAllowlist`] when `leaves` is empty.
    pub fn build(leaves: Vec<Hash>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(AllowlistError::EmptyAllowlist);
        }

        let mut positions = HashMap::with_capacity(leaves.len());
        for (i, leaf) in leaves.iter().enumerate() {
            positions.entry(*leaf).or_insert(i);
        }

        let mut levels = vec![leaves];
        loop {
            let level = &levels[levels.len() - 1];
            if level.len() <= 1 {
                break;
            }
            let next_level: Vec<Hash> = level
                .chunks(2)
                .map(|chunk| match chunk {
                    [left, right] => hash_pair(left, right),
                    _ => chunk[0],
                })
                .collect();
            levels.push(next_level);
        }

        debug!(
            "Built Merkle tree with {} leaves and {} levels",
            levels[0].len(),
            levels.len()
        );

        Ok(Self { levels, positions })
    }

    /// The root hash.
    pub fn root(&self) -> Hash {
        // `build` guarantees at least one level with exactly one node on top.
        self.levels[self.levels.len() - 1][0]
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Sibling path for the first occurrence of `leaf`.
    ///
    /// # Errors
    /// Returns [`AllowlistError::LeafNotFound`] if `leaf` is not in the tree.
    pub fn proof(&self, leaf: &Hash) -> Result<Vec<Hash>> {
        let leaf_index = *self
            .positions
            .get(leaf)
            .ok_or_else(|| AllowlistError::LeafNotFound(hex::encode(leaf)))?;
        Ok(self.proof_at(leaf_index))
    }

    fn proof_at(&self, leaf_index: usize) -> Vec<Hash> {
        let mut proof = Vec::with_capacity(self.depth());
        let mut current_index = leaf_index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = current_index ^ 1;
            // A missing sibling means this node was promoted.
            if let Some(sibling) = level.get(sibling_index) {
                proof.push(*sibling);
            }
            current_index /= 2;
        }

        proof
    }
}

/// Builds the tree for `records` and returns its root alongside it.
pub fn build_commitment(records: &[AllowlistRecord]) -> Result<(Hash, MerkleTree)> {
    let leaves = records.iter().map(AllowlistRecord::leaf).collect();
    let tree = MerkleTree::build(leaves)?;
    let root = tree.root();
    debug!("Merkle root: {}", hex_encode(root));
    Ok((root, tree))
}

/// Recomputes the root from `leaf` and `proof` with the sorted-pair rule.
pub fn compute_root(leaf: &Hash, proof: &[Hash]) -> Hash {
    proof
        .iter()
        .fold(*leaf, |current, sibling| hash_pair(&current, sibling))
}

/// Checks that `proof` links `leaf` to `root`. An empty proof verifies only
/// when the leaf is the root.
pub fn verify_proof(root: &Hash, leaf: &Hash, proof: &[Hash]) -> bool {
    compute_root(leaf, proof) == *root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::keccak256;

    fn leaf(i: u8) -> Hash {
        keccak256(&[i])
    }

    fn record(i: u8, allowance: u64) -> AllowlistRecord {
        AllowlistRecord::new(&format!("0x{}", hex::encode([i; 20])), allowance).unwrap()
    }

    #[test]
    fn test_empty_tree_rejected() {
        assert!(matches!(
            MerkleTree::build(vec![]),
            Err(AllowlistError::EmptyAllowlist)
        ));
    }

    #[test]
    fn test_single_leaf_is_root() {
        let tree = MerkleTree::build(vec![leaf(1)]).unwrap();
        assert_eq!(tree.root(), leaf(1));
        assert_eq!(tree.depth(), 0);
        let proof = tree.proof(&leaf(1)).unwrap();
        assert!(proof.is_empty());
        assert!(verify_proof(&tree.root(), &leaf(1), &proof));
    }

    #[test]
    fn test_two_leaves() {
        let (l1, l2) = (leaf(1), leaf(2));
        let tree = MerkleTree::build(vec![l1, l2]).unwrap();
        assert_eq!(tree.root(), hash_pair(&l1, &l2));
        assert_eq!(tree.proof(&l1).unwrap(), vec![l2]);
        assert_eq!(tree.proof(&l2).unwrap(), vec![l1]);
    }

    #[test]
    fn test_odd_leaf_promoted() {
        let leaves: Vec<Hash> = (0..3).map(leaf).collect();
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        let expected = hash_pair(&hash_pair(&leaves[0], &leaves[1]), &leaves[2]);
        assert_eq!(tree.root(), expected);
        assert_eq!(
            tree.proof(&leaves[2]).unwrap(),
            vec![hash_pair(&leaves[0], &leaves[1])]
        );
    }

    #[test]
    fn test_five_leaves_promoted_twice() {
        let leaves: Vec<Hash> = (0..5).map(leaf).collect();
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        let left = hash_pair(
            &hash_pair(&leaves[0], &leaves[1]),
            &hash_pair(&leaves[2], &leaves[3]),
        );
        assert_eq!(tree.root(), hash_pair(&left, &leaves[4]));
        assert_eq!(tree.proof(&leaves[4]).unwrap(), vec![left]);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_all_proofs_verify() {
        for n in 1..=17u8 {
            let leaves: Vec<Hash> = (0..n).map(leaf).collect();
            let tree = MerkleTree::build(leaves.clone()).unwrap();
            for l in &leaves {
                let proof = tree.proof(l).unwrap();
                assert!(verify_proof(&tree.root(), l, &proof), "n={}", n);
            }
        }
    }

    #[test]
    fn test_tampered_proof_fails() {
        let leaves: Vec<Hash> = (0..4).map(leaf).collect();
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        let mut proof = tree.proof(&leaves[0]).unwrap();
        proof[0][0] ^= 0xff;
        assert!(!verify_proof(&tree.root(), &leaves[0], &proof));
        assert!(!verify_proof(&tree.root(), &leaves[0], &[]));
    }

    #[test]
    fn test_leaf_not_found() {
        let tree = MerkleTree::build(vec![leaf(1), leaf(2)]).unwrap();
        assert!(matches!(
            tree.proof(&leaf(3)),
            Err(AllowlistError::LeafNotFound(_))
        ));
    }

    #[test]
    fn test_build_commitment_deterministic() {
        let records = vec![record(1, 2), record(2, 1), record(3, 5)];
        let (root1, _) = build_commitment(&records).unwrap();
        let (root2, _) = build_commitment(&records).unwrap();
        assert_eq!(root1, root2);
    }

    #[test]
    fn test_allowance_change_invalidates_proof() {
        let records = vec![record(1, 2), record(2, 1)];
        let (root, tree) = build_commitment(&records).unwrap();
        let proof = tree.proof(&records[0].leaf()).unwrap();
        let bumped = record(1, 3);
        assert!(verify_proof(&root, &records[0].leaf(), &proof));
        assert!(!verify_proof(&root, &bumped.leaf(), &proof));
    }

    #[test]
    fn test_permuted_input_each_proof_matches_own_root() {
        let records: Vec<AllowlistRecord> = (1..=5).map(|i| record(i, i as u64)).collect();
        let mut reversed = records.clone();
        reversed.reverse();

        for set in [&records, &reversed] {
            let (root, tree) = build_commitment(set).unwrap();
            for r in set.iter() {
                let proof = tree.proof(&r.leaf()).unwrap();
                assert!(verify_proof(&root, &r.leaf(), &proof));
            }
        }
    }
}
