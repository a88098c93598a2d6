//! # Manifest Tree Builder
//!
//! Builds the ordered Merkle tree a manifest root commits to, and the
//! per-leaf proofs the governance pipeline submits with `apply_routes`.
//!
//! Leaves keep the order they are given in. A node without a sibling at some
//! level is promoted unchanged to the next level, so its proof simply has no
//! entry for that level.

use crate::domain::proof::{leaf_of_selector_route, node_hash};
use crate::domain::value_objects::{Address, Hash, Selector, U256};

/// Proof for one leaf: sibling hashes bottom-up and their positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafProof {
    /// Sibling hashes, leaf level first.
    pub proof: Vec<Hash>,
    /// Bit `i` set means `proof[i]` is the right sibling.
    pub positions: U256,
}

/// An ordered Merkle tree over precomputed leaf hashes.
#[derive(Clone, Debug)]
pub struct ManifestTree {
    /// `levels[0]` are the leaves, the last level holds the root.
    levels: Vec<Vec<Hash>>,
}

impl ManifestTree {
    /// Builds a tree over `leaves` in the given order.
    #[must_use]
    pub fn from_leaves(leaves: Vec<Hash>) -> Self {
        let mut levels = vec![leaves];
        while levels.last().map_or(0, Vec::len) > 1 {
            let current = levels.last().map(Vec::as_slice).unwrap_or_default();
            let next: Vec<Hash> = current
                .chunks(2)
                .map(|pair| match pair.get(1) {
                    Some(right) => node_hash(&pair[0], right),
                    None => pair[0],
                })
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    /// Builds a tree over route leaves.
    #[must_use]
    pub fn from_routes(routes: &[(Selector, Address, Hash)]) -> Self {
        Self::from_leaves(
            routes
                .iter()
                .map(|(selector, facet, codehash)| {
                    leaf_of_selector_route(*selector, *facet, *codehash)
                })
                .collect(),
        )
    }

    /// Root hash. The empty tree has the zero root.
    #[must_use]
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Hash::ZERO)
    }

    /// Number of leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Returns true if the tree has no leaves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Leaf hash at `index`.
    #[must_use]
    pub fn leaf(&self, index: usize) -> Option<Hash> {
        self.levels.first().and_then(|l| l.get(index)).copied()
    }

    /// Proof for the leaf at `index`, or None if out of range.
    #[must_use]
    pub fn proof(&self, index: usize) -> Option<LeafProof> {
        if index >= self.len() {
            return None;
        }

        let mut proof = Vec::new();
        let mut positions = U256::zero();
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = idx ^ 1;
            if let Some(hash) = level.get(sibling) {
                if idx % 2 == 0 {
                    positions = positions | (U256::one() << proof.len());
                }
                proof.push(*hash);
            }
            idx /= 2;
        }

        Some(LeafProof { proof, positions })
    }
}
