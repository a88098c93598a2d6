//! # Ordered Merkle Proof Verification
//!
//! Stateless primitive that authorizes every route binding.
//!
//! ## Hashing
//!
//! | Node | Preimage |
//! |------|----------|
//! | Leaf | `0x00 ‖ data` |
//! | Internal | `0x01 ‖ left ‖ right` |
//!
//! The one-byte domain tag keeps a leaf from ever colliding with an internal
//! node. Children are NOT sorted: sibling order is carried explicitly in a
//! position bitfield, because leaf order encodes selector identity.
//!
//! ## Folding
//!
//! For proof index `i`, bit `i` of `positions` (LSB-first) says where
//! `proof[i]` sits relative to the running hash:
//!
//! - bit = 1: sibling on the right, `running = node(running, proof[i])`
//! - bit = 0: sibling on the left, `running = node(proof[i], running)`

use crate::domain::invariants::limits::MAX_PROOF_LENGTH;
use crate::domain::value_objects::{Address, Hash, Selector, U256};
use crate::errors::ProofError;
use sha3::{Digest, Keccak256};

/// Domain tag prefixed to leaf preimages.
pub const LEAF_TAG: u8 = 0x00;

/// Domain tag prefixed to internal node preimages.
pub const NODE_TAG: u8 = 0x01;

/// Leaf hash: `keccak256(0x00 ‖ data)`.
#[must_use]
pub fn leaf_hash(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update([LEAF_TAG]);
    hasher.update(data);
    Hash(hasher.finalize().into())
}

/// Internal node hash: `keccak256(0x01 ‖ left ‖ right)`, order preserved.
#[must_use]
pub fn node_hash(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update([NODE_TAG]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Hash(hasher.finalize().into())
}

/// Folds `proof` onto `leaf` and returns the resulting root.
///
/// # Errors
///
/// - [`ProofError::ProofTooLong`] if the proof has more than 256 nodes.
/// - [`ProofError::PositionsOutOfRange`] if any bit at or above
///   `proof.len()` is set.
pub fn process_proof(leaf: Hash, proof: &[Hash], positions: U256) -> Result<Hash, ProofError> {
    if proof.len() > MAX_PROOF_LENGTH {
        return Err(ProofError::ProofTooLong {
            len: proof.len(),
            max: MAX_PROOF_LENGTH,
        });
    }
    if positions.bits() > proof.len() {
        return Err(ProofError::PositionsOutOfRange { len: proof.len() });
    }

    let mut running = leaf;
    for (i, sibling) in proof.iter().enumerate() {
        running = if positions.bit(i) {
            node_hash(&running, sibling)
        } else {
            node_hash(sibling, &running)
        };
    }
    Ok(running)
}

/// Returns true if `proof` folds `leaf` to exactly `root`.
#[must_use]
pub fn verify(leaf: Hash, proof: &[Hash], positions: U256, root: &Hash) -> bool {
    matches!(process_proof(leaf, proof, positions), Ok(folded) if folded == *root)
}

/// Legacy entry point: positions as a boolean array, `is_right[i]` meaning
/// `proof[i]` is the right sibling.
///
/// # Errors
///
/// [`ProofError::FlagsLengthMismatch`] when the arrays differ in length, plus
/// everything [`process_proof`] returns.
pub fn process_proof_with_flags(
    leaf: Hash,
    proof: &[Hash],
    is_right: &[bool],
) -> Result<Hash, ProofError> {
    if proof.len() != is_right.len() {
        return Err(ProofError::FlagsLengthMismatch {
            proof: proof.len(),
            flags: is_right.len(),
        });
    }
    process_proof(leaf, proof, flags_to_positions(is_right)?)
}

/// Legacy counterpart of [`verify`].
#[must_use]
pub fn verify_with_flags(leaf: Hash, proof: &[Hash], is_right: &[bool], root: &Hash) -> bool {
    matches!(process_proof_with_flags(leaf, proof, is_right), Ok(folded) if folded == *root)
}

/// Packs a boolean array into an LSB-first bitfield.
///
/// # Errors
///
/// [`ProofError::ProofTooLong`] if more than 256 flags are supplied.
pub fn flags_to_positions(is_right: &[bool]) -> Result<U256, ProofError> {
    if is_right.len() > MAX_PROOF_LENGTH {
        return Err(ProofError::ProofTooLong {
            len: is_right.len(),
            max: MAX_PROOF_LENGTH,
        });
    }
    Ok(is_right
        .iter()
        .enumerate()
        .filter(|(_, right)| **right)
        .fold(U256::zero(), |acc, (i, _)| acc | (U256::one() << i)))
}

/// Leaf binding selector, facet and codehash together:
/// `leaf_hash(selector ‖ facet ‖ codehash)`.
///
/// Swapping the facet or its code changes the leaf and invalidates the proof.
#[must_use]
pub fn leaf_of_selector_route(selector: Selector, facet: Address, codehash: Hash) -> Hash {
    let mut data = [0u8; 56];
    data[..4].copy_from_slice(selector.as_bytes());
    data[4..24].copy_from_slice(facet.as_bytes());
    data[24..].copy_from_slice(codehash.as_bytes());
    leaf_hash(&data)
}

/// Builds the route leaf and verifies it against `root`.
#[must_use]
pub fn verify_route(
    selector: Selector,
    facet: Address,
    codehash: Hash,
    proof: &[Hash],
    positions: U256,
    root: &Hash,
) -> bool {
    verify(
        leaf_of_selector_route(selector, facet, codehash),
        proof,
        positions,
        root,
    )
}

// =============================================================================
// TESTS
// =============================================================================
