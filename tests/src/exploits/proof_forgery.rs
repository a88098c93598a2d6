//! # Proof Forgery
//!
//! An attacker who cannot commit roots tries to get an unauthorized binding
//! accepted by manipulating proofs and position bits.
//!
//! ## Attack Vectors
//!
//! | Vector | Defence |
//! |--------|---------|
//! | Flip a position bit | Ordered hashing: `node(a, b) != node(b, a)` |
//! | Stray bits above the proof | Strict positions, `PositionsOutOfRange` |
//! | Present an inner node as a leaf | Leaf/node domain separation |
//! | Swap facet under a valid proof | Facet and codehash are inside the leaf |
//! | Oversized proof | 256-sibling cap |

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use facet_router::domain::proof::{
        process_proof, process_proof_with_flags, verify_with_flags,
    };
    use facet_router::prelude::*;
    use facet_router::testing::{addr, batch_for, RouterFixture, APPLIER};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn random_hash(rng: &mut StdRng) -> Hash {
        Hash::new(rng.gen())
    }

    fn random_tree(rng: &mut StdRng, size: usize) -> (Vec<Hash>, ManifestTree) {
        let leaves: Vec<Hash> = (0..size).map(|_| leaf_hash(&rng.gen::<[u8; 32]>())).collect();
        let tree = ManifestTree::from_leaves(leaves.clone());
        (leaves, tree)
    }

    fn flags_of(positions: U256, len: usize) -> Vec<bool> {
        (0..len).map(|i| positions.bit(i)).collect()
    }

    // =============================================================================
    // PROPERTY TESTS
    // =============================================================================

    /// Every honest proof verifies, and both entry points agree.
    #[test]
    fn test_honest_proofs_verify() {
        let mut rng = StdRng::seed_from_u64(1);
        for size in [1, 2, 3, 7, 8, 33, 100] {
            let (leaves, tree) = random_tree(&mut rng, size);
            let root = tree.root();
            for (i, leaf) in leaves.iter().enumerate() {
                let p = tree.proof(i).unwrap();
                assert!(verify(*leaf, &p.proof, p.positions, &root), "size {size} leaf {i}");
                assert_eq!(process_proof(*leaf, &p.proof, p.positions).unwrap(), root);
                let flags = flags_of(p.positions, p.proof.len());
                assert!(verify_with_flags(*leaf, &p.proof, &flags, &root));
            }
        }
    }

    /// Flipping any single in-range position bit breaks verification.
    #[test]
    fn test_single_bit_flip_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        let (leaves, tree) = random_tree(&mut rng, 16);
        let root = tree.root();
        for (i, leaf) in leaves.iter().enumerate() {
            let p = tree.proof(i).unwrap();
            for bit in 0..p.proof.len() {
                let flipped = p.positions ^ (U256::one() << bit);
                assert!(!verify(*leaf, &p.proof, flipped, &root), "leaf {i} bit {bit}");
                let folded = process_proof(*leaf, &p.proof, flipped).unwrap();
                assert_ne!(folded, root);
            }
        }
    }

    /// A bit set at or beyond the proof length is an error, not ignored.
    #[test]
    fn test_stray_position_bits_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let (leaves, tree) = random_tree(&mut rng, 4);
        let p = tree.proof(0).unwrap();
        let stray = p.positions | (U256::one() << p.proof.len());
        assert!(matches!(
            process_proof(leaves[0], &p.proof, stray),
            Err(ProofError::PositionsOutOfRange { len: 2 })
        ));
        assert!(!verify(leaves[0], &p.proof, stray, &tree.root()));
    }

    /// Proofs beyond 256 siblings are refused before any hashing.
    #[test]
    fn test_oversized_proof_rejected() {
        let proof = vec![Hash::ZERO; limits::MAX_PROOF_LENGTH + 1];
        assert!(matches!(
            process_proof(Hash::ZERO, &proof, U256::zero()),
            Err(ProofError::ProofTooLong { len: 257, max: 256 })
        ));
        let flags = vec![false; proof.len()];
        assert!(process_proof_with_flags(Hash::ZERO, &proof, &flags).is_err());
    }

    /// An inner node cannot pose as a leaf: its preimage hashes differently
    /// under the leaf tag.
    #[test]
    fn test_inner_node_is_not_a_leaf() {
        let mut rng = StdRng::seed_from_u64(4);
        let (left, right) = (random_hash(&mut rng), random_hash(&mut rng));
        let mut concatenated = Vec::with_capacity(64);
        concatenated.extend_from_slice(left.as_bytes());
        concatenated.extend_from_slice(right.as_bytes());
        assert_ne!(leaf_hash(&concatenated), node_hash(&left, &right));

        // A two-leaf tree: presenting the root's children as a 64-byte leaf with
        // an empty proof does not reach the root.
        let tree = ManifestTree::from_leaves(vec![left, right]);
        assert!(!verify(leaf_hash(&concatenated), &[], U256::zero(), &tree.root()));
    }

    // =============================================================================
    // EXPLOIT TESTS: AGAINST THE ROUTER
    // =============================================================================

    /// The attacker reuses a valid proof but swaps in their own facet.
    #[tokio::test]
    async fn test_facet_swap_under_valid_proof() {
        let fx = RouterFixture::new();
        let honest = fx.deploy_echo(addr(0x10), &[0x10]);
        let evil = fx.deploy_echo(addr(0xEE), &[0xEE]);
        let selector = Selector::from_u32(0xdead_beef);
        let routes = vec![(selector, addr(0x10), honest), (Selector::from_u32(1), addr(0x10), honest)];
        let tree = fx.authorize(&routes);

        let mut entries = batch_for(&tree, &routes, &[0]).entries().to_vec();
        entries[0].facet = addr(0xEE);
        entries[0].codehash = evil;
        let result = fx.router.apply_routes(APPLIER, RouteBatch::new(entries)).await;

        assert!(matches!(
            result,
            Err(RouterError::Proof(ProofError::RootMismatch { selector: s, .. })) if s == selector
        ));
        assert!(fx.router.route_of(selector).is_none());
    }

    /// The attacker flips a position bit to steer the fold.
    #[tokio::test]
    async fn test_position_flip_against_router() {
        let fx = RouterFixture::new();
        let code = fx.deploy_echo(addr(0x10), &[0x10]);
        let routes: Vec<_> = (1..=4u32).map(|i| (Selector::from_u32(i), addr(0x10), code)).collect();
        let tree = fx.authorize(&routes);

        let mut entries = batch_for(&tree, &routes, &[2]).entries().to_vec();
        entries[0].positions = entries[0].positions ^ U256::one();
        let result = fx.router.apply_routes(APPLIER, RouteBatch::new(entries)).await;

        assert!(matches!(result, Err(RouterError::Proof(ProofError::RootMismatch { .. }))));
        assert!(fx.router.selectors().is_empty());
        assert_eq!(fx.router.stats().rejected_operations, 1);
    }
}
