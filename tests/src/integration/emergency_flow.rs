//! # Emergency Flow
//!
//! Incident response: pause, route removal, the manifest bypass and the
//! one-way freeze.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use facet_router::adapters::StaticFacet;
    use facet_router::prelude::*;
    use facet_router::testing::{addr, RouterFixture, RouteSpec, ADMIN, COMMITTER, GUARDIAN, STRANGER};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const SEL_A: Selector = Selector::from_u32(0xA0A0_A0A0);
    const SEL_B: Selector = Selector::from_u32(0xB0B0_B0B0);

    async fn installed() -> (RouterFixture, Vec<RouteSpec>) {
        let fx = RouterFixture::new();
        let a = fx.deploy_echo(addr(0x0A), &[0xAA]);
        let b = fx.deploy_echo(addr(0x0B), &[0xBB]);
        let routes = vec![(SEL_A, addr(0x0A), a), (SEL_B, addr(0x0B), b)];
        fx.install(&routes).await;
        (fx, routes)
    }

    fn manifest(records: &[(Selector, Address)]) -> (Hash, Bytes) {
        let records: Vec<ManifestRecord> = records
            .iter()
            .map(|&(selector, facet)| ManifestRecord { selector, facet })
            .collect();
        let data = encode_manifest(&records);
        (keccak256(&data), Bytes::from(data))
    }

    fn enter(fx: &RouterFixture, state: OperationalState) {
        match state {
            OperationalState::Operational => {}
            OperationalState::Paused => fx.router.pause(GUARDIAN).unwrap(),
            OperationalState::Frozen => fx.router.freeze(ADMIN).unwrap(),
            OperationalState::PausedFrozen => {
                fx.router.pause(GUARDIAN).unwrap();
                fx.router.freeze(ADMIN).unwrap();
            }
        }
        assert_eq!(fx.router.operational_state(), state);
    }

    // =============================================================================
    // INTEGRATION TESTS: REMOVAL
    // =============================================================================

    /// Route removal behaves identically in all four operational states.
    #[tokio::test]
    async fn test_remove_routes_in_every_state() {
        for state in [
            OperationalState::Operational,
            OperationalState::Paused,
            OperationalState::Frozen,
            OperationalState::PausedFrozen,
        ] {
            let (fx, _) = installed().await;
            enter(&fx, state);

            let removed = fx.router.remove_routes(GUARDIAN, &[SEL_A]).unwrap();
            assert_eq!(removed, 1, "state {state}");
            assert_eq!(fx.router.selectors(), vec![SEL_B], "state {state}");
            assert_eq!(fx.router.remove_routes(GUARDIAN, &[SEL_A]).unwrap(), 0);
        }
    }

    /// Incident: a facet misbehaves; pause, cut it out, resume.
    #[tokio::test]
    async fn test_pause_remove_resume() {
        let (fx, _) = installed().await;

        fx.router.pause(GUARDIAN).unwrap();
        assert!(matches!(
            fx.router.route(STRANGER, SEL_A, Bytes::new()).await,
            Err(RouterError::Routing(RoutingError::DispatchPaused(_)))
        ));

        fx.router.remove_routes(GUARDIAN, &[SEL_A]).unwrap();
        fx.router.unpause(GUARDIAN).unwrap();

        assert!(matches!(
            fx.router.route(STRANGER, SEL_A, Bytes::new()).await,
            Err(RouterError::Routing(RoutingError::NoRoute(_)))
        ));
        assert!(fx.router.route(STRANGER, SEL_B, Bytes::new()).await.is_ok());
        assert_eq!(fx.events.on_topic(topics::EMERGENCY).len(), 2);
    }

    // =============================================================================
    // INTEGRATION TESTS: MANIFEST BYPASS
    // =============================================================================

    /// The admin replaces the whole table from a hashed manifest, skipping the timelock.
    #[tokio::test]
    async fn test_manifest_bypass_redirects_selector() {
        let (fx, _) = installed().await;
        let before = fx.router.active_manifest();
        let patched = fx.deploy(addr(0x0C), &[0xCC], Arc::new(StaticFacet::returning(b"patched".to_vec())));

        let (hash, data) = manifest(&[(SEL_A, addr(0x0C))]);
        assert_eq!(fx.router.preflight_manifest(data.as_slice()).await, PreflightError::Ok);
        fx.router.update_manifest(ADMIN, hash, data).await.unwrap();

        assert_eq!(fx.router.selectors(), vec![SEL_A]);
        assert_eq!(fx.router.route_of(SEL_A).unwrap().codehash, patched);
        assert_eq!(fx.router.emergency_manifest_hash(), hash);
        assert_eq!(fx.router.active_manifest(), before);
        assert!(fx.router.pending_manifest().is_none());

        let outcome = fx.router.route(STRANGER, SEL_A, Bytes::new()).await.unwrap();
        assert_eq!(outcome.data.as_slice(), b"patched");
    }

    /// Preflight verdicts come back in ordinal order of precedence.
    #[tokio::test]
    async fn test_preflight_verdicts() {
        let (fx, _) = installed().await;

        let cases: Vec<(Vec<(Selector, Address)>, PreflightError)> = vec![
            (vec![(Selector::ZERO, addr(0x0A))], PreflightError::InvalidSelector),
            (vec![(SEL_A, Address::ZERO)], PreflightError::ZeroFacetAddress),
            (vec![(SEL_A, fx.router.address())], PreflightError::FacetIsSelf),
            (vec![(SEL_A, addr(0x99))], PreflightError::ZeroCodeFacet),
            (vec![(SEL_A, addr(0x0A)), (SEL_A, addr(0x0B))], PreflightError::DuplicateSelector),
        ];
        for (records, expected) in cases {
            let (_, data) = manifest(&records);
            assert_eq!(fx.router.preflight_manifest(data.as_slice()).await, expected);
        }

        let oversized = vec![0u8; limits::MAX_MANIFEST_SIZE + limits::MANIFEST_RECORD_SIZE];
        assert_eq!(fx.router.preflight_manifest(&oversized).await, PreflightError::TooLarge);
        assert_eq!(fx.router.preflight_manifest(&[1, 2, 3]).await, PreflightError::BadFormat);

        // Preflight is read-only.
        assert_eq!(fx.router.selectors(), vec![SEL_A, SEL_B]);
        assert_eq!(PreflightError::CodeSizeExceeded.ordinal(), 7);
    }

    /// A failed bypass leaves the table as it was.
    #[tokio::test]
    async fn test_failed_bypass_is_atomic() {
        let (fx, _) = installed().await;
        let (hash, data) = manifest(&[(SEL_A, addr(0x0A)), (SEL_B, addr(0x77))]);
        let result = fx.router.update_manifest(ADMIN, hash, data).await;
        assert!(matches!(
            result,
            Err(RouterError::Validation(ValidationError::Preflight {
                code: PreflightError::ZeroCodeFacet,
                selector: Some(s),
            })) if s == SEL_B
        ));
        assert_eq!(fx.router.selectors(), vec![SEL_A, SEL_B]);
        assert_eq!(fx.router.emergency_manifest_hash(), Hash::ZERO);
    }

    // =============================================================================
    // INTEGRATION TESTS: FREEZE
    // =============================================================================

    /// No sequence of pause/unpause ever leaves the frozen states.
    #[tokio::test]
    async fn test_frozen_is_sticky_under_random_toggling() {
        let (fx, _) = installed().await;
        fx.router.freeze(GUARDIAN).unwrap();

        let mut rng = StdRng::seed_from_u64(0x00F2_EE2E);
        for _ in 0..200 {
            let _ = if rng.gen_bool(0.5) {
                fx.router.pause(GUARDIAN)
            } else {
                fx.router.unpause(GUARDIAN)
            };
            let state = fx.router.operational_state();
            assert!(
                matches!(state, OperationalState::Frozen | OperationalState::PausedFrozen),
                "left frozen: {state}"
            );
            assert_ne!(fx.router.operational_flags() & 0x02, 0);
        }
    }

    /// Frozen locks governance but keeps dispatch and removal alive.
    #[tokio::test]
    async fn test_freeze_lockdown() {
        let (fx, routes) = installed().await;
        fx.router.freeze(ADMIN).unwrap();

        assert!(fx.router.commit_root(COMMITTER, Hash::new([5; 32])).is_err());
        let (hash, data) = manifest(&[(SEL_A, addr(0x0A))]);
        assert!(matches!(
            fx.router.update_manifest(ADMIN, hash, data).await,
            Err(RouterError::State(StateError::OperationBlocked { .. }))
        ));
        assert!(matches!(
            fx.router.set_max_return_data_size(ADMIN, 64),
            Err(RouterError::State(StateError::OperationBlocked {
                operation: Operation::SetReturnDataLimit,
                ..
            }))
        ));

        assert!(fx.router.route(STRANGER, SEL_A, Bytes::new()).await.is_ok());
        assert_eq!(fx.router.remove_routes(GUARDIAN, &[SEL_A, SEL_B]).unwrap(), 2);
        assert!(fx.router.facet_addresses().is_empty());
    }

    /// Cap values at and beyond both ends of the accepted range.
    #[test]
    fn test_return_data_cap_range() {
        let fx = RouterFixture::new();
        fx.router.set_max_return_data_size(ADMIN, 32_768).unwrap();
        fx.router.set_max_return_data_size(ADMIN, 1_000_000).unwrap();
        assert!(fx.router.set_max_return_data_size(ADMIN, 0).is_err());
        assert!(fx.router.set_max_return_data_size(ADMIN, 1_000_001).is_err());
        assert_eq!(fx.router.max_return_data_size(), 1_000_000);
    }
}
