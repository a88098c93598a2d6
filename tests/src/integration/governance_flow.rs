//! # Governance Flow
//!
//! commit → timelock → activate → apply → route, driven through the
//! `FacetRouterApi` port with a real one-hour timelock.
//!
//! ## Flow Tested:
//!
//! 1. **Commit**: a root is staged for the next epoch
//! 2. **Timelock**: activation is refused until the delay has elapsed
//! 3. **Activate**: the root becomes active exactly once
//! 4. **Apply**: proven routes are written
//! 5. **Route**: calls reach the facet until its code drifts

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use facet_router::prelude::*;
    use facet_router::adapters::RecordingFacet;
    use facet_router::testing::{
        addr, batch_for, RouterFixture, RouteSpec, ADMIN, APPLIER, COMMITTER, GENESIS, STRANGER,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const ONE_HOUR: u64 = 3600;
    const SELECTOR: Selector = Selector::from_u32(0xaabb_ccdd);
    const FACET: Address = addr(0xF1);

    fn hour_locked() -> RouterFixture {
        router_telemetry::init_test_logging();
        RouterFixture::with_config(RouterConfig::for_testing().with_timelock(ONE_HOUR))
    }

    // =============================================================================
    // INTEGRATION TESTS: FULL PIPELINE
    // =============================================================================

    /// The canonical scenario: timelock, apply, dispatch, then code drift.
    #[tokio::test]
    async fn test_commit_activate_apply_route_then_drift() {
        let fx = hour_locked();
        let api: Arc<dyn FacetRouterApi> = fx.router.clone();

        let recorder = Arc::new(RecordingFacet::new());
        let codehash = fx.deploy(FACET, &[0x60, 0x80, 0x60, 0x40], recorder.clone());
        let routes: Vec<RouteSpec> = vec![
            (SELECTOR, FACET, codehash),
            (Selector::from_u32(0x0102_0304), FACET, codehash),
        ];
        let tree = ManifestTree::from_routes(&routes);

        // Step 1: commit R1 at t0
        let epoch = api.commit_root(COMMITTER, tree.root()).await.unwrap();
        assert_eq!(epoch, 1);

        // Step 2: activation at t0+1000 is too early
        fx.clock.set(GENESIS + 1000);
        let early = api.activate_committed_root(APPLIER, epoch).await;
        assert!(matches!(
            early,
            Err(RouterError::State(StateError::TimelockActive { earliest, .. })) if earliest == GENESIS + ONE_HOUR
        ));

        // Step 3: activation at t0+3601 succeeds exactly once
        fx.clock.set(GENESIS + ONE_HOUR + 1);
        api.activate_committed_root(APPLIER, epoch).await.unwrap();
        assert_eq!(
            api.active_manifest(),
            ActiveManifest {
                root: tree.root(),
                epoch: 1
            }
        );
        assert!(matches!(
            api.activate_committed_root(APPLIER, epoch).await,
            Err(RouterError::State(StateError::NoPendingRoot))
        ));

        // Step 4: apply the route proven against R1
        api.apply_routes(APPLIER, batch_for(&tree, &routes, &[0]))
            .await
            .unwrap();
        assert_eq!(api.route_of(SELECTOR).unwrap().codehash, codehash);

        // Step 5: dispatch reaches the facet with the caller preserved
        let outcome = api
            .route(STRANGER, SELECTOR, Bytes::from_slice(b"payload"))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.data.as_slice(), b"payload");
        let seen = recorder.invocations();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].caller, STRANGER);

        // Step 6: facet code drifts; the route still exists but dispatch fails
        fx.host.set_code(FACET, vec![0x60, 0x80, 0x60, 0x41]);
        let drifted = api.route(STRANGER, SELECTOR, Bytes::from_slice(b"payload")).await;
        assert!(matches!(
            drifted,
            Err(RouterError::Routing(RoutingError::CodehashMismatch { selector, .. })) if selector == SELECTOR
        ));
        assert!(api.route_of(SELECTOR).is_some());
        assert_eq!(recorder.invocations().len(), 1);
    }

    /// Epochs advance by one per activation and each root replaces the last.
    #[tokio::test]
    async fn test_successive_epochs() {
        let fx = hour_locked();
        let a = fx.deploy_echo(addr(0x01), &[0xA1]);
        let b = fx.deploy_echo(addr(0x02), &[0xB2]);

        let first = vec![(Selector::from_u32(1), addr(0x01), a)];
        fx.install(&first).await;
        assert_eq!(fx.router.active_manifest().epoch, 1);

        let second = vec![
            (Selector::from_u32(1), addr(0x02), b),
            (Selector::from_u32(2), addr(0x02), b),
        ];
        let tree = fx.install(&second).await;
        assert_eq!(fx.router.active_manifest().epoch, 2);
        assert_eq!(fx.router.active_manifest().root, tree.root());
        assert_eq!(fx.router.facet_addresses(), vec![addr(0x02)]);

        // Routes proven against the superseded root are no longer accepted.
        let old_tree = ManifestTree::from_routes(&first);
        let stale = fx
            .router
            .apply_routes(APPLIER, batch_for(&old_tree, &first, &[0]))
            .await;
        assert!(matches!(stale, Err(RouterError::Proof(ProofError::RootMismatch { .. }))));
    }

    /// A recommit before activation supersedes the pending root and restarts the timelock.
    #[tokio::test]
    async fn test_recommit_restarts_timelock() {
        let fx = hour_locked();
        fx.router.commit_root(COMMITTER, Hash::new([1; 32])).unwrap();
        fx.clock.advance(ONE_HOUR - 10);
        fx.router.commit_root(COMMITTER, Hash::new([2; 32])).unwrap();

        fx.clock.advance(20);
        assert!(fx.router.activate_committed_root(APPLIER, 1).is_err());

        fx.clock.advance(ONE_HOUR);
        fx.router.activate_committed_root(APPLIER, 1).unwrap();
        assert_eq!(fx.router.active_manifest().root, Hash::new([2; 32]));
    }

    /// Routes can be applied from the pending root before it is activated.
    #[tokio::test]
    async fn test_apply_from_pending_root() {
        let fx = hour_locked();
        let hash = fx.deploy_echo(FACET, &[0x01]);
        let routes = vec![(SELECTOR, FACET, hash)];
        let tree = ManifestTree::from_routes(&routes);

        fx.router.commit_root(COMMITTER, tree.root()).unwrap();
        fx.router
            .apply_routes(APPLIER, batch_for(&tree, &routes, &[0]))
            .await
            .unwrap();
        assert_eq!(fx.router.active_manifest().epoch, 0);
        assert!(fx.router.route(STRANGER, SELECTOR, Bytes::new()).await.is_ok());
    }

    /// The parallel-array calling convention rejects mismatched lengths up front.
    #[tokio::test]
    async fn test_parallel_arrays_must_line_up() {
        let result = RouteBatch::from_parallel(
            vec![SELECTOR],
            vec![FACET, FACET],
            vec![Hash::ZERO],
            vec![vec![]],
            vec![U256::zero()],
        );
        assert!(matches!(result, Err(ValidationError::ArrayLengthMismatch { facets: 2, .. })));
    }

    /// Governance events arrive in pipeline order with the acting principal.
    #[tokio::test]
    async fn test_event_trail() {
        let fx = hour_locked();
        let hash = fx.deploy_echo(FACET, &[0x01]);
        fx.install(&[(SELECTOR, FACET, hash)]).await;

        let names: Vec<&str> = fx.events.events().iter().map(RouterEvent::name).collect();
        assert_eq!(names, vec!["root_committed", "root_activated", "routes_applied"]);
        assert!(matches!(
            fx.events.events()[0],
            RouterEvent::RootCommitted { by, epoch: 1, .. } if by == COMMITTER
        ));

        let stats = fx.router.stats();
        assert_eq!(stats.governance_operations, 3 + 3);
        assert_eq!(stats.rejected_operations, 0);
    }

    /// Only the capability holders named for each step may perform it.
    #[tokio::test]
    async fn test_pipeline_capabilities() {
        let fx = hour_locked();
        assert!(matches!(
            fx.router.commit_root(APPLIER, Hash::new([1; 32])),
            Err(RouterError::Authorization(_))
        ));
        fx.router.commit_root(COMMITTER, Hash::new([1; 32])).unwrap();
        fx.clock.advance(ONE_HOUR);
        assert!(matches!(
            fx.router.activate_committed_root(COMMITTER, 1),
            Err(RouterError::Authorization(_))
        ));
        assert!(matches!(
            fx.router.activate_committed_root(ADMIN, 1),
            Err(RouterError::Authorization(_))
        ));
        fx.router.activate_committed_root(APPLIER, 1).unwrap();
    }
}
