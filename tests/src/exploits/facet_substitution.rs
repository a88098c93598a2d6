//! # Facet Substitution and Callback Attacks
//!
//! A facet that was honest at apply time turns hostile: its code is swapped
//! or destroyed, it calls back into the router, or it returns huge data.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock, Weak};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use facet_router::adapters::{FacetBehavior, StaticFacet};
    use facet_router::prelude::*;
    use facet_router::testing::{
        addr, RouterFixture, TestRouter, ADMIN, APPLIER, COMMITTER, GUARDIAN, STRANGER,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const SELECTOR: Selector = Selector::from_u32(0x5e1f_0001);
    const FACET: Address = addr(0x5F);

    /// Tries every mutating entry point from inside a dispatch.
    #[derive(Default)]
    struct HostileFacet {
        router: OnceLock<Weak<TestRouter>>,
        outcomes: Mutex<Vec<Result<(), RouterError>>>,
    }

    impl HostileFacet {
        fn record<T>(&self, result: Result<T, RouterError>) {
            self.outcomes.lock().push(result.map(|_| ()));
        }
    }

    #[async_trait]
    impl FacetBehavior for HostileFacet {
        async fn call(&self, invocation: Invocation) -> FacetCall {
            let Some(router) = self.router.get().and_then(Weak::upgrade) else {
                return FacetCall::revert(Vec::new());
            };
            self.record(router.commit_root(COMMITTER, Hash::new([0x66; 32])));
            self.record(router.freeze(ADMIN));
            self.record(router.set_max_return_data_size(ADMIN, 1_000_000));
            self.record(router.grant_capability(ADMIN, invocation.caller, Capability::Admin));
            self.record(router.remove_routes(GUARDIAN, &[invocation.selector]));
            self.record(
                router
                    .update_manifest(ADMIN, Hash::ZERO, Bytes::new())
                    .await,
            );
            self.record(
                router
                    .apply_routes(APPLIER, RouteBatch::default())
                    .await,
            );
            self.record(router.route(invocation.caller, invocation.selector, Bytes::new()).await);
            FacetCall::ok(b"hostile".to_vec())
        }
    }

    async fn with_facet(behavior: Arc<dyn FacetBehavior>, code: &[u8]) -> RouterFixture {
        let fx = RouterFixture::new();
        let hash = fx.deploy(FACET, code, behavior);
        fx.install(&[(SELECTOR, FACET, hash)]).await;
        fx
    }

    // =============================================================================
    // EXPLOIT TESTS
    // =============================================================================

    /// Every callback is refused and the outer dispatch still completes.
    #[tokio::test]
    async fn test_reentrant_callbacks_rejected() {
        let hostile = Arc::new(HostileFacet::default());
        let fx = with_facet(hostile.clone(), &[0x66]).await;
        let _ = hostile.router.set(Arc::downgrade(&fx.router));
        let events_before = fx.events.len();

        let outcome = fx.router.route(STRANGER, SELECTOR, Bytes::new()).await.unwrap();
        assert_eq!(outcome.data.as_slice(), b"hostile");

        let outcomes = hostile.outcomes.lock().clone();
        assert_eq!(outcomes.len(), 8);
        for outcome in outcomes {
            assert_eq!(outcome, Err(RouterError::State(StateError::ReentrantCall)));
        }

        assert_eq!(fx.events.len(), events_before);
        assert!(fx.router.pending_manifest().is_none());
        assert_eq!(fx.router.operational_state(), OperationalState::Operational);
        assert!(!fx.router.has_capability(STRANGER, Capability::Admin));
        assert!(fx.router.route_of(SELECTOR).is_some());
    }

    /// Code replaced after apply: dispatch refuses the drifted facet.
    #[tokio::test]
    async fn test_code_swap_after_apply() {
        let fx = with_facet(Arc::new(StaticFacet::returning(b"ok".to_vec())), &[0x01, 0x02]).await;
        assert!(fx.router.route(STRANGER, SELECTOR, Bytes::new()).await.is_ok());

        fx.host.deploy(FACET, vec![0x01, 0x03], Arc::new(StaticFacet::returning(b"pwned".to_vec())));
        let result = fx.router.route(STRANGER, SELECTOR, Bytes::new()).await;
        assert!(matches!(
            result,
            Err(RouterError::Routing(RoutingError::CodehashMismatch { .. }))
        ));
    }

    /// Facet destroyed after apply: its live hash is the empty-code hash.
    #[tokio::test]
    async fn test_destroyed_facet() {
        let fx = with_facet(Arc::new(StaticFacet::returning(Vec::new())), &[0x01]).await;
        fx.host.destroy(&FACET);

        let result = fx.router.route(STRANGER, SELECTOR, Bytes::new()).await;
        assert!(matches!(
            result,
            Err(RouterError::Routing(RoutingError::CodehashMismatch { actual, .. })) if actual == EMPTY_CODE_HASH
        ));
    }

    /// Return-data griefing: a 2 MB answer is refused at the default cap.
    #[tokio::test]
    async fn test_return_data_griefing() {
        let fx = with_facet(Arc::new(StaticFacet::returning(vec![0xAB; 2_000_000])), &[0x01]).await;

        let result = fx.router.route(STRANGER, SELECTOR, Bytes::new()).await;
        assert!(matches!(
            result,
            Err(RouterError::ResourceLimit(ResourceLimitError::ReturnDataTooLarge {
                size: 2_000_000,
                limit: 32_768
            }))
        ));

        // Even the widest cap stays below the griefing payload.
        fx.router.set_max_return_data_size(ADMIN, 1_000_000).unwrap();
        assert!(fx.router.route(STRANGER, SELECTOR, Bytes::new()).await.is_err());
        assert_eq!(fx.router.stats().rejected_dispatches, 2);
    }

    /// Host outage mid-dispatch surfaces as a host error and releases the guard.
    #[tokio::test]
    async fn test_host_outage_releases_guard() {
        let fx = with_facet(Arc::new(StaticFacet::returning(Vec::new())), &[0x01]).await;
        fx.host.set_offline(true);
        assert!(matches!(
            fx.router.route(STRANGER, SELECTOR, Bytes::new()).await,
            Err(RouterError::Host(_))
        ));

        fx.host.set_offline(false);
        fx.router.pause(GUARDIAN).unwrap();
    }

    /// A facet that reverts cannot disguise the revert as success.
    #[tokio::test]
    async fn test_revert_passthrough() {
        let fx = with_facet(Arc::new(StaticFacet::reverting(b"nope".to_vec())), &[0x01]).await;
        let outcome = fx.router.route(STRANGER, SELECTOR, Bytes::new()).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.data.as_slice(), b"nope");
        assert_eq!(outcome.facet, FACET);
    }
}
