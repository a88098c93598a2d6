//! # Test Fixtures
//!
//! A router wired to in-memory adapters with one principal per capability,
//! plus helpers to authorize and install routes through the full pipeline.

use crate::adapters::{EchoFacet, FacetBehavior, InMemoryEventLog, InMemoryFacetHost, ManualClock};
use crate::config::RouterConfig;
use crate::domain::access::Capability;
use crate::domain::entities::{RouteBatch, RouteEntry};
use crate::domain::manifest_tree::ManifestTree;
use crate::domain::value_objects::{code_hash, Address, Epoch, Hash, Selector};
use crate::service::FacetRouterService;
use std::sync::Arc;

/// The router's own address.
pub const ROUTER: Address = Address([0xF0; 20]);
/// Initial admin (Admin + Executor).
pub const ADMIN: Address = Address([0xA0; 20]);
/// Holds Commit.
pub const COMMITTER: Address = Address([0xC0; 20]);
/// Holds Apply.
pub const APPLIER: Address = Address([0xAA; 20]);
/// Holds Emergency.
pub const GUARDIAN: Address = Address([0xE0; 20]);
/// Holds nothing.
pub const STRANGER: Address = Address([0x5A; 20]);

/// Start time of the fixture clock.
pub const GENESIS: u64 = 1_700_000_000;

/// Router over the in-memory host.
pub type TestRouter = FacetRouterService<InMemoryFacetHost>;

/// A `(selector, facet, codehash)` manifest leaf.
pub type RouteSpec = (Selector, Address, Hash);

/// Router plus handles on every adapter it uses.
pub struct RouterFixture {
    /// The router under test.
    pub router: Arc<TestRouter>,
    /// Facet host backing the router.
    pub host: Arc<InMemoryFacetHost>,
    /// Clock driving the timelock.
    pub clock: Arc<ManualClock>,
    /// Every event emitted.
    pub events: Arc<InMemoryEventLog>,
}

impl Default for RouterFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterFixture {
    /// Fixture with the testing config (no timelock).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::for_testing())
    }

    /// Fixture with `config`.
    ///
    /// # Panics
    ///
    /// If `config` is invalid.
    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        let host = Arc::new(InMemoryFacetHost::new());
        let clock = Arc::new(ManualClock::at(GENESIS));
        let events = Arc::new(InMemoryEventLog::new());
        let router = FacetRouterService::new(ROUTER, ADMIN, config, host.clone(), clock.clone())
            .expect("fixture config is valid")
            .with_event_sink(events.clone());

        for (account, capability) in [
            (COMMITTER, Capability::Commit),
            (APPLIER, Capability::Apply),
            (GUARDIAN, Capability::Emergency),
        ] {
            router
                .grant_capability(ADMIN, account, capability)
                .expect("admin holds executor");
        }
        events.drain();

        Self {
            router: Arc::new(router),
            host,
            clock,
            events,
        }
    }

    /// Deploys `behavior` with `code` at `facet`; returns the codehash.
    pub fn deploy(&self, facet: Address, code: &[u8], behavior: Arc<dyn FacetBehavior>) -> Hash {
        self.host.deploy(facet, code.to_vec(), behavior);
        code_hash(code)
    }

    /// Deploys an echo facet; returns the codehash.
    pub fn deploy_echo(&self, facet: Address, code: &[u8]) -> Hash {
        self.deploy(facet, code, Arc::new(EchoFacet))
    }

    /// Commits the root over `routes`, waits out the timelock and activates.
    ///
    /// # Panics
    ///
    /// If any pipeline step fails.
    pub fn authorize(&self, routes: &[RouteSpec]) -> ManifestTree {
        let tree = ManifestTree::from_routes(routes);
        let epoch: Epoch = self
            .router
            .commit_root(COMMITTER, tree.root())
            .expect("commit succeeds");
        self.clock.advance(self.router.config().timelock_delay_secs);
        self.router
            .activate_committed_root(APPLIER, epoch)
            .expect("activation succeeds");
        tree
    }

    /// Authorizes `routes` and applies all of them.
    ///
    /// # Panics
    ///
    /// If any pipeline step fails.
    pub async fn install(&self, routes: &[RouteSpec]) -> ManifestTree {
        let tree = self.authorize(routes);
        let indices: Vec<usize> = (0..routes.len()).collect();
        self.router
            .apply_routes(APPLIER, batch_for(&tree, routes, &indices))
            .await
            .expect("apply succeeds");
        tree
    }
}

/// Builds a batch for the `indices` of `routes`, proven against `tree`.
///
/// # Panics
///
/// If an index is outside the tree.
#[must_use]
pub fn batch_for(tree: &ManifestTree, routes: &[RouteSpec], indices: &[usize]) -> RouteBatch {
    RouteBatch::new(
        indices
            .iter()
            .map(|&i| {
                let (selector, facet, codehash) = routes[i];
                let leaf = tree.proof(i).expect("index inside tree");
                RouteEntry {
                    selector,
                    facet,
                    codehash,
                    proof: leaf.proof,
                    positions: leaf.positions,
                }
            })
            .collect(),
    )
}

/// Address filled with `byte`.
#[must_use]
pub const fn addr(byte: u8) -> Address {
    Address([byte; 20])
}
