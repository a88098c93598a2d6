//! # Facet Router - Selector Dispatch with Staged Governance
//!
//! Routes each incoming call by its 4-byte selector to one of several facet
//! modules. Which selector maps to which facet is authorized by Merkle
//! proofs against a committed manifest root, promoted through a
//! commit → timelock → activate → apply pipeline, and guarded by a
//! pause/freeze state machine.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Routes only bind to non-zero selectors and facets with code, never the router itself | `domain/invariants.rs` - `check_facet_binding()` |
//! | Dispatch re-checks the pinned codehash against live code | `service.rs` - `route()` |
//! | Applied routes are proven against the authoritative root | `service.rs` - `apply_routes()` |
//! | Activation waits out the timelock for the exact pending epoch | `domain/manifest.rs` - `ManifestStore::activate()` |
//! | Frozen is never cleared | `domain/operational.rs` - `OperationalFlags` |
//! | Route removal is allowed in every state | `domain/operational.rs` - `OperationalFlags::permits()` |
//! | One operation in flight; re-entry fails immediately | `service.rs` - `InFlight` |
//! | A failed operation leaves state untouched | `service.rs` - validate, then commit under one write lock |
//!
//! ## Capability Matrix
//!
//! | Operation | Capability | Blocked When |
//! |-----------|-----------|--------------|
//! | `commit_root` | Commit | paused, frozen |
//! | `activate_committed_root` | Apply | paused, frozen |
//! | `apply_routes` | Apply | paused, frozen |
//! | `update_manifest` | Admin | paused, frozen |
//! | `remove_routes` | Emergency | never |
//! | `pause` / `unpause` | Emergency | - |
//! | `freeze` | Admin or Emergency | already frozen |
//! | `set_max_return_data_size` | Admin | frozen |
//! | `grant_capability` / `revoke_capability` | Executor | never |
//! | `route` | anyone | paused |
//!
//! ## Limits
//!
//! | Limit | Value |
//! |-------|-------|
//! | Proof length | 256 siblings |
//! | Return data cap | 32 KiB default, adjustable within `[1, 1_000_000]` |
//! | Facet code size | 24 KiB |
//! | Emergency manifest | 24-byte records, at most 1024 |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Proofs | `domain/proof.rs` | Domain-separated ordered Merkle verification |
//! | Manifest tree | `domain/manifest_tree.rs` | Root and proof construction for manifests |
//! | Manifest store | `domain/manifest.rs` | Pending/active roots and the timelock |
//! | Flags | `domain/operational.rs` | Pause/freeze state machine |
//! | Preflight | `domain/preflight.rs` | Emergency manifest format and checks |
//! | Service | `service.rs` | The router |
//!
//! ## Usage Example
//!
//! ```ignore
//! use facet_router::prelude::*;
//!
//! let router = FacetRouterService::new(me, admin, RouterConfig::from_env()?, host, clock)?;
//! let epoch = router.commit_root(committer, tree.root())?;
//! // ... timelock ...
//! router.activate_committed_root(applier, epoch)?;
//! router.apply_routes(applier, batch).await?;
//!
//! let outcome = router.route(caller, selector, payload).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        ActiveManifest, DispatchOutcome, FacetCall, Invocation, PendingManifest, Route,
        RouteBatch, RouteEntry,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        code_hash, keccak256, Address, Bytes, Epoch, Hash, Selector, Timestamp, EMPTY_CODE_HASH,
        U256,
    };

    // Domain services
    pub use crate::domain::access::Capability;
    pub use crate::domain::manifest_tree::{LeafProof, ManifestTree};
    pub use crate::domain::operational::{Operation, OperationalState};
    pub use crate::domain::preflight::{encode_manifest, ManifestRecord, PreflightError};
    pub use crate::domain::proof::{leaf_hash, leaf_of_selector_route, node_hash, verify};

    // Invariants
    pub use crate::domain::invariants::limits;

    // Ports
    pub use crate::ports::inbound::FacetRouterApi;
    pub use crate::ports::outbound::{
        FacetCodeSource, FacetHost, FacetInvoker, RouterEventSink, TimeSource,
    };

    // Events
    pub use crate::events::{topics, RouterEvent};

    // Errors
    pub use crate::errors::{
        AuthorizationError, ErrorKind, HostError, ProofError, ResourceLimitError, RouterError,
        RoutingError, StateError, ValidationError,
    };

    // Adapters
    pub use crate::adapters::{
        InMemoryEventLog, InMemoryFacetHost, SystemTimeSource, TracingEventSink,
    };

    // Service
    pub use crate::config::{ConfigError, RouterConfig};
    pub use crate::service::{FacetRouterService, RouterStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
