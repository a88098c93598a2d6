//! # Driving Ports (API - Inbound)
//!
//! The router's public surface. Every mutating method takes the calling
//! principal explicitly; identity is never inferred.
//!
//! ## Capability matrix
//!
//! | Method | Capability | Blocked while |
//! |--------|------------|---------------|
//! | `commit_root` | Commit | paused, frozen |
//! | `activate_committed_root` | Apply | paused, frozen |
//! | `apply_routes` | Apply | paused, frozen |
//! | `update_manifest` | Admin | paused, frozen |
//! | `remove_routes` | Emergency | never |
//! | `pause` / `unpause` | Emergency | never |
//! | `freeze` | Admin or Emergency | never |
//! | `set_max_return_data_size` | Admin | frozen |
//! | `grant_capability` / `revoke_capability` | Executor | never |
//! | `route` | none | paused |

use crate::domain::access::Capability;
use crate::domain::entities::{ActiveManifest, DispatchOutcome, PendingManifest, Route, RouteBatch};
use crate::domain::operational::OperationalState;
use crate::domain::preflight::PreflightError;
use crate::domain::value_objects::{Address, Bytes, Epoch, Hash, Selector};
use crate::errors::RouterError;
use async_trait::async_trait;

/// Primary API of the router.
#[async_trait]
pub trait FacetRouterApi: Send + Sync {
    // -------------------------------------------------------------------------
    // Governance pipeline
    // -------------------------------------------------------------------------

    /// Stages `root`; returns the epoch it will occupy.
    async fn commit_root(&self, caller: Address, root: Hash) -> Result<Epoch, RouterError>;

    /// Promotes the pending root once its timelock has elapsed.
    async fn activate_committed_root(&self, caller: Address, epoch: Epoch) -> Result<(), RouterError>;

    /// Verifies and writes a batch of routes, all or nothing.
    async fn apply_routes(&self, caller: Address, batch: RouteBatch) -> Result<(), RouterError>;

    /// Emergency rewrite of the whole route table from a raw manifest.
    async fn update_manifest(&self, caller: Address, hash: Hash, data: Bytes) -> Result<(), RouterError>;

    /// Deletes routes; returns how many existed.
    async fn remove_routes(&self, caller: Address, selectors: Vec<Selector>) -> Result<usize, RouterError>;

    // -------------------------------------------------------------------------
    // Emergency controls
    // -------------------------------------------------------------------------

    /// Stops dispatch and governance.
    async fn pause(&self, caller: Address) -> Result<(), RouterError>;

    /// Resumes dispatch. Does not clear frozen.
    async fn unpause(&self, caller: Address) -> Result<(), RouterError>;

    /// Permanently stops governance.
    async fn freeze(&self, caller: Address) -> Result<(), RouterError>;

    /// Changes the return-data cap; accepted range is `[1, 1_000_000]`.
    async fn set_max_return_data_size(&self, caller: Address, limit: usize) -> Result<(), RouterError>;

    // -------------------------------------------------------------------------
    // Capabilities
    // -------------------------------------------------------------------------

    /// Grants `capability` to `account`.
    async fn grant_capability(
        &self,
        caller: Address,
        account: Address,
        capability: Capability,
    ) -> Result<(), RouterError>;

    /// Revokes `capability` from `account`.
    async fn revoke_capability(
        &self,
        caller: Address,
        account: Address,
        capability: Capability,
    ) -> Result<(), RouterError>;

    /// Drops one of the caller's own capabilities.
    async fn renounce_capability(&self, caller: Address, capability: Capability) -> Result<(), RouterError>;

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Forwards `payload` to the facet bound to `selector`.
    async fn route(&self, caller: Address, selector: Selector, payload: Bytes) -> Result<DispatchOutcome, RouterError>;

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Side-effect-free manifest inspection. Never fails.
    async fn preflight_manifest(&self, data: Bytes) -> PreflightError;

    /// Observable operational state.
    fn operational_state(&self) -> OperationalState;

    /// Paused/frozen bitmask.
    fn operational_flags(&self) -> u8;

    /// Active root and epoch.
    fn active_manifest(&self) -> ActiveManifest;

    /// Staged root, if any.
    fn pending_manifest(&self) -> Option<PendingManifest>;

    /// Route bound to `selector`.
    fn route_of(&self, selector: Selector) -> Option<Route>;

    /// Bound selectors, sorted.
    fn selectors(&self) -> Vec<Selector>;

    /// Distinct facet addresses, sorted.
    fn facet_addresses(&self) -> Vec<Address>;

    /// Current return-data cap.
    fn max_return_data_size(&self) -> usize;

    /// Whether `account` holds `capability`.
    fn has_capability(&self, account: Address, capability: Capability) -> bool;

    /// Hash of the last emergency manifest; zero if none.
    fn emergency_manifest_hash(&self) -> Hash;
}
