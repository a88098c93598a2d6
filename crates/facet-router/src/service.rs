//! # Facet Router Service
//!
//! The single process-scoped owner of all router state: manifests, route
//! table, operational flags, capabilities and the return-data cap.
//!
//! ## Execution model
//!
//! - Every mutating entry point and `route` takes the in-flight guard first.
//!   A second entry while it is held fails at once with
//!   `StateError::ReentrantCall`; nothing ever blocks on it.
//! - Each operation validates completely, then commits under one write lock.
//!   A failed operation leaves state exactly as it was.
//! - No lock guard is held across an `.await`. Facet code is snapshotted
//!   before the write phase and the facet is invoked with no lock held.
//! - Events are emitted only after the write has committed.

use crate::adapters::TracingEventSink;
use crate::config::{ConfigError, RouterConfig};
use crate::domain::access::{AccessControl, Capability};
use crate::domain::entities::{
    ActiveManifest, DispatchOutcome, Invocation, PendingManifest, Route, RouteBatch, RouteEntry,
};
use crate::domain::invariants::{check_codehash_pinned, check_facet_binding, check_frozen_sticky};
use crate::domain::invariants::limits::{MAX_RETURN_DATA_LIMIT, MIN_RETURN_DATA_LIMIT};
use crate::domain::manifest::ManifestStore;
use crate::domain::operational::{Operation, OperationalFlags, OperationalState};
use crate::domain::preflight::{self, PreflightError};
use crate::domain::proof::{leaf_of_selector_route, process_proof};
use crate::domain::route_table::RouteTable;
use crate::domain::value_objects::{code_hash, keccak256, Address, Bytes, Epoch, Hash, Selector};
use crate::errors::{
    HostError, ProofError, ResourceLimitError, RouterError, RoutingError, StateError,
    ValidationError,
};
use crate::events::RouterEvent;
use crate::ports::inbound::FacetRouterApi;
use crate::ports::outbound::{FacetHost, RouterEventSink, TimeSource};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// =============================================================================
// STATE
// =============================================================================

/// Everything the router mutates.
#[derive(Debug)]
struct RouterState {
    manifests: ManifestStore,
    routes: RouteTable,
    flags: OperationalFlags,
    access: AccessControl,
    max_return_data_size: usize,
    emergency_manifest_hash: Hash,
}

/// Statistics for the router.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RouterStats {
    /// Calls forwarded to a facet.
    pub dispatches: u64,
    /// Forwarded calls where the facet reverted.
    pub reverted_dispatches: u64,
    /// Calls rejected before or after forwarding.
    pub rejected_dispatches: u64,
    /// Committed administrative operations.
    pub governance_operations: u64,
    /// Rejected administrative operations.
    pub rejected_operations: u64,
}

// =============================================================================
// IN-FLIGHT GUARD
// =============================================================================

/// Exclusive in-flight marker, released on drop.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, StateError> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| Self(flag))
            .map_err(|_| StateError::ReentrantCall)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// The router.
pub struct FacetRouterService<H: FacetHost> {
    /// The router's own address; routes may never point here.
    router: Address,
    config: RouterConfig,
    host: Arc<H>,
    clock: Arc<dyn TimeSource>,
    events: Arc<dyn RouterEventSink>,
    state: RwLock<RouterState>,
    in_flight: AtomicBool,
    stats: Mutex<RouterStats>,
}

impl<H: FacetHost> FacetRouterService<H> {
    /// Creates a router at `router`, with `admin` as the only initial
    /// principal (holding Admin and Executor). Starts OPERATIONAL.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if `config` fails validation.
    pub fn new(
        router: Address,
        admin: Address,
        config: RouterConfig,
        host: Arc<H>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            router = %router,
            admin = %admin,
            timelock_delay_secs = config.timelock_delay_secs,
            max_return_data_size = config.max_return_data_size,
            "Facet router initialised"
        );
        Ok(Self {
            router,
            state: RwLock::new(RouterState {
                manifests: ManifestStore::new(),
                routes: RouteTable::new(),
                flags: OperationalFlags::new(),
                access: AccessControl::with_admin(admin),
                max_return_data_size: config.max_return_data_size,
                emergency_manifest_hash: Hash::ZERO,
            }),
            config,
            host,
            clock,
            events: Arc::new(TracingEventSink),
            in_flight: AtomicBool::new(false),
            stats: Mutex::new(RouterStats::default()),
        })
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn RouterEventSink>) -> Self {
        self.events = events;
        self
    }

    /// The router's own address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.router
    }

    /// Deployment configuration.
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> RouterStats {
        self.stats.lock().clone()
    }

    /// Capabilities held by `account`.
    #[must_use]
    pub fn capabilities_of(&self, account: Address) -> Vec<Capability> {
        self.state.read().access.capabilities_of(&account)
    }

    /// Selectors currently routed to `facet`.
    #[must_use]
    pub fn selectors_of(&self, facet: Address) -> Vec<Selector> {
        self.state.read().routes.selectors_of(&facet)
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn enter(&self) -> Result<InFlight<'_>, StateError> {
        InFlight::acquire(&self.in_flight)
    }

    fn emit(&self, event: RouterEvent) {
        self.events.emit(event);
    }

    /// Logs and counts the outcome of an administrative operation.
    fn finish<T>(&self, operation: &'static str, caller: Address, result: Result<T, RouterError>) -> Result<T, RouterError> {
        let mut stats = self.stats.lock();
        match &result {
            Ok(_) => stats.governance_operations += 1,
            Err(err) => {
                stats.rejected_operations += 1;
                warn!(operation, caller = %caller, error = %err, kind = ?err.kind(), "Operation rejected");
            }
        }
        result
    }

    /// Reads code for each distinct non-zero facet.
    async fn snapshot_code(&self, facets: &[Address]) -> Result<HashMap<Address, Bytes>, HostError> {
        let mut code = HashMap::with_capacity(facets.len());
        for &facet in facets {
            if facet.is_zero() || code.contains_key(&facet) {
                continue;
            }
            let bytes = self.host.get_code(facet).await?;
            code.insert(facet, bytes);
        }
        Ok(code)
    }

    /// As [`Self::snapshot_code`], but a failed lookup leaves the facet out.
    async fn snapshot_code_lenient(&self, facets: &[Address]) -> HashMap<Address, Bytes> {
        let mut code = HashMap::with_capacity(facets.len());
        for &facet in facets {
            if facet.is_zero() || code.contains_key(&facet) {
                continue;
            }
            match self.host.get_code(facet).await {
                Ok(bytes) => {
                    code.insert(facet, bytes);
                }
                Err(err) => debug!(facet = %facet, error = %err, "Preflight code lookup failed"),
            }
        }
        code
    }

    // -------------------------------------------------------------------------
    // Governance pipeline
    // -------------------------------------------------------------------------

    /// Stages `root` for the next epoch.
    ///
    /// # Errors
    ///
    /// Authorization (Commit), State (paused/frozen/reentrant), Validation (zero root).
    #[instrument(skip(self), fields(caller = %caller, root = %root))]
    pub fn commit_root(&self, caller: Address, root: Hash) -> Result<Epoch, RouterError> {
        let result = self.commit_root_inner(caller, root);
        self.finish("commit_root", caller, result)
    }

    fn commit_root_inner(&self, caller: Address, root: Hash) -> Result<Epoch, RouterError> {
        let _guard = self.enter()?;
        let now = self.clock.now();
        let pending = {
            let mut state = self.state.write();
            state.access.require(&caller, Capability::Commit)?;
            state.flags.ensure_permits(Operation::Commit)?;
            state
                .manifests
                .commit(root, now, self.config.timelock_delay_secs)?
        };

        info!(
            epoch = pending.epoch,
            earliest_activation = pending.earliest_activation,
            "Manifest root committed"
        );
        self.emit(RouterEvent::RootCommitted {
            root,
            epoch: pending.epoch,
            earliest_activation: pending.earliest_activation,
            by: caller,
        });
        Ok(pending.epoch)
    }

    /// Promotes the pending root once its timelock has elapsed.
    ///
    /// # Errors
    ///
    /// Authorization (Apply), State (paused/frozen/no pending/epoch/timelock).
    #[instrument(skip(self), fields(caller = %caller))]
    pub fn activate_committed_root(&self, caller: Address, epoch: Epoch) -> Result<(), RouterError> {
        let result = self.activate_inner(caller, epoch);
        self.finish("activate_committed_root", caller, result)
    }

    fn activate_inner(&self, caller: Address, epoch: Epoch) -> Result<(), RouterError> {
        let _guard = self.enter()?;
        let now = self.clock.now();
        let active = {
            let mut state = self.state.write();
            state.access.require(&caller, Capability::Apply)?;
            state.flags.ensure_permits(Operation::Activate)?;
            state.manifests.activate(epoch, now)?
        };

        info!(epoch = active.epoch, root = %active.root, "Manifest root activated");
        self.emit(RouterEvent::RootActivated {
            root: active.root,
            epoch: active.epoch,
            by: caller,
        });
        Ok(())
    }

    /// Verifies every entry against the authoritative root and writes the
    /// batch, or writes nothing.
    ///
    /// # Errors
    ///
    /// Authorization (Apply), State, Validation (empty, duplicate, facet
    /// checks, codehash), Proof, Host.
    #[instrument(skip(self, batch), fields(caller = %caller, entries = batch.len()))]
    pub async fn apply_routes(&self, caller: Address, batch: RouteBatch) -> Result<(), RouterError> {
        let result = self.apply_routes_inner(caller, batch).await;
        self.finish("apply_routes", caller, result)
    }

    async fn apply_routes_inner(&self, caller: Address, batch: RouteBatch) -> Result<(), RouterError> {
        let _guard = self.enter()?;
        let root = {
            let state = self.state.read();
            state.access.require(&caller, Capability::Apply)?;
            state.flags.ensure_permits(Operation::ApplyRoutes)?;
            state.manifests.authoritative_root()?
        };

        if batch.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }

        let mut seen = HashSet::with_capacity(batch.len());
        for entry in batch.entries() {
            if !seen.insert(entry.selector) {
                return Err(ValidationError::DuplicateSelector(entry.selector).into());
            }
        }

        for entry in batch.entries() {
            let leaf = leaf_of_selector_route(entry.selector, entry.facet, entry.codehash);
            if process_proof(leaf, &entry.proof, entry.positions)? != root {
                return Err(ProofError::RootMismatch {
                    selector: entry.selector,
                    root,
                }
                .into());
            }
        }

        let facets: Vec<Address> = batch.entries().iter().map(|e| e.facet).collect();
        let code = self.snapshot_code(&facets).await?;
        for entry in batch.entries() {
            self.check_entry(entry, &code)?;
        }

        // Nothing above touched state; a failure anywhere left it intact.
        {
            let mut state = self.state.write();
            state.flags.ensure_permits(Operation::ApplyRoutes)?;
            state
                .routes
                .insert_all(batch.entries().iter().map(RouteEntry::route));
        }

        let selectors = batch.selectors();
        info!(count = selectors.len(), root = %root, "Routes applied");
        self.emit(RouterEvent::RoutesApplied {
            selectors,
            root,
            by: caller,
        });
        Ok(())
    }

    /// Facet checks plus codehash agreement for one proof-verified entry.
    fn check_entry(&self, entry: &RouteEntry, code: &HashMap<Address, Bytes>) -> Result<(), ValidationError> {
        let facet_code = code.get(&entry.facet).map_or(&[][..], Bytes::as_slice);
        let max = self.config.max_facet_code_size;
        let verdict = check_facet_binding(entry.selector, entry.facet, facet_code, self.router, max);
        if let Some(err) = verdict.to_binding_error(entry.selector, entry.facet, facet_code.len(), max) {
            return Err(err);
        }

        let live = code_hash(facet_code);
        if live != entry.codehash {
            return Err(ValidationError::CodehashMismatch {
                selector: entry.selector,
                expected: entry.codehash,
                actual: live,
            });
        }
        Ok(())
    }

    /// Emergency bypass: replaces the whole route table from a raw manifest,
    /// skipping commit, timelock and activation.
    ///
    /// # Errors
    ///
    /// Authorization (Admin), State (paused/frozen), Validation (hash, preflight), Host.
    #[instrument(skip(self, data), fields(caller = %caller, hash = %hash, bytes = data.len()))]
    pub async fn update_manifest(&self, caller: Address, hash: Hash, data: Bytes) -> Result<(), RouterError> {
        let result = self.update_manifest_inner(caller, hash, data).await;
        self.finish("update_manifest", caller, result)
    }

    async fn update_manifest_inner(&self, caller: Address, hash: Hash, data: Bytes) -> Result<(), RouterError> {
        let _guard = self.enter()?;
        {
            let state = self.state.read();
            state.access.require(&caller, Capability::Admin)?;
            state.flags.ensure_permits(Operation::UpdateManifest)?;
        }

        let computed = keccak256(data.as_slice());
        if computed != hash {
            return Err(ValidationError::ManifestHashMismatch {
                supplied: hash,
                computed,
            }
            .into());
        }

        let records = preflight::decode_manifest(data.as_slice(), self.config.max_manifest_size)
            .map_err(|code| ValidationError::Preflight {
                code,
                selector: None,
            })?;
        let facets: Vec<Address> = records.iter().map(|r| r.facet).collect();
        let code = self.snapshot_code(&facets).await?;
        let report = preflight::preflight_records(
            &records,
            &code,
            self.router,
            self.config.max_facet_code_size,
        );
        if !report.code.is_ok() {
            return Err(ValidationError::Preflight {
                code: report.code,
                selector: report.selector,
            }
            .into());
        }

        let routes: Vec<Route> = records
            .iter()
            .map(|r| Route {
                selector: r.selector,
                facet: r.facet,
                codehash: code_hash(code.get(&r.facet).map_or(&[][..], Bytes::as_slice)),
            })
            .collect();
        let count = routes.len();

        {
            let mut state = self.state.write();
            state.flags.ensure_permits(Operation::UpdateManifest)?;
            state.routes.replace_all(routes);
            state.emergency_manifest_hash = hash;
        }

        warn!(routes = count, "Route table replaced through emergency manifest update");
        self.emit(RouterEvent::ManifestUpdated {
            hash,
            routes: count,
            by: caller,
        });
        Ok(())
    }

    /// Deletes routes. Allowed in every operational state.
    ///
    /// # Errors
    ///
    /// Authorization (Emergency), State (reentrant only).
    #[instrument(skip(self, selectors), fields(caller = %caller, requested = selectors.len()))]
    pub fn remove_routes(&self, caller: Address, selectors: &[Selector]) -> Result<usize, RouterError> {
        let result = self.remove_routes_inner(caller, selectors);
        self.finish("remove_routes", caller, result)
    }

    fn remove_routes_inner(&self, caller: Address, selectors: &[Selector]) -> Result<usize, RouterError> {
        let _guard = self.enter()?;
        let removed = {
            let mut state = self.state.write();
            state.access.require(&caller, Capability::Emergency)?;
            state.flags.ensure_permits(Operation::RemoveRoutes)?;
            state.routes.remove_all(selectors)
        };

        let count = removed.len();
        info!(removed = count, "Routes removed");
        self.emit(RouterEvent::RoutesRemoved {
            selectors: removed,
            by: caller,
        });
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Emergency controls
    // -------------------------------------------------------------------------

    /// Sets paused.
    ///
    /// # Errors
    ///
    /// Authorization (Emergency), State (already paused).
    #[instrument(skip(self), fields(caller = %caller))]
    pub fn pause(&self, caller: Address) -> Result<(), RouterError> {
        let result = self.transition(caller, &[Capability::Emergency], OperationalFlags::pause, |state, by| {
            RouterEvent::Paused { state, by }
        });
        self.finish("pause", caller, result)
    }

    /// Clears paused. Frozen stays set.
    ///
    /// # Errors
    ///
    /// Authorization (Emergency), State (not paused).
    #[instrument(skip(self), fields(caller = %caller))]
    pub fn unpause(&self, caller: Address) -> Result<(), RouterError> {
        let result = self.transition(caller, &[Capability::Emergency], OperationalFlags::unpause, |state, by| {
            RouterEvent::Unpaused { state, by }
        });
        self.finish("unpause", caller, result)
    }

    /// Sets frozen, permanently.
    ///
    /// # Errors
    ///
    /// Authorization (Admin or Emergency), State (already frozen).
    #[instrument(skip(self), fields(caller = %caller))]
    pub fn freeze(&self, caller: Address) -> Result<(), RouterError> {
        let result = self.transition(
            caller,
            &[Capability::Admin, Capability::Emergency],
            OperationalFlags::freeze,
            |state, by| RouterEvent::Frozen { state, by },
        );
        self.finish("freeze", caller, result)
    }

    fn transition(
        &self,
        caller: Address,
        accepted: &[Capability],
        apply: fn(&mut OperationalFlags) -> Result<OperationalState, StateError>,
        event: fn(OperationalState, Address) -> RouterEvent,
    ) -> Result<(), RouterError> {
        let _guard = self.enter()?;
        let next = {
            let mut state = self.state.write();
            state.access.require_any(&caller, accepted)?;
            let was_frozen = state.flags.is_frozen();
            let next = apply(&mut state.flags)?;
            debug_assert!(check_frozen_sticky(was_frozen, state.flags.is_frozen()));
            next
        };

        warn!(state = %next, "Operational state changed");
        self.emit(event(next, caller));
        Ok(())
    }

    /// Changes the return-data cap.
    ///
    /// # Errors
    ///
    /// Authorization (Admin), State (frozen), ResourceLimit (outside `[1, 1_000_000]`).
    #[instrument(skip(self), fields(caller = %caller))]
    pub fn set_max_return_data_size(&self, caller: Address, limit: usize) -> Result<(), RouterError> {
        let result = self.set_max_return_data_size_inner(caller, limit);
        self.finish("set_max_return_data_size", caller, result)
    }

    fn set_max_return_data_size_inner(&self, caller: Address, limit: usize) -> Result<(), RouterError> {
        let _guard = self.enter()?;
        let previous = {
            let mut state = self.state.write();
            state.access.require(&caller, Capability::Admin)?;
            state.flags.ensure_permits(Operation::SetReturnDataLimit)?;
            if !(MIN_RETURN_DATA_LIMIT..=MAX_RETURN_DATA_LIMIT).contains(&limit) {
                return Err(ResourceLimitError::ReturnDataLimitOutOfRange {
                    requested: limit,
                    min: MIN_RETURN_DATA_LIMIT,
                    max: MAX_RETURN_DATA_LIMIT,
                }
                .into());
            }
            std::mem::replace(&mut state.max_return_data_size, limit)
        };

        info!(previous, current = limit, "Return data cap changed");
        self.emit(RouterEvent::MaxReturnDataSizeChanged {
            previous,
            current: limit,
            by: caller,
        });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Capabilities
    // -------------------------------------------------------------------------

    /// Grants `capability` to `account`.
    ///
    /// # Errors
    ///
    /// Authorization (Executor), State (reentrant only).
    #[instrument(skip(self), fields(caller = %caller, account = %account))]
    pub fn grant_capability(&self, caller: Address, account: Address, capability: Capability) -> Result<(), RouterError> {
        let result = self.grant_inner(caller, account, capability);
        self.finish("grant_capability", caller, result)
    }

    fn grant_inner(&self, caller: Address, account: Address, capability: Capability) -> Result<(), RouterError> {
        let _guard = self.enter()?;
        let changed = {
            let mut state = self.state.write();
            state.access.require(&caller, Capability::Executor)?;
            state.access.grant(account, capability)
        };
        if changed {
            info!(?capability, "Capability granted");
            self.emit(RouterEvent::CapabilityGranted {
                account,
                capability,
                by: caller,
            });
        }
        Ok(())
    }

    /// Revokes `capability` from `account`.
    ///
    /// # Errors
    ///
    /// Authorization (Executor), State (reentrant only).
    #[instrument(skip(self), fields(caller = %caller, account = %account))]
    pub fn revoke_capability(&self, caller: Address, account: Address, capability: Capability) -> Result<(), RouterError> {
        let result = self.revoke_inner(caller, account, capability, true);
        self.finish("revoke_capability", caller, result)
    }

    /// Drops one of the caller's own capabilities.
    ///
    /// # Errors
    ///
    /// State (reentrant only).
    #[instrument(skip(self), fields(caller = %caller))]
    pub fn renounce_capability(&self, caller: Address, capability: Capability) -> Result<(), RouterError> {
        let result = self.revoke_inner(caller, caller, capability, false);
        self.finish("renounce_capability", caller, result)
    }

    fn revoke_inner(
        &self,
        caller: Address,
        account: Address,
        capability: Capability,
        requires_executor: bool,
    ) -> Result<(), RouterError> {
        let _guard = self.enter()?;
        let changed = {
            let mut state = self.state.write();
            if requires_executor {
                state.access.require(&caller, Capability::Executor)?;
            }
            state.access.revoke(&account, capability)
        };
        if changed {
            info!(?capability, account = %account, "Capability revoked");
            self.emit(RouterEvent::CapabilityRevoked {
                account,
                capability,
                by: caller,
            });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Forwards `payload` to the facet bound to `selector`, preserving the
    /// caller's identity.
    ///
    /// A facet revert is returned as `success == false`, not as an error.
    ///
    /// The in-flight guard covers dispatch too. An overlapping dispatch from
    /// another task is refused with `StateError::ReentrantCall` exactly like a
    /// facet calling back in; callers that share a router across tasks retry.
    ///
    /// # Errors
    ///
    /// Routing (paused, no route, codehash drift), ResourceLimit (return
    /// data over cap), State (in flight), Host.
    #[instrument(skip(self, payload), fields(caller = %caller, selector = %selector))]
    pub async fn route(&self, caller: Address, selector: Selector, payload: Bytes) -> Result<DispatchOutcome, RouterError> {
        let result = self.route_inner(caller, selector, payload).await;
        let mut stats = self.stats.lock();
        match &result {
            Ok(outcome) => {
                stats.dispatches += 1;
                if !outcome.success {
                    stats.reverted_dispatches += 1;
                }
            }
            Err(err) => {
                stats.rejected_dispatches += 1;
                debug!(error = %err, "Dispatch rejected");
            }
        }
        drop(stats);
        result
    }

    async fn route_inner(&self, caller: Address, selector: Selector, payload: Bytes) -> Result<DispatchOutcome, RouterError> {
        let _guard = self.enter()?;
        let (route, limit) = {
            let state = self.state.read();
            if !state.flags.permits(Operation::Dispatch) {
                return Err(RoutingError::DispatchPaused(state.flags.state()).into());
            }
            let route = *state
                .routes
                .get(&selector)
                .ok_or(RoutingError::NoRoute(selector))?;
            (route, state.max_return_data_size)
        };

        let live = self.host.get_code_hash(route.facet).await?;
        if !check_codehash_pinned(&route, &live) {
            warn!(facet = %route.facet, expected = %route.codehash, live = %live, "Facet code drifted since apply");
            return Err(RoutingError::CodehashMismatch {
                selector,
                facet: route.facet,
                expected: route.codehash,
                actual: live,
            }
            .into());
        }

        let call = self
            .host
            .invoke(Invocation {
                target: route.facet,
                caller,
                selector,
                payload,
            })
            .await?;

        // Size is checked before the output is handed on to the caller.
        let size = call.output.len();
        if size > limit {
            return Err(ResourceLimitError::ReturnDataTooLarge { size, limit }.into());
        }

        debug!(facet = %route.facet, success = call.success, bytes = size, "Dispatched");
        Ok(DispatchOutcome {
            success: call.success,
            data: call.output,
            facet: route.facet,
        })
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Side-effect-free inspection of an emergency manifest payload.
    ///
    /// Never fails: a facet whose code cannot be read counts as codeless.
    pub async fn preflight_manifest(&self, data: &[u8]) -> PreflightError {
        let records = match preflight::decode_manifest(data, self.config.max_manifest_size) {
            Ok(records) => records,
            Err(code) => return code,
        };

        let facets: Vec<Address> = records.iter().map(|r| r.facet).collect();
        let code = self.snapshot_code_lenient(&facets).await;

        preflight::preflight_records(&records, &code, self.router, self.config.max_facet_code_size).code
    }

    /// Observable operational state.
    #[must_use]
    pub fn operational_state(&self) -> OperationalState {
        self.state.read().flags.state()
    }

    /// Paused/frozen bitmask.
    #[must_use]
    pub fn operational_flags(&self) -> u8 {
        self.state.read().flags.bits()
    }

    /// Active root and epoch.
    #[must_use]
    pub fn active_manifest(&self) -> ActiveManifest {
        self.state.read().manifests.active()
    }

    /// Staged root, if any.
    #[must_use]
    pub fn pending_manifest(&self) -> Option<PendingManifest> {
        self.state.read().manifests.pending()
    }

    /// Route bound to `selector`.
    #[must_use]
    pub fn route_of(&self, selector: Selector) -> Option<Route> {
        self.state.read().routes.get(&selector).copied()
    }

    /// Bound selectors, sorted.
    #[must_use]
    pub fn selectors(&self) -> Vec<Selector> {
        self.state.read().routes.selectors()
    }

    /// Distinct facet addresses, sorted.
    #[must_use]
    pub fn facet_addresses(&self) -> Vec<Address> {
        self.state.read().routes.facets()
    }

    /// Current return-data cap.
    #[must_use]
    pub fn max_return_data_size(&self) -> usize {
        self.state.read().max_return_data_size
    }

    /// Whether `account` holds `capability`.
    #[must_use]
    pub fn has_capability(&self, account: Address, capability: Capability) -> bool {
        self.state.read().access.has(&account, capability)
    }

    /// Hash of the last emergency manifest; zero if none.
    #[must_use]
    pub fn emergency_manifest_hash(&self) -> Hash {
        self.state.read().emergency_manifest_hash
    }
}

// =============================================================================
// API IMPLEMENTATION
// =============================================================================

#[async_trait]
impl<H: FacetHost + 'static> FacetRouterApi for FacetRouterService<H> {
    async fn commit_root(&self, caller: Address, root: Hash) -> Result<Epoch, RouterError> {
        FacetRouterService::commit_root(self, caller, root)
    }

    async fn activate_committed_root(&self, caller: Address, epoch: Epoch) -> Result<(), RouterError> {
        FacetRouterService::activate_committed_root(self, caller, epoch)
    }

    async fn apply_routes(&self, caller: Address, batch: RouteBatch) -> Result<(), RouterError> {
        FacetRouterService::apply_routes(self, caller, batch).await
    }

    async fn update_manifest(&self, caller: Address, hash: Hash, data: Bytes) -> Result<(), RouterError> {
        FacetRouterService::update_manifest(self, caller, hash, data).await
    }

    async fn remove_routes(&self, caller: Address, selectors: Vec<Selector>) -> Result<usize, RouterError> {
        FacetRouterService::remove_routes(self, caller, &selectors)
    }

    async fn pause(&self, caller: Address) -> Result<(), RouterError> {
        FacetRouterService::pause(self, caller)
    }

    async fn unpause(&self, caller: Address) -> Result<(), RouterError> {
        FacetRouterService::unpause(self, caller)
    }

    async fn freeze(&self, caller: Address) -> Result<(), RouterError> {
        FacetRouterService::freeze(self, caller)
    }

    async fn set_max_return_data_size(&self, caller: Address, limit: usize) -> Result<(), RouterError> {
        FacetRouterService::set_max_return_data_size(self, caller, limit)
    }

    async fn grant_capability(&self, caller: Address, account: Address, capability: Capability) -> Result<(), RouterError> {
        FacetRouterService::grant_capability(self, caller, account, capability)
    }

    async fn revoke_capability(&self, caller: Address, account: Address, capability: Capability) -> Result<(), RouterError> {
        FacetRouterService::revoke_capability(self, caller, account, capability)
    }

    async fn renounce_capability(&self, caller: Address, capability: Capability) -> Result<(), RouterError> {
        FacetRouterService::renounce_capability(self, caller, capability)
    }

    async fn route(&self, caller: Address, selector: Selector, payload: Bytes) -> Result<DispatchOutcome, RouterError> {
        FacetRouterService::route(self, caller, selector, payload).await
    }

    async fn preflight_manifest(&self, data: Bytes) -> PreflightError {
        FacetRouterService::preflight_manifest(self, data.as_slice()).await
    }

    fn operational_state(&self) -> OperationalState {
        FacetRouterService::operational_state(self)
    }

    fn operational_flags(&self) -> u8 {
        FacetRouterService::operational_flags(self)
    }

    fn active_manifest(&self) -> ActiveManifest {
        FacetRouterService::active_manifest(self)
    }

    fn pending_manifest(&self) -> Option<PendingManifest> {
        FacetRouterService::pending_manifest(self)
    }

    fn route_of(&self, selector: Selector) -> Option<Route> {
        FacetRouterService::route_of(self, selector)
    }

    fn selectors(&self) -> Vec<Selector> {
        FacetRouterService::selectors(self)
    }

    fn facet_addresses(&self) -> Vec<Address> {
        FacetRouterService::facet_addresses(self)
    }

    fn max_return_data_size(&self) -> usize {
        FacetRouterService::max_return_data_size(self)
    }

    fn has_capability(&self, account: Address, capability: Capability) -> bool {
        FacetRouterService::has_capability(self, account, capability)
    }

    fn emergency_manifest_hash(&self) -> Hash {
        FacetRouterService::emergency_manifest_hash(self)
    }
}

// =============================================================================
// TESTS
// =============================================================================
