//! # Error Types
//!
//! Every failure a router operation can surface, grouped by kind.
//! Mutating operations return [`RouterError`]; the per-kind enums convert into
//! it with `?`.

use crate::domain::access::Capability;
use crate::domain::operational::{Operation, OperationalState};
use crate::domain::preflight::PreflightError;
use crate::domain::value_objects::{Address, Epoch, Hash, Selector, Timestamp};
use thiserror::Error;

// =============================================================================
// ROUTER ERROR
// =============================================================================

/// Top-level error returned by the router API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// Malformed input or a facet that fails its checks.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Caller lacks the required capability.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// Operation forbidden in the current state.
    #[error(transparent)]
    State(#[from] StateError),

    /// Merkle verification failure.
    #[error(transparent)]
    Proof(#[from] ProofError),

    /// Dispatch could not be routed.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Configured resource bound exceeded.
    #[error(transparent)]
    ResourceLimit(#[from] ResourceLimitError),

    /// The facet host itself failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Coarse classification of a [`RouterError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ValidationError`].
    Validation,
    /// See [`AuthorizationError`].
    Authorization,
    /// See [`StateError`].
    State,
    /// See [`ProofError`].
    Proof,
    /// See [`RoutingError`].
    Routing,
    /// See [`ResourceLimitError`].
    ResourceLimit,
    /// See [`HostError`].
    Host,
}

impl RouterError {
    /// Returns the error kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::State(_) => ErrorKind::State,
            Self::Proof(_) => ErrorKind::Proof,
            Self::Routing(_) => ErrorKind::Routing,
            Self::ResourceLimit(_) => ErrorKind::ResourceLimit,
            Self::Host(_) => ErrorKind::Host,
        }
    }
}

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

/// Malformed manifests, batches and facets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The zero hash cannot be committed as a manifest root.
    #[error("manifest root must be non-zero")]
    ZeroRoot,

    /// A route batch must contain at least one entry.
    #[error("route batch is empty")]
    EmptyBatch,

    /// Parallel input arrays differ in length.
    #[error(
        "array length mismatch: selectors={selectors}, facets={facets}, \
         codehashes={codehashes}, proofs={proofs}, positions={positions}"
    )]
    ArrayLengthMismatch {
        selectors: usize,
        facets: usize,
        codehashes: usize,
        proofs: usize,
        positions: usize,
    },

    /// The zero selector is never routable.
    #[error("invalid selector: {0}")]
    InvalidSelector(Selector),

    /// Facet address is zero.
    #[error("zero facet address for selector {selector}")]
    ZeroFacetAddress { selector: Selector },

    /// Facet address is the router itself.
    #[error("selector {selector} routes to the router itself")]
    FacetIsSelf { selector: Selector },

    /// Facet has no code.
    #[error("facet {facet:?} for selector {selector} has no code")]
    ZeroCodeFacet { selector: Selector, facet: Address },

    /// Facet code exceeds the size bound.
    #[error("facet code for selector {selector} too large: {size} > {max} bytes")]
    CodeSizeExceeded {
        selector: Selector,
        size: usize,
        max: usize,
    },

    /// Selector repeats within one batch or manifest.
    #[error("duplicate selector in batch: {0}")]
    DuplicateSelector(Selector),

    /// Manifest codehash does not match the facet's live code.
    #[error("codehash mismatch for selector {selector}: manifest {expected:?}, live {actual:?}")]
    CodehashMismatch {
        selector: Selector,
        expected: Hash,
        actual: Hash,
    },

    /// Emergency manifest payload does not hash to the supplied hash.
    #[error("manifest hash mismatch: supplied {supplied:?}, computed {computed:?}")]
    ManifestHashMismatch { supplied: Hash, computed: Hash },

    /// Emergency manifest failed preflight.
    #[error("manifest preflight failed: {code:?} (selector {selector:?})")]
    Preflight {
        code: PreflightError,
        selector: Option<Selector>,
    },
}

// =============================================================================
// AUTHORIZATION ERRORS
// =============================================================================

/// Capability checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// Caller holds none of the capabilities the operation accepts.
    #[error("account {account:?} lacks capability {required:?}")]
    MissingCapability {
        account: Address,
        required: Vec<Capability>,
    },
}

// =============================================================================
// STATE ERRORS
// =============================================================================

/// Operations forbidden by the operational or governance state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The operational state forbids this operation.
    #[error("{operation:?} is blocked while {state}")]
    OperationBlocked {
        operation: Operation,
        state: OperationalState,
    },

    /// Pause requested while already paused.
    #[error("router is already paused")]
    AlreadyPaused,

    /// Unpause requested while not paused.
    #[error("router is not paused")]
    NotPaused,

    /// Freeze requested while already frozen.
    #[error("router is already frozen")]
    AlreadyFrozen,

    /// Activation requested with nothing staged.
    #[error("no pending manifest root")]
    NoPendingRoot,

    /// Activation requested for the wrong epoch.
    #[error("epoch mismatch: pending {pending}, requested {requested}")]
    EpochMismatch { pending: Epoch, requested: Epoch },

    /// Activation requested before the timelock elapsed.
    #[error("timelock active: now {now} < earliest activation {earliest}")]
    TimelockActive { now: Timestamp, earliest: Timestamp },

    /// Entry while another operation is in flight: a facet calling back in
    /// during dispatch, or an overlapping call from another task.
    #[error("reentrant call rejected: another router operation is in flight")]
    ReentrantCall,
}

// =============================================================================
// PROOF ERRORS
// =============================================================================

/// Merkle proof failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// Proof longer than the verifier accepts.
    #[error("proof too long: {len} > {max} nodes")]
    ProofTooLong { len: usize, max: usize },

    /// Position bits set beyond the proof length.
    #[error("position bits set beyond proof length {len}")]
    PositionsOutOfRange { len: usize },

    /// Legacy flag array does not match the proof length.
    #[error("flag count {flags} does not match proof length {proof}")]
    FlagsLengthMismatch { proof: usize, flags: usize },

    /// Neither a pending nor an active root exists.
    #[error("no authoritative manifest root")]
    NoAuthoritativeRoot,

    /// Route leaf does not fold to the authoritative root.
    #[error("proof for selector {selector} does not match root {root:?}")]
    RootMismatch { selector: Selector, root: Hash },
}

// =============================================================================
// ROUTING ERRORS
// =============================================================================

/// Dispatch-time failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// No facet is bound to the selector.
    #[error("no route for selector {0}")]
    NoRoute(Selector),

    /// Dispatch is disabled while paused.
    #[error("dispatch blocked while {0}")]
    DispatchPaused(OperationalState),

    /// Facet code changed after the route was applied.
    #[error("codehash drift for selector {selector} at {facet:?}: expected {expected:?}, live {actual:?}")]
    CodehashMismatch {
        selector: Selector,
        facet: Address,
        expected: Hash,
        actual: Hash,
    },
}

// =============================================================================
// RESOURCE LIMIT ERRORS
// =============================================================================

/// Configured bounds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceLimitError {
    /// Facet returned more data than the configured cap.
    #[error("return data too large: {size} > {limit} bytes")]
    ReturnDataTooLarge { size: usize, limit: usize },

    /// Requested cap outside the accepted range.
    #[error("return data limit {requested} outside [{min}, {max}]")]
    ReturnDataLimitOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },
}

// =============================================================================
// HOST ERRORS
// =============================================================================

/// Failures of the outbound facet host (not of the facet's own logic).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Code lookup could not be served.
    #[error("facet code unavailable: {0}")]
    CodeUnavailable(String),

    /// The host could not perform the invocation at all.
    #[error("invocation failed: {0}")]
    InvocationFailed(String),
}

// =============================================================================
// TESTS
// =============================================================================
