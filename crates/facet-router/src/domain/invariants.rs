//! # Domain Invariants
//!
//! Checks that MUST hold for every route the router writes, plus the fixed
//! limits those checks enforce.
//!
//! - INVARIANT-1: Selector non-zero
//! - INVARIANT-2: Facet non-zero and not the router itself
//! - INVARIANT-3: Facet code nonempty and within the size bound
//! - INVARIANT-4: Recorded codehash equals live codehash at call time
//! - INVARIANT-5: Frozen is never cleared

use crate::domain::entities::Route;
use crate::domain::preflight::PreflightError;
use crate::domain::value_objects::{Address, Hash, Selector};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// INVARIANT-1 through INVARIANT-3 for a single (selector, facet, code) triple.
///
/// Checks run in ordinal order of [`PreflightError`], so the first violation
/// reported is always the lowest-numbered one.
#[must_use]
pub fn check_facet_binding(
    selector: Selector,
    facet: Address,
    code: &[u8],
    router: Address,
    max_code_size: usize,
) -> PreflightError {
    if selector.is_zero() {
        return PreflightError::InvalidSelector;
    }
    if facet.is_zero() {
        return PreflightError::ZeroFacetAddress;
    }
    if facet == router {
        return PreflightError::FacetIsSelf;
    }
    if code.is_empty() {
        return PreflightError::ZeroCodeFacet;
    }
    if code.len() > max_code_size {
        return PreflightError::CodeSizeExceeded;
    }
    PreflightError::Ok
}

/// INVARIANT-4: the facet's live codehash still equals the pinned one.
#[must_use]
pub fn check_codehash_pinned(route: &Route, live_codehash: &Hash) -> bool {
    *live_codehash == route.codehash
}

/// INVARIANT-5: a transition never clears frozen.
#[must_use]
pub fn check_frozen_sticky(was_frozen: bool, is_frozen: bool) -> bool {
    !was_frozen || is_frozen
}

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Router limits.
pub mod limits {
    /// Maximum nodes in a Merkle proof.
    pub const MAX_PROOF_LENGTH: usize = 256;

    /// Default cap on facet return data.
    pub const DEFAULT_MAX_RETURN_DATA_SIZE: usize = 32_768;

    /// Smallest accepted return-data cap.
    pub const MIN_RETURN_DATA_LIMIT: usize = 1;

    /// Largest accepted return-data cap.
    pub const MAX_RETURN_DATA_LIMIT: usize = 1_000_000;

    /// Maximum facet code size in bytes (EIP-170).
    pub const MAX_FACET_CODE_SIZE: usize = 24_576; // 24 KB

    /// Bytes per emergency manifest record: selector (4) + facet (20).
    pub const MANIFEST_RECORD_SIZE: usize = 24;

    /// Default maximum emergency manifest size (1024 records).
    pub const MAX_MANIFEST_SIZE: usize = MANIFEST_RECORD_SIZE * 1024;

    /// Development default for the commit-to-activate delay, in seconds.
    pub const DEFAULT_TIMELOCK_DELAY_SECS: u64 = 3600;
}

// =============================================================================
// TESTS
// =============================================================================
