//! # Domain Entities
//!
//! Routes, governance manifests and the dispatch envelope.

use crate::domain::value_objects::{Address, Bytes, Epoch, Hash, Selector, Timestamp, U256};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};

// =============================================================================
// ROUTES
// =============================================================================

/// A live binding in the route table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Routed selector.
    pub selector: Selector,
    /// Facet the selector forwards to.
    pub facet: Address,
    /// Codehash pinned at apply time.
    pub codehash: Hash,
}

/// One proof-carrying entry of an `apply_routes` batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    /// Selector to bind.
    pub selector: Selector,
    /// Target facet.
    pub facet: Address,
    /// Codehash the manifest commits to.
    pub codehash: Hash,
    /// Sibling hashes, leaf level first.
    pub proof: Vec<Hash>,
    /// Position bitfield for `proof`.
    pub positions: U256,
}

impl RouteEntry {
    /// The route this entry writes once verified.
    #[must_use]
    pub fn route(&self) -> Route {
        Route {
            selector: self.selector,
            facet: self.facet,
            codehash: self.codehash,
        }
    }
}

/// An all-or-nothing batch of route entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteBatch {
    entries: Vec<RouteEntry>,
}

impl RouteBatch {
    /// Wraps a list of entries.
    #[must_use]
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }

    /// Zips the parallel-array calling convention into a batch.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ArrayLengthMismatch`] if the arrays differ in length.
    pub fn from_parallel(
        selectors: Vec<Selector>,
        facets: Vec<Address>,
        codehashes: Vec<Hash>,
        proofs: Vec<Vec<Hash>>,
        positions: Vec<U256>,
    ) -> Result<Self, ValidationError> {
        let n = selectors.len();
        if [facets.len(), codehashes.len(), proofs.len(), positions.len()]
            .iter()
            .any(|len| *len != n)
        {
            return Err(ValidationError::ArrayLengthMismatch {
                selectors: n,
                facets: facets.len(),
                codehashes: codehashes.len(),
                proofs: proofs.len(),
                positions: positions.len(),
            });
        }

        let entries = selectors
            .into_iter()
            .zip(facets)
            .zip(codehashes)
            .zip(proofs)
            .zip(positions)
            .map(|((((selector, facet), codehash), proof), positions)| RouteEntry {
                selector,
                facet,
                codehash,
                proof,
                positions,
            })
            .collect();
        Ok(Self { entries })
    }

    /// Entries in submission order.
    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selectors in submission order.
    #[must_use]
    pub fn selectors(&self) -> Vec<Selector> {
        self.entries.iter().map(|e| e.selector).collect()
    }
}

// =============================================================================
// MANIFESTS
// =============================================================================

/// A staged root awaiting activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingManifest {
    /// Staged root.
    pub root: Hash,
    /// Epoch the root occupies once activated.
    pub epoch: Epoch,
    /// Activation fails before this instant.
    pub earliest_activation: Timestamp,
}

/// The root currently governing live routing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveManifest {
    /// Active root. Zero before the first activation.
    pub root: Hash,
    /// Active epoch. Zero before the first activation.
    pub epoch: Epoch,
}

// =============================================================================
// DISPATCH
// =============================================================================

/// A context-preserving forward to a facet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Facet being invoked.
    pub target: Address,
    /// Original caller, passed through unmodified.
    pub caller: Address,
    /// Routed selector.
    pub selector: Selector,
    /// Original argument bytes, passed through unmodified.
    pub payload: Bytes,
}

/// Raw outcome of a facet invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetCall {
    /// Whether the facet completed without reverting.
    pub success: bool,
    /// Raw output bytes.
    pub output: Bytes,
}

impl FacetCall {
    /// Successful call returning `output`.
    #[must_use]
    pub fn ok(output: impl Into<Bytes>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    /// Reverted call returning `output`.
    #[must_use]
    pub fn revert(output: impl Into<Bytes>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Result handed back to the router's caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Facet success flag.
    pub success: bool,
    /// Facet output, within the configured cap.
    pub data: Bytes,
    /// Facet that served the call.
    pub facet: Address,
}
