//! # Driven Ports (SPI - Outbound)
//!
//! What the router needs from the outside world:
//! - Facet code, to pin and re-check codehashes
//! - A way to invoke a facet with the caller's context intact
//! - A clock for the activation timelock
//! - Somewhere to publish events
//!
//! Adapters implement these traits; the router never reaches past them.

use crate::domain::entities::{FacetCall, Invocation};
use crate::domain::value_objects::{code_hash, Address, Bytes, Hash, Timestamp};
use crate::errors::HostError;
use crate::events::RouterEvent;
use async_trait::async_trait;

// =============================================================================
// FACET CODE
// =============================================================================

/// Read access to facet code.
#[async_trait]
pub trait FacetCodeSource: Send + Sync {
    /// Code deployed at `address`. Empty if there is none.
    async fn get_code(&self, address: Address) -> Result<Bytes, HostError>;

    /// Codehash at `address`; [`EMPTY_CODE_HASH`](crate::domain::EMPTY_CODE_HASH)
    /// if there is no code.
    async fn get_code_hash(&self, address: Address) -> Result<Hash, HostError> {
        let code = self.get_code(address).await?;
        Ok(code_hash(code.as_slice()))
    }
}

// =============================================================================
// FACET INVOCATION
// =============================================================================

/// Context-preserving forwarding.
///
/// Implementations MUST deliver `caller` and `payload` to the facet
/// unmodified. A facet that reverts is reported as `FacetCall { success:
/// false, .. }`; `Err` is reserved for the host itself failing.
#[async_trait]
pub trait FacetInvoker: Send + Sync {
    /// Invokes `invocation.target`.
    async fn invoke(&self, invocation: Invocation) -> Result<FacetCall, HostError>;
}

/// A host that can both serve code and invoke facets.
pub trait FacetHost: FacetCodeSource + FacetInvoker {}

impl<T: FacetCodeSource + FacetInvoker> FacetHost for T {}

// =============================================================================
// TIME
// =============================================================================

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// EVENTS
// =============================================================================

/// Receives committed router events.
pub trait RouterEventSink: Send + Sync {
    /// Publishes `event`. Must not fail the operation that produced it.
    fn emit(&self, event: RouterEvent);
}
