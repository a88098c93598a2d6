//! # Router Events
//!
//! Emitted through the [`RouterEventSink`](crate::ports::outbound::RouterEventSink)
//! port after a mutation has fully committed. A rejected operation emits
//! nothing.

use crate::domain::access::Capability;
use crate::domain::operational::OperationalState;
use crate::domain::value_objects::{Address, Epoch, Hash, Selector, Timestamp};
use serde::{Deserialize, Serialize};

/// Event topics, for sinks that fan out by name.
pub mod topics {
    /// Governance pipeline (commit, activate, apply).
    pub const GOVERNANCE: &str = "router.governance";
    /// Route table changes outside the pipeline.
    pub const ROUTES: &str = "router.routes";
    /// Pause, unpause, freeze.
    pub const EMERGENCY: &str = "router.emergency";
    /// Limits and capabilities.
    pub const ADMIN: &str = "router.admin";
}

/// Something the router did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouterEvent {
    /// A root was staged.
    RootCommitted {
        root: Hash,
        epoch: Epoch,
        earliest_activation: Timestamp,
        by: Address,
    },
    /// The pending root became active.
    RootActivated { root: Hash, epoch: Epoch, by: Address },
    /// Proof-verified routes were written.
    RoutesApplied {
        selectors: Vec<Selector>,
        root: Hash,
        by: Address,
    },
    /// Routes were deleted.
    RoutesRemoved { selectors: Vec<Selector>, by: Address },
    /// The emergency path replaced the route table.
    ManifestUpdated {
        hash: Hash,
        routes: usize,
        by: Address,
    },
    /// Dispatch stopped.
    Paused { state: OperationalState, by: Address },
    /// Dispatch resumed (unless frozen governance persists).
    Unpaused { state: OperationalState, by: Address },
    /// Governance permanently stopped.
    Frozen { state: OperationalState, by: Address },
    /// Return-data cap changed.
    MaxReturnDataSizeChanged {
        previous: usize,
        current: usize,
        by: Address,
    },
    /// Capability granted.
    CapabilityGranted {
        account: Address,
        capability: Capability,
        by: Address,
    },
    /// Capability revoked or renounced.
    CapabilityRevoked {
        account: Address,
        capability: Capability,
        by: Address,
    },
}

impl RouterEvent {
    /// Topic this event belongs to.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::RootCommitted { .. } | Self::RootActivated { .. } | Self::RoutesApplied { .. } => {
                topics::GOVERNANCE
            }
            Self::RoutesRemoved { .. } | Self::ManifestUpdated { .. } => topics::ROUTES,
            Self::Paused { .. } | Self::Unpaused { .. } | Self::Frozen { .. } => topics::EMERGENCY,
            Self::MaxReturnDataSizeChanged { .. }
            | Self::CapabilityGranted { .. }
            | Self::CapabilityRevoked { .. } => topics::ADMIN,
        }
    }

    /// Short event name, as used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RootCommitted { .. } => "root_committed",
            Self::RootActivated { .. } => "root_activated",
            Self::RoutesApplied { .. } => "routes_applied",
            Self::RoutesRemoved { .. } => "routes_removed",
            Self::ManifestUpdated { .. } => "manifest_updated",
            Self::Paused { .. } => "paused",
            Self::Unpaused { .. } => "unpaused",
            Self::Frozen { .. } => "frozen",
            Self::MaxReturnDataSizeChanged { .. } => "max_return_data_size_changed",
            Self::CapabilityGranted { .. } => "capability_granted",
            Self::CapabilityRevoked { .. } => "capability_revoked",
        }
    }
}
