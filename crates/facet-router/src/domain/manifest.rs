//! # Manifest Store
//!
//! Active root/epoch plus at most one pending root. Capability and
//! operational-state checks happen in the service before these methods run.

use crate::domain::entities::{ActiveManifest, PendingManifest};
use crate::domain::value_objects::{Epoch, Hash, Timestamp};
use crate::errors::{ProofError, StateError, ValidationError};

/// Governance pipeline state.
#[derive(Clone, Debug, Default)]
pub struct ManifestStore {
    active: ActiveManifest,
    pending: Option<PendingManifest>,
}

impl ManifestStore {
    /// Deployment-time store: zero root at epoch 0, nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active manifest.
    #[must_use]
    pub fn active(&self) -> ActiveManifest {
        self.active
    }

    /// The pending manifest, if any.
    #[must_use]
    pub fn pending(&self) -> Option<PendingManifest> {
        self.pending
    }

    /// Stages `root` for epoch `active + 1`, activatable at `now + delay`.
    ///
    /// Replaces any pending root that was never activated.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ZeroRoot`] for the zero hash.
    pub fn commit(
        &mut self,
        root: Hash,
        now: Timestamp,
        delay_secs: u64,
    ) -> Result<PendingManifest, ValidationError> {
        if root.is_zero() {
            return Err(ValidationError::ZeroRoot);
        }
        let pending = PendingManifest {
            root,
            epoch: self.active.epoch.saturating_add(1),
            earliest_activation: now.saturating_add(delay_secs),
        };
        self.pending = Some(pending);
        Ok(pending)
    }

    /// Checks that `epoch` could be activated at `now` without changing state.
    ///
    /// # Errors
    ///
    /// - [`StateError::NoPendingRoot`] if nothing is staged.
    /// - [`StateError::EpochMismatch`] if `epoch` is not the staged epoch.
    /// - [`StateError::TimelockActive`] if `now` is before the earliest activation.
    pub fn check_activation(&self, epoch: Epoch, now: Timestamp) -> Result<PendingManifest, StateError> {
        let pending = self.pending.ok_or(StateError::NoPendingRoot)?;
        if pending.epoch != epoch {
            return Err(StateError::EpochMismatch {
                pending: pending.epoch,
                requested: epoch,
            });
        }
        if now < pending.earliest_activation {
            return Err(StateError::TimelockActive {
                now,
                earliest: pending.earliest_activation,
            });
        }
        Ok(pending)
    }

    /// Promotes the pending root to active and clears pending.
    ///
    /// # Errors
    ///
    /// Same as [`check_activation`](Self::check_activation); state is unchanged on error.
    pub fn activate(&mut self, epoch: Epoch, now: Timestamp) -> Result<ActiveManifest, StateError> {
        let pending = self.check_activation(epoch, now)?;
        self.active = ActiveManifest {
            root: pending.root,
            epoch: pending.epoch,
        };
        self.pending = None;
        Ok(self.active)
    }

    /// Root that route proofs are checked against: pending if staged, else active.
    ///
    /// # Errors
    ///
    /// [`ProofError::NoAuthoritativeRoot`] before the first commit.
    pub fn authoritative_root(&self) -> Result<Hash, ProofError> {
        match self.pending {
            Some(pending) => Ok(pending.root),
            None if !self.active.root.is_zero() => Ok(self.active.root),
            None => Err(ProofError::NoAuthoritativeRoot),
        }
    }
}
