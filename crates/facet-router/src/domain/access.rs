//! # Access Control
//!
//! Capability-set model. Each operation declares the capabilities it accepts;
//! the caller's held set is checked before the operation runs. Holding one
//! capability never implies another.

use crate::domain::value_objects::Address;
use crate::errors::AuthorizationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A grantable capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    /// Emergency manifest rewrite, limit changes, freeze.
    Admin,
    /// Stage manifest roots.
    Commit,
    /// Activate staged roots and apply verified routes.
    Apply,
    /// Pause/unpause, remove routes, freeze.
    Emergency,
    /// Grant and revoke capabilities.
    Executor,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 5] = [
        Self::Admin,
        Self::Commit,
        Self::Apply,
        Self::Emergency,
        Self::Executor,
    ];
}

/// Principal → held capabilities.
#[derive(Clone, Debug, Default)]
pub struct AccessControl {
    grants: HashMap<Address, BTreeSet<Capability>>,
}

impl AccessControl {
    /// Creates the deployment-time table: `admin` holds Admin and Executor,
    /// nobody else holds anything.
    #[must_use]
    pub fn with_admin(admin: Address) -> Self {
        let mut access = Self::default();
        access.grant(admin, Capability::Admin);
        access.grant(admin, Capability::Executor);
        access
    }

    /// Returns true if `account` holds `capability`.
    #[must_use]
    pub fn has(&self, account: &Address, capability: Capability) -> bool {
        self.grants
            .get(account)
            .is_some_and(|held| held.contains(&capability))
    }

    /// Requires `account` to hold `capability`.
    ///
    /// # Errors
    ///
    /// [`AuthorizationError::MissingCapability`] otherwise.
    pub fn require(&self, account: &Address, capability: Capability) -> Result<(), AuthorizationError> {
        self.require_any(account, &[capability])
    }

    /// Requires `account` to hold at least one of `accepted`.
    ///
    /// # Errors
    ///
    /// [`AuthorizationError::MissingCapability`] otherwise.
    pub fn require_any(
        &self,
        account: &Address,
        accepted: &[Capability],
    ) -> Result<(), AuthorizationError> {
        if accepted.iter().any(|cap| self.has(account, *cap)) {
            Ok(())
        } else {
            Err(AuthorizationError::MissingCapability {
                account: *account,
                required: accepted.to_vec(),
            })
        }
    }

    /// Grants `capability`. Returns false if already held.
    pub fn grant(&mut self, account: Address, capability: Capability) -> bool {
        self.grants.entry(account).or_default().insert(capability)
    }

    /// Revokes `capability`. Returns false if it was not held.
    pub fn revoke(&mut self, account: &Address, capability: Capability) -> bool {
        let Some(held) = self.grants.get_mut(account) else {
            return false;
        };
        let removed = held.remove(&capability);
        if held.is_empty() {
            self.grants.remove(account);
        }
        removed
    }

    /// Capabilities held by `account`.
    #[must_use]
    pub fn capabilities_of(&self, account: &Address) -> Vec<Capability> {
        self.grants
            .get(account)
            .map(|held| held.iter().copied().collect())
            .unwrap_or_default()
    }
}
