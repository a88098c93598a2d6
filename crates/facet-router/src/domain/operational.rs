//! # Operational State Machine
//!
//! Two independent flags, paused and frozen, and the four observable states
//! they combine into.
//!
//! ```text
//!   OPERATIONAL ──pause──▶ PAUSED
//!        ▲  │                │ ▲
//!        └──┼──unpause───────┘ │
//!           │                  │
//!        freeze             freeze
//!           ▼                  ▼
//!        FROZEN ───pause──▶ PAUSED_FROZEN
//!               ◀──unpause──
//! ```
//!
//! Frozen is one-way. No transition clears it.

use crate::errors::StateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bit set in [`OperationalFlags::bits`] while paused.
pub const FLAG_PAUSED: u8 = 0x01;

/// Bit set in [`OperationalFlags::bits`] while frozen.
pub const FLAG_FROZEN: u8 = 0x02;

/// Observable operational state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationalState {
    /// Neither paused nor frozen.
    Operational,
    /// Paused, not frozen.
    Paused,
    /// Frozen, not paused.
    Frozen,
    /// Both paused and frozen.
    PausedFrozen,
}

impl fmt::Display for OperationalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Operational => "OPERATIONAL",
            Self::Paused => "PAUSED",
            Self::Frozen => "FROZEN",
            Self::PausedFrozen => "PAUSED_FROZEN",
        };
        f.write_str(name)
    }
}

/// Operation classes the capability matrix distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Stage a manifest root.
    Commit,
    /// Promote the pending root.
    Activate,
    /// Write proof-verified routes.
    ApplyRoutes,
    /// Emergency manifest rewrite.
    UpdateManifest,
    /// Change the return-data cap.
    SetReturnDataLimit,
    /// Delete routes.
    RemoveRoutes,
    /// Forward a call to a facet.
    Dispatch,
}

/// The paused/frozen flag pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OperationalFlags {
    paused: bool,
    frozen: bool,
}

impl OperationalFlags {
    /// Deployment-time state: unpaused, unfrozen.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            paused: false,
            frozen: false,
        }
    }

    /// Returns true once frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Flag bitmask: [`FLAG_PAUSED`] | [`FLAG_FROZEN`].
    #[must_use]
    pub const fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.paused {
            bits |= FLAG_PAUSED;
        }
        if self.frozen {
            bits |= FLAG_FROZEN;
        }
        bits
    }

    /// Derived four-valued state.
    #[must_use]
    pub const fn state(&self) -> OperationalState {
        match (self.paused, self.frozen) {
            (false, false) => OperationalState::Operational,
            (true, false) => OperationalState::Paused,
            (false, true) => OperationalState::Frozen,
            (true, true) => OperationalState::PausedFrozen,
        }
    }

    /// Whether `operation` is allowed in the current state.
    ///
    /// | State | governance | remove | dispatch |
    /// |---|---|---|---|
    /// | OPERATIONAL | yes | yes | yes |
    /// | PAUSED | no | yes | no |
    /// | FROZEN | no | yes | yes |
    /// | PAUSED_FROZEN | no | yes | no |
    ///
    /// The return-data cap is an administrative setting: blocked only by freeze.
    #[must_use]
    pub const fn permits(&self, operation: Operation) -> bool {
        match operation {
            Operation::RemoveRoutes => true,
            Operation::Dispatch => !self.paused,
            Operation::SetReturnDataLimit => !self.frozen,
            Operation::Commit
            | Operation::Activate
            | Operation::ApplyRoutes
            | Operation::UpdateManifest => !self.paused && !self.frozen,
        }
    }

    /// Fails with [`StateError::OperationBlocked`] unless `operation` is permitted.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn ensure_permits(&self, operation: Operation) -> Result<(), StateError> {
        if self.permits(operation) {
            Ok(())
        } else {
            Err(StateError::OperationBlocked {
                operation,
                state: self.state(),
            })
        }
    }

    /// Sets paused.
    ///
    /// # Errors
    ///
    /// [`StateError::AlreadyPaused`] if already paused.
    pub fn pause(&mut self) -> Result<OperationalState, StateError> {
        if self.paused {
            return Err(StateError::AlreadyPaused);
        }
        self.paused = true;
        Ok(self.state())
    }

    /// Clears paused. Frozen is untouched.
    ///
    /// # Errors
    ///
    /// [`StateError::NotPaused`] if not paused.
    pub fn unpause(&mut self) -> Result<OperationalState, StateError> {
        if !self.paused {
            return Err(StateError::NotPaused);
        }
        self.paused = false;
        Ok(self.state())
    }

    /// Sets frozen. Irreversible.
    ///
    /// # Errors
    ///
    /// [`StateError::AlreadyFrozen`] if already frozen.
    pub fn freeze(&mut self) -> Result<OperationalState, StateError> {
        if self.frozen {
            return Err(StateError::AlreadyFrozen);
        }
        self.frozen = true;
        Ok(self.state())
    }
}
