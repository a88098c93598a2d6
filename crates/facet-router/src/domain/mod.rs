//! # Domain Layer (Inner Hexagon)
//!
//! Pure routing and governance logic.
//! NO I/O, NO async: facet code and time arrive as plain arguments.
//!
//! Dependencies point INWARD only; the service and adapters depend on this
//! module, never the reverse.

pub mod access;
pub mod entities;
pub mod invariants;
pub mod manifest;
pub mod manifest_tree;
pub mod operational;
pub mod preflight;
pub mod proof;
pub mod route_table;
pub mod value_objects;

pub use access::{AccessControl, Capability};
pub use entities::*;
pub use invariants::*;
pub use manifest::ManifestStore;
pub use manifest_tree::{LeafProof, ManifestTree};
pub use operational::{Operation, OperationalFlags, OperationalState, FLAG_FROZEN, FLAG_PAUSED};
pub use preflight::{ManifestRecord, PreflightError, PreflightReport};
pub use route_table::RouteTable;
pub use value_objects::*;
