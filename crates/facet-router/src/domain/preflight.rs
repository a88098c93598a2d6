//! # Manifest Preflight
//!
//! The stable [`PreflightError`] enumeration, the emergency manifest wire
//! format, and the side-effect-free checks run before `update_manifest`.
//!
//! ## Wire format
//!
//! A manifest payload is a concatenation of fixed 24-byte records:
//!
//! ```text
//! ┌──────────────┬──────────────────────────┐
//! │ selector (4) │ facet address (20)       │  × N, N ≥ 1
//! └──────────────┴──────────────────────────┘
//! ```
//!
//! Codehashes are not carried: the emergency path pins whatever code the
//! facet holds at write time.

use crate::domain::invariants::check_facet_binding;
use crate::domain::invariants::limits::MANIFEST_RECORD_SIZE;
use crate::domain::value_objects::{Address, Bytes, Selector};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Preflight verdict.
///
/// Ordinals are part of the external contract. Never reorder or remove a
/// variant; new conditions take the next unused ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PreflightError {
    /// Manifest is acceptable.
    Ok = 0,
    /// Payload exceeds the configured maximum.
    TooLarge = 1,
    /// Payload is empty or not a whole number of records.
    BadFormat = 2,
    /// A record carries the zero selector.
    InvalidSelector = 3,
    /// A record carries the zero facet address.
    ZeroFacetAddress = 4,
    /// A record routes to the router itself.
    FacetIsSelf = 5,
    /// A record's facet has no code.
    ZeroCodeFacet = 6,
    /// A record's facet code exceeds the size bound.
    CodeSizeExceeded = 7,
    /// Two records share a selector.
    DuplicateSelector = 8,
}

impl PreflightError {
    /// Stable ordinal.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Inverse of [`ordinal`](Self::ordinal).
    #[must_use]
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        Some(match ordinal {
            0 => Self::Ok,
            1 => Self::TooLarge,
            2 => Self::BadFormat,
            3 => Self::InvalidSelector,
            4 => Self::ZeroFacetAddress,
            5 => Self::FacetIsSelf,
            6 => Self::ZeroCodeFacet,
            7 => Self::CodeSizeExceeded,
            8 => Self::DuplicateSelector,
            _ => return None,
        })
    }

    /// Returns true for [`PreflightError::Ok`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// The mutating-path error for a failed per-facet check.
    ///
    /// Returns None for `Ok` and for the payload-level codes, which have no
    /// single facet to blame.
    #[must_use]
    pub fn to_binding_error(
        self,
        selector: Selector,
        facet: Address,
        code_len: usize,
        max_code_size: usize,
    ) -> Option<ValidationError> {
        match self {
            Self::InvalidSelector => Some(ValidationError::InvalidSelector(selector)),
            Self::ZeroFacetAddress => Some(ValidationError::ZeroFacetAddress { selector }),
            Self::FacetIsSelf => Some(ValidationError::FacetIsSelf { selector }),
            Self::ZeroCodeFacet => Some(ValidationError::ZeroCodeFacet { selector, facet }),
            Self::CodeSizeExceeded => Some(ValidationError::CodeSizeExceeded {
                selector,
                size: code_len,
                max: max_code_size,
            }),
            Self::DuplicateSelector => Some(ValidationError::DuplicateSelector(selector)),
            Self::Ok | Self::TooLarge | Self::BadFormat => None,
        }
    }
}

/// One record of an emergency manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ManifestRecord {
    /// Selector to bind.
    pub selector: Selector,
    /// Facet to bind it to.
    pub facet: Address,
}

/// Preflight verdict plus the first offending selector, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreflightReport {
    /// Verdict.
    pub code: PreflightError,
    /// Selector of the first failing record.
    pub selector: Option<Selector>,
}

impl PreflightReport {
    /// A passing report.
    pub const OK: Self = Self {
        code: PreflightError::Ok,
        selector: None,
    };
}

/// Encodes records into the wire format.
#[must_use]
pub fn encode_manifest(records: &[ManifestRecord]) -> Vec<u8> {
    let mut data = Vec::with_capacity(records.len() * MANIFEST_RECORD_SIZE);
    for record in records {
        data.extend_from_slice(record.selector.as_bytes());
        data.extend_from_slice(record.facet.as_bytes());
    }
    data
}

/// Decodes a payload, checking only size and framing.
///
/// # Errors
///
/// [`PreflightError::TooLarge`] above `max_size` (checked first), then
/// [`PreflightError::BadFormat`] for an empty or misaligned payload.
pub fn decode_manifest(data: &[u8], max_size: usize) -> Result<Vec<ManifestRecord>, PreflightError> {
    if data.len() > max_size {
        return Err(PreflightError::TooLarge);
    }
    if data.is_empty() || data.len() % MANIFEST_RECORD_SIZE != 0 {
        return Err(PreflightError::BadFormat);
    }
    data.chunks_exact(MANIFEST_RECORD_SIZE)
        .map(|chunk| {
            let (selector, facet) = chunk.split_at(4);
            match (Selector::from_slice(selector), Address::from_slice(facet)) {
                (Some(selector), Some(facet)) => Ok(ManifestRecord { selector, facet }),
                _ => Err(PreflightError::BadFormat),
            }
        })
        .collect()
}

/// Runs the per-record checks against a snapshot of facet code.
///
/// Facets absent from `code` are treated as having no code. Records are
/// checked in order; the first failure wins. Duplicate selectors are only
/// reported once every record has passed its own checks.
#[must_use]
pub fn preflight_records(
    records: &[ManifestRecord],
    code: &HashMap<Address, Bytes>,
    router: Address,
    max_code_size: usize,
) -> PreflightReport {
    for record in records {
        let facet_code = code.get(&record.facet).map_or(&[][..], Bytes::as_slice);
        let verdict = check_facet_binding(
            record.selector,
            record.facet,
            facet_code,
            router,
            max_code_size,
        );
        if !verdict.is_ok() {
            return PreflightReport {
                code: verdict,
                selector: Some(record.selector),
            };
        }
    }

    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.selector) {
            return PreflightReport {
                code: PreflightError::DuplicateSelector,
                selector: Some(record.selector),
            };
        }
    }
    PreflightReport::OK
}
