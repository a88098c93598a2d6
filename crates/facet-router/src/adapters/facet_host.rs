//! # In-Memory Facet Host
//!
//! Facet code and behaviour held in process memory. Serves both outbound
//! facet ports; used by tests and by embedders that host facets in-process.

use crate::domain::entities::{FacetCall, Invocation};
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::HostError;
use crate::ports::outbound::{FacetCodeSource, FacetInvoker};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// What a hosted facet does when invoked.
#[async_trait]
pub trait FacetBehavior: Send + Sync {
    /// Handles one invocation.
    async fn call(&self, invocation: Invocation) -> FacetCall;
}

/// Returns the payload it was given.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoFacet;

#[async_trait]
impl FacetBehavior for EchoFacet {
    async fn call(&self, invocation: Invocation) -> FacetCall {
        FacetCall::ok(invocation.payload)
    }
}

/// Always returns the same outcome.
#[derive(Debug, Clone)]
pub struct StaticFacet {
    outcome: FacetCall,
}

impl StaticFacet {
    /// Succeeds with `output`.
    #[must_use]
    pub fn returning(output: impl Into<Bytes>) -> Self {
        Self {
            outcome: FacetCall::ok(output),
        }
    }

    /// Reverts with `output`.
    #[must_use]
    pub fn reverting(output: impl Into<Bytes>) -> Self {
        Self {
            outcome: FacetCall::revert(output),
        }
    }
}

#[async_trait]
impl FacetBehavior for StaticFacet {
    async fn call(&self, _invocation: Invocation) -> FacetCall {
        self.outcome.clone()
    }
}

/// Records every invocation and echoes the payload.
#[derive(Debug, Default)]
pub struct RecordingFacet {
    seen: Mutex<Vec<Invocation>>,
}

impl RecordingFacet {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations received so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl FacetBehavior for RecordingFacet {
    async fn call(&self, invocation: Invocation) -> FacetCall {
        let output = invocation.payload.clone();
        self.seen.lock().push(invocation);
        FacetCall::ok(output)
    }
}

struct HostedFacet {
    code: Bytes,
    behavior: Arc<dyn FacetBehavior>,
}

/// Facets keyed by address.
#[derive(Default)]
pub struct InMemoryFacetHost {
    facets: RwLock<HashMap<Address, HostedFacet>>,
    offline: RwLock<bool>,
}

impl InMemoryFacetHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploys (or redeploys) a facet at `address`.
    pub fn deploy(&self, address: Address, code: impl Into<Bytes>, behavior: Arc<dyn FacetBehavior>) {
        self.facets.write().insert(
            address,
            HostedFacet {
                code: code.into(),
                behavior,
            },
        );
    }

    /// Replaces the code at `address`, keeping its behaviour. Returns false if
    /// nothing is deployed there.
    pub fn set_code(&self, address: Address, code: impl Into<Bytes>) -> bool {
        match self.facets.write().get_mut(&address) {
            Some(facet) => {
                facet.code = code.into();
                true
            }
            None => false,
        }
    }

    /// Removes the facet at `address`.
    pub fn destroy(&self, address: &Address) -> bool {
        self.facets.write().remove(address).is_some()
    }

    /// Simulates the host becoming unreachable.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.write() = offline;
    }

    fn ensure_online(&self) -> Result<(), HostError> {
        if *self.offline.read() {
            Err(HostError::CodeUnavailable("host offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FacetCodeSource for InMemoryFacetHost {
    async fn get_code(&self, address: Address) -> Result<Bytes, HostError> {
        self.ensure_online()?;
        Ok(self
            .facets
            .read()
            .get(&address)
            .map(|f| f.code.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl FacetInvoker for InMemoryFacetHost {
    async fn invoke(&self, invocation: Invocation) -> Result<FacetCall, HostError> {
        if *self.offline.read() {
            return Err(HostError::InvocationFailed("host offline".to_string()));
        }
        let behavior = self
            .facets
            .read()
            .get(&invocation.target)
            .map(|f| Arc::clone(&f.behavior))
            .ok_or_else(|| {
                HostError::InvocationFailed(format!("no facet at {:?}", invocation.target))
            })?;
        Ok(behavior.call(invocation).await)
    }
}
