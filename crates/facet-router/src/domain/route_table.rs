//! # Route Table
//!
//! Selector → (facet, expected codehash). Reads are free; writes come only
//! from apply, remove and the emergency manifest rewrite.

use crate::domain::entities::Route;
use crate::domain::value_objects::{Address, Selector};
use std::collections::{BTreeSet, HashMap};

/// The live route table.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: HashMap<Selector, Route>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route bound to `selector`.
    #[must_use]
    pub fn get(&self, selector: &Selector) -> Option<&Route> {
        self.routes.get(selector)
    }

    /// Number of bound selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no selector is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Bound selectors, sorted.
    #[must_use]
    pub fn selectors(&self) -> Vec<Selector> {
        let mut selectors: Vec<Selector> = self.routes.keys().copied().collect();
        selectors.sort();
        selectors
    }

    /// Distinct facet addresses, sorted.
    #[must_use]
    pub fn facets(&self) -> Vec<Address> {
        self.routes
            .values()
            .map(|r| r.facet)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Selectors routed to `facet`, sorted.
    #[must_use]
    pub fn selectors_of(&self, facet: &Address) -> Vec<Selector> {
        let mut selectors: Vec<Selector> = self
            .routes
            .values()
            .filter(|r| r.facet == *facet)
            .map(|r| r.selector)
            .collect();
        selectors.sort();
        selectors
    }

    /// Writes a fully validated batch, overwriting existing bindings.
    pub fn insert_all(&mut self, routes: impl IntoIterator<Item = Route>) {
        for route in routes {
            self.routes.insert(route.selector, route);
        }
    }

    /// Replaces the whole table.
    pub fn replace_all(&mut self, routes: impl IntoIterator<Item = Route>) {
        self.routes = routes.into_iter().map(|r| (r.selector, r)).collect();
    }

    /// Deletes the named selectors. Missing entries are skipped.
    ///
    /// Returns the selectors that were actually removed.
    pub fn remove_all(&mut self, selectors: &[Selector]) -> Vec<Selector> {
        selectors
            .iter()
            .filter(|s| self.routes.remove(s).is_some())
            .copied()
            .collect()
    }
}
