//! # Ports Layer
//!
//! - `inbound`: the API the router offers
//! - `outbound`: the facet host, clock and event sink the router requires

pub mod inbound;
pub mod outbound;

pub use inbound::FacetRouterApi;
pub use outbound::{FacetCodeSource, FacetHost, FacetInvoker, RouterEventSink, TimeSource};
