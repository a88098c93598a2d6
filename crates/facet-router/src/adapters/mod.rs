//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports.

pub mod clock;
pub mod event_log;
pub mod facet_host;

pub use clock::{ManualClock, SystemTimeSource};
pub use event_log::{InMemoryEventLog, TracingEventSink};
pub use facet_host::{EchoFacet, FacetBehavior, InMemoryFacetHost, RecordingFacet, StaticFacet};
