//! Concierge SDK
//!
//! Shared wire contract between the planning engine and venue tool backends:
//! error taxonomy, invocation/outcome envelopes, venue data types, and the
//! versioned operation schema.

/// Error types and handling
pub mod errors;

/// Tool invocation and outcome envelopes
pub mod types;

/// Venue data types (stops, hours, facilities, events)
pub mod venue;

/// Operation, argument, and payload schema
pub mod schema;

// Re-export commonly used types
pub use errors::{ConciergeErrorExt, EngineError};
pub use schema::{ConstraintSet, Operation, Payload, Route, VerificationReport, SCHEMA_VERSION};
pub use types::{ToolError, ToolInvocation, ToolOutcome};
pub use venue::{EventRecord, FacilityRecord, Hours, PriceTier, Stop};
