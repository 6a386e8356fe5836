//! Error types and handling
//!
//! This module provides the error types used throughout the Concierge engine.
//! All errors implement the `ConciergeErrorExt` trait which provides
//! user-friendly hints and indicates whether errors are recoverable.
//!
//! # Propagation
//!
//! None of these errors abort a planning pass. Backend and argument errors
//! are captured by the tool invoker and turned into failed outcomes; decode
//! errors are logged by the aggregator and the payload is skipped.

use thiserror::Error;

/// Trait for Concierge error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait ConciergeErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to show to a visitor and never contains file paths
    /// or internal identifiers.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried by the planner with different
    /// arguments. Non-recoverable errors need operator intervention.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration
/// - **Catalog**: Venue data that cannot be loaded
/// - **Invocation**: Unknown operations, bad arguments, timeouts, aborted tasks
/// - **Reference**: Stops, shops, locations, or facility kinds that do not exist
/// - **Decode**: Payloads that do not match their operation's schema
///
/// # Examples
///
/// ```
/// use sdk::errors::{ConciergeErrorExt, EngineError};
///
/// let error = EngineError::NoValidStops;
/// assert_eq!(error.to_string(), "No valid stops");
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::Catalog("missing shops section".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Venue data errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    // Invocation errors
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid arguments for {operation}: {reason}")]
    InvalidArguments { operation: String, reason: String },

    #[error("Tool {operation} timed out after {timeout_ms}ms")]
    ToolTimeout { operation: String, timeout_ms: u64 },

    #[error("Tool {operation} aborted: {reason}")]
    ToolAborted { operation: String, reason: String },

    // Reference errors
    #[error("No valid stops")]
    NoValidStops,

    #[error("Shop '{0}' not found")]
    ShopNotFound(String),

    #[error("Location '{0}' not found")]
    LocationNotFound(String),

    #[error("Facility type '{requested}' not found (available: {available})")]
    FacilityTypeNotFound { requested: String, available: String },

    // Payload errors
    #[error("Failed to decode {operation} payload: {reason}")]
    Decode { operation: String, reason: String },

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConciergeErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::Catalog(_) => "Venue data could not be loaded. Check the venue data file",

            Self::UnknownOperation(_) => "That action is not available at this venue",
            Self::InvalidArguments { .. } => "The request was missing some details",
            Self::ToolTimeout { .. } => "The venue service took too long to respond. Try again",
            Self::ToolAborted { .. } => "The venue service failed unexpectedly",

            Self::NoValidStops => "None of the requested stops could be found",
            Self::ShopNotFound(_) => "That shop could not be found",
            Self::LocationNotFound(_) => "That location could not be found",
            Self::FacilityTypeNotFound { .. } => "That kind of facility is not listed",

            Self::Decode { .. } => "Some venue information could not be read",

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(_) | Self::Catalog(_) | Self::Io(_) => false,
            _ => true,
        }
    }
}
