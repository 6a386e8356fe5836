//! Concierge Engine Library
//!
//! Post-planning synthesis for venue visits: tool invocation, result
//! aggregation, routing, verification, scheduling and rendering.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Venue catalog and lost & found registry
pub mod catalog;

/// Conductor orchestration module
pub mod conductor;

/// Venue tool backend
pub mod tools;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
