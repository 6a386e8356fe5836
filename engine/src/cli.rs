//! CLI interface for Concierge
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Concierge visit-planning engine
///
/// Runs planner output against a venue and renders a time-boxed visit plan.
#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Venue data file (overrides core.venue_data)
    #[arg(long, global = true, value_name = "PATH")]
    pub venue: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a decision plan (JSON) and render the visit
    Plan {
        /// Path to the plan file, or "-" for stdin
        file: PathBuf,

        /// Override the plan's time budget in minutes
        #[arg(long, value_name = "MINUTES")]
        budget: Option<u32>,
    },

    /// Order stops to minimize floor changes
    Route {
        /// Stop ids
        #[arg(required = true)]
        ids: Vec<u32>,

        /// Elevator-only route with rest points
        #[arg(long)]
        accessible: bool,
    },

    /// Check stops against route constraints
    Verify {
        /// Stop ids
        #[arg(required = true)]
        ids: Vec<u32>,

        /// Maximum number of distinct floors
        #[arg(long, value_name = "N")]
        max_floors: Option<u32>,

        /// Maximum estimated minutes
        #[arg(long, value_name = "N")]
        max_minutes: Option<u32>,

        /// Category that must be visited (repeatable)
        #[arg(long = "require", value_name = "CATEGORY")]
        require: Vec<String>,

        /// Only visit lower floors
        #[arg(long)]
        lower_floors_only: bool,
    },

    /// Search the venue's shops
    Search {
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        floor: Option<u32>,

        #[arg(short, long)]
        keyword: Option<String>,
    },

    /// List the operations a plan may call
    Tools,
}
