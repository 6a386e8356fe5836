//! Configuration management
//!
//! This module handles loading, validation, and management of the Concierge
//! configuration. Configuration is stored in TOML format at
//! ~/.concierge/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, optional venue data file
//! - **invoker**: Per-tool timeout
//! - **planning.route**: Route time estimate constants
//! - **planning.schedule**: Category dwell times, travel buffer, minimum stop time
//! - **planning.constraints**: Lower-floor threshold used by the verifier
//!
//! Every planning constant is a business heuristic; the defaults below are the
//! values the venue has always used.
//!
//! # Examples
//!
//! ```no_run
//! use concierge_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Per-stop minutes: {}", config.planning.route.per_stop_minutes);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Tool invoker settings
    #[serde(default)]
    pub invoker: InvokerConfig,

    /// Planning heuristics
    #[serde(default)]
    pub planning: PlanningConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Venue data file (supports ~ expansion). The bundled demo venue is
    /// used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_data: Option<PathBuf>,
}

/// Tool invoker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokerConfig {
    /// Upper bound for a single backend call, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Planning heuristics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningConfig {
    #[serde(default)]
    pub route: RouteCostConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub constraints: ConstraintConfig,
}

/// Route time estimate: `per_stop x stops + per_floor x distinct floors`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCostConfig {
    #[serde(default = "default_per_stop_minutes")]
    pub per_stop_minutes: u32,

    #[serde(default = "default_per_floor_minutes")]
    pub per_floor_minutes: u32,

    #[serde(default = "default_accessible_per_stop_minutes")]
    pub accessible_per_stop_minutes: u32,

    #[serde(default = "default_accessible_per_floor_minutes")]
    pub accessible_per_floor_minutes: u32,
}

/// Time allocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Gap between consecutive stops
    #[serde(default = "default_travel_buffer_minutes")]
    pub travel_buffer_minutes: u32,

    /// Floor applied to every scaled stop duration
    #[serde(default = "default_min_stop_minutes")]
    pub min_stop_minutes: u32,

    /// Dwell time for categories missing from `base_minutes`
    #[serde(default = "default_base_minutes")]
    pub default_base_minutes: u32,

    /// Dwell time per category (keys are matched case-insensitively)
    #[serde(default = "default_category_minutes")]
    pub base_minutes: BTreeMap<String, u32>,
}

/// Constraint verifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintConfig {
    /// Highest floor that still counts as a "lower floor"
    #[serde(default = "default_lower_floor_threshold")]
    pub lower_floor_threshold: u32,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_per_stop_minutes() -> u32 {
    15
}

fn default_per_floor_minutes() -> u32 {
    3
}

fn default_accessible_per_stop_minutes() -> u32 {
    20
}

fn default_accessible_per_floor_minutes() -> u32 {
    5
}

fn default_travel_buffer_minutes() -> u32 {
    5
}

fn default_min_stop_minutes() -> u32 {
    15
}

fn default_base_minutes() -> u32 {
    25
}

fn default_lower_floor_threshold() -> u32 {
    2
}

fn default_category_minutes() -> BTreeMap<String, u32> {
    [
        ("food", 60),
        ("jewelry", 35),
        ("fashion", 30),
        ("electronics", 25),
        ("beauty", 25),
        ("sports", 25),
        ("home", 25),
        ("books", 20),
        ("toys", 20),
        ("entertainment", 45),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            venue_data: None,
        }
    }
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for RouteCostConfig {
    fn default() -> Self {
        Self {
            per_stop_minutes: default_per_stop_minutes(),
            per_floor_minutes: default_per_floor_minutes(),
            accessible_per_stop_minutes: default_accessible_per_stop_minutes(),
            accessible_per_floor_minutes: default_accessible_per_floor_minutes(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            travel_buffer_minutes: default_travel_buffer_minutes(),
            min_stop_minutes: default_min_stop_minutes(),
            default_base_minutes: default_base_minutes(),
            base_minutes: default_category_minutes(),
        }
    }
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            lower_floor_threshold: default_lower_floor_threshold(),
        }
    }
}

impl ScheduleConfig {
    /// Base dwell time for a category
    pub fn base_for(&self, category: &str) -> u32 {
        let key = category.trim().to_lowercase();
        self.base_minutes
            .get(&key)
            .copied()
            .unwrap_or(self.default_base_minutes)
    }
}

impl Config {
    /// Load configuration from the default location (~/.concierge/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.concierge/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".concierge").join("config.toml"))
    }

    /// Validate values and expand ~ in the venue data path
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.invoker.timeout_ms == 0 {
            return Err(EngineError::Config(
                "invoker.timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.planning.schedule.min_stop_minutes == 0 {
            return Err(EngineError::Config(
                "planning.schedule.min_stop_minutes must be greater than 0".to_string(),
            ));
        }

        if self.planning.constraints.lower_floor_threshold == 0 {
            return Err(EngineError::Config(
                "planning.constraints.lower_floor_threshold must be at least 1".to_string(),
            ));
        }

        // Category keys are matched lowercase
        let table = std::mem::take(&mut self.planning.schedule.base_minutes);
        self.planning.schedule.base_minutes = table
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();

        if let Some(path) = &self.core.venue_data {
            self.core.venue_data = Some(expand_path(path)?);
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
pub fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
