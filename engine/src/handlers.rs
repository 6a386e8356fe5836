//! Command handlers for CLI operations
//!
//! - plan: execute a decision plan and render the visit
//! - route / verify: plan or check a route directly
//! - search: filter the venue's shops
//! - tools: list the operations a plan may call

use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

use crate::catalog::{LostAndFoundRegistry, VenueCatalog};
use crate::conductor::{
    ActionExecutor, ActionResult, ConstraintVerifier, DecisionPlan, ItineraryRenderer,
    PlanningDataset, RoutePlanner, ToolInvoker,
};
use crate::config::{expand_path, Config};
use crate::tools::{tool_manifest, VenueTools};
use sdk::errors::{ConciergeErrorExt, EngineError};
use sdk::schema::{ConstraintSet, SearchShopsArgs};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Plain-language hint for a failed command, when the cause is an engine error
pub fn error_hint(err: &anyhow::Error) -> Option<&str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<EngineError>())
        .map(|engine_err| {
            tracing::debug!(
                "Command failed with {} error",
                if engine_err.is_recoverable() { "a recoverable" } else { "a fatal" }
            );
            engine_err.user_hint()
        })
}

/// Load the venue named by `--venue`, the config, or the bundled demo
pub fn load_catalog(config: &Config, venue_override: Option<&Path>) -> Result<Arc<VenueCatalog>> {
    let path: Option<PathBuf> = match venue_override {
        Some(path) => Some(expand_path(path)?),
        None => config.core.venue_data.clone(),
    };

    let catalog = match path {
        Some(path) => VenueCatalog::load(&path)
            .with_context(|| format!("Failed to load venue data from {}", path.display()))?,
        None => {
            tracing::debug!("No venue data configured, using the bundled demo venue");
            VenueCatalog::demo().context("Failed to load the bundled demo venue")?
        }
    };
    Ok(Arc::new(catalog))
}

/// Wire catalog, tools and invoker into an executor
pub fn build_executor(config: &Config, catalog: Arc<VenueCatalog>) -> ActionExecutor {
    let venue_name = catalog.name().to_string();
    let tools = VenueTools::new(
        catalog,
        Arc::new(LostAndFoundRegistry::seeded()),
        &config.planning,
    );
    let invoker = ToolInvoker::new(
        Arc::new(tools),
        Duration::from_millis(config.invoker.timeout_ms),
    );
    ActionExecutor::new(invoker, config.planning.schedule.clone(), venue_name)
}

/// Execute a decision plan read from a file or stdin
pub async fn handle_plan(
    file: &Path,
    budget: Option<u32>,
    config: &Config,
    catalog: Arc<VenueCatalog>,
    format: OutputFormat,
) -> Result<()> {
    let raw = if file == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read plan from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read plan file {}", file.display()))?
    };

    let mut plan: DecisionPlan =
        serde_json::from_str(&raw).context("Failed to parse decision plan")?;
    if budget.is_some() {
        plan.time_budget_minutes = budget;
    }

    let executor = build_executor(config, catalog);
    let result = executor.execute(&plan).await;

    match format {
        OutputFormat::Text => print_action(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

fn print_action(result: &ActionResult) {
    println!("{}", result.response);

    if !result.tool_trace.is_empty() {
        println!();
        println!("Tools:");
        for entry in &result.tool_trace {
            match &entry.error {
                None => println!("  ok    {} ({:.1} ms)", entry.tool, entry.elapsed_ms),
                Some(err) => println!(
                    "  FAIL  {} ({:.1} ms): {}",
                    entry.tool, entry.elapsed_ms, err
                ),
            }
        }
    }
}

/// Plan a route over the given stop ids
pub fn handle_route(
    ids: &[u32],
    accessible: bool,
    config: &Config,
    catalog: Arc<VenueCatalog>,
    format: OutputFormat,
) -> Result<()> {
    let venue_name = catalog.name().to_string();
    let planner = RoutePlanner::new(catalog, config.planning.route.clone());
    let route = if accessible {
        planner.plan_accessible(ids)?
    } else {
        planner.plan(ids)?
    };

    match format {
        OutputFormat::Text => {
            let dataset = PlanningDataset {
                route: Some(route),
                attempted: 1,
                succeeded: 1,
                ..Default::default()
            };
            println!("{}", ItineraryRenderer::new(venue_name).render(&dataset, None, None));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&route)?),
    }
    Ok(())
}

/// Verify stop ids against constraints given on the command line
pub fn handle_verify(
    ids: &[u32],
    constraints: &ConstraintSet,
    config: &Config,
    catalog: Arc<VenueCatalog>,
    format: OutputFormat,
) -> Result<()> {
    let verifier = ConstraintVerifier::new(
        catalog,
        config.planning.route.clone(),
        config.planning.constraints.clone(),
    );
    let report = verifier.verify(ids, constraints)?;

    match format {
        OutputFormat::Text => {
            println!("Verified: {}", if report.verified { "yes" } else { "no" });
            if report.checks.is_empty() {
                println!("  No constraints given");
            }
            for check in &report.checks {
                println!(
                    "  [{}] {}: required {}, actual {}",
                    if check.passed { "pass" } else { "FAIL" },
                    check.constraint,
                    check.required,
                    check.actual
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Search the venue's shops
pub fn handle_search(
    args: &SearchShopsArgs,
    catalog: &VenueCatalog,
    format: OutputFormat,
) -> Result<()> {
    let shops = catalog.filter(args);

    match format {
        OutputFormat::Text => {
            if shops.is_empty() {
                println!("No shops match");
                return Ok(());
            }
            for shop in &shops {
                println!(
                    "{:>4}  {:<24} {:<14} Floor {}  {}",
                    shop.id, shop.name, shop.category, shop.floor, shop.price_tier
                );
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "shops": shops,
                "count": shops.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// List the operations a plan may call
pub fn handle_tools(format: OutputFormat) -> Result<()> {
    let manifest = tool_manifest();

    match format {
        OutputFormat::Text => {
            for tool in &manifest {
                println!("{}", tool.name);
                println!("    {}", tool.description);
                println!("    args: {}", tool.arguments);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&manifest)?),
    }
    Ok(())
}
