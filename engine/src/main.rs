// Concierge visit-planning engine
// Main entry point for the concierge binary

use clap::Parser;
use concierge_engine::cli::{Cli, Command};
use concierge_engine::config::Config;
use concierge_engine::handlers::{
    error_hint, handle_plan, handle_route, handle_search, handle_tools, handle_verify,
    load_catalog, OutputFormat,
};
use concierge_engine::telemetry::init_telemetry_with_level;
use sdk::schema::{ConstraintSet, SearchShopsArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log beats the config; RUST_LOG beats both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    tracing::info!("Concierge Engine v{}", env!("CARGO_PKG_VERSION"));

    let result = run(cli, &config, format).await;
    if let Err(err) = &result {
        if let Some(hint) = error_hint(err) {
            eprintln!("Hint: {}", hint);
        }
    }
    result
}

async fn run(cli: Cli, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    match cli.command {
        Command::Tools => handle_tools(format),

        Command::Plan { file, budget } => {
            let catalog = load_catalog(config, cli.venue.as_deref())?;
            tracing::info!("Executing plan from {}", file.display());
            handle_plan(&file, budget, config, catalog, format).await
        }

        Command::Route { ids, accessible } => {
            let catalog = load_catalog(config, cli.venue.as_deref())?;
            handle_route(&ids, accessible, config, catalog, format)
        }

        Command::Verify {
            ids,
            max_floors,
            max_minutes,
            require,
            lower_floors_only,
        } => {
            let catalog = load_catalog(config, cli.venue.as_deref())?;
            let constraints = ConstraintSet {
                max_floors,
                max_time_minutes: max_minutes,
                required_categories: (!require.is_empty()).then(|| require.into_iter().collect()),
                lower_floors_only: lower_floors_only.then_some(true),
                ..Default::default()
            };
            handle_verify(&ids, &constraints, config, catalog, format)
        }

        Command::Search {
            category,
            floor,
            keyword,
        } => {
            let catalog = load_catalog(config, cli.venue.as_deref())?;
            let args = SearchShopsArgs {
                category,
                floor,
                keyword,
            };
            handle_search(&args, &catalog, format)
        }
    }
}
