//! End-to-end tests for the synthesis pipeline
//!
//! Plans run through the invoker, aggregator, allocator and renderer against
//! the bundled demo venue or scripted backends.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use concierge_engine::catalog::{LostAndFoundRegistry, VenueCatalog, VenueData};
use concierge_engine::conductor::renderer::APOLOGY;
use concierge_engine::conductor::{
    aggregate, ActionExecutor, ConstraintVerifier, DecisionPlan, RoutePlanner, TimeAllocator,
    ToolInvoker,
};
use concierge_engine::config::{Config, ConstraintConfig, RouteCostConfig, ScheduleConfig};
use concierge_engine::tools::{ToolBackend, VenueTools};
use sdk::errors::EngineError;
use sdk::schema::{ConstraintSet, Operation};
use sdk::types::ToolInvocation;
use sdk::venue::{PriceTier, Stop};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn stop(id: u32, floor: u32, category: &str) -> Stop {
    Stop {
        id,
        name: format!("{} {}", category, id),
        category: category.to_string(),
        floor,
        price_tier: PriceTier::Moderate,
        rating: Some(4.0),
        description: String::new(),
        hours: None,
        specialties: vec![],
    }
}

fn two_stop_catalog() -> Arc<VenueCatalog> {
    Arc::new(
        VenueCatalog::from_data(VenueData {
            name: "Scenario Mall".to_string(),
            shops: vec![stop(1, 1, "Fashion"), stop(2, 3, "Food")],
            facilities: vec![],
            events: vec![],
        })
        .unwrap(),
    )
}

fn opening_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 12, 13)
        .unwrap()
        .and_hms_opt(11, 0, 0)
        .unwrap()
}

fn demo_executor() -> ActionExecutor {
    let config = Config::default();
    let catalog = Arc::new(VenueCatalog::demo().unwrap());
    let tools = VenueTools::new(
        Arc::clone(&catalog),
        Arc::new(LostAndFoundRegistry::seeded()),
        &config.planning,
    );
    let invoker = ToolInvoker::new(Arc::new(tools), Duration::from_secs(5));
    ActionExecutor::new(invoker, config.planning.schedule, catalog.name())
}

/// Backend that fails or panics on request and echoes otherwise
struct ScriptedBackend;

#[async_trait]
impl ToolBackend for ScriptedBackend {
    async fn call(
        &self,
        operation: Operation,
        invocation: &ToolInvocation,
    ) -> Result<Value, EngineError> {
        if let Some(ms) = invocation.arguments.get("delay_ms").and_then(Value::as_u64) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if invocation.arguments.contains_key("panic") {
            panic!("backend crashed");
        }
        if let Some(reason) = invocation.arguments.get("fail").and_then(Value::as_str) {
            return Err(EngineError::ToolAborted {
                operation: operation.name().to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(json!({"tag": invocation.arguments.get("tag").cloned().unwrap_or(Value::Null)}))
    }
}

#[test]
fn scenario_a_route_and_budget() {
    let catalog = two_stop_catalog();
    let route = RoutePlanner::new(Arc::clone(&catalog), RouteCostConfig::default())
        .plan(&[1, 2])
        .unwrap();
    assert_eq!(route.distinct_floors, 2);
    assert_eq!(route.estimated_minutes, 36);

    let stops: Vec<&Stop> = route.stop_ids.iter().filter_map(|id| catalog.get(*id)).collect();
    let allocation = TimeAllocator::new(ScheduleConfig::default()).allocate_at(
        &stops,
        Some(120),
        opening_time(),
    );
    assert_eq!(allocation.get(1).unwrap().duration_minutes, 40);
    assert_eq!(allocation.get(2).unwrap().duration_minutes, 80);
}

#[test]
fn scenario_b_max_floors_violation() {
    let verifier = ConstraintVerifier::new(
        two_stop_catalog(),
        RouteCostConfig::default(),
        ConstraintConfig::default(),
    );
    let constraints: ConstraintSet = serde_json::from_value(json!({"max_floors": 1})).unwrap();
    let report = verifier.verify(&[1, 2], &constraints).unwrap();

    assert!(!report.verified);
    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.checks[0].required, json!(1));
    assert_eq!(report.checks[0].actual, json!(2));
    assert!(!report.checks[0].passed);
}

#[test]
fn scenario_c_empty_route_is_an_error() {
    let planner = RoutePlanner::new(two_stop_catalog(), RouteCostConfig::default());
    let err = planner.plan(&[]).unwrap_err();
    assert!(matches!(err, EngineError::NoValidStops));
    assert_eq!(err.to_string(), "No valid stops");
}

#[tokio::test]
async fn scenario_d_one_failure_among_three() {
    let plan: DecisionPlan = serde_json::from_value(json!({
        "reasoning_steps": [
            {"type": "GOAL_DECOMPOSITION", "description": "Find fashion, then route"}
        ],
        "tool_calls": [
            {"tool_name": "search_shops", "arguments": {"category": "Fashion"}, "reasoning": "find shops"},
            {"tool_name": "calculate_route", "arguments": {"shop_ids": []}, "reasoning": "bad ids"},
            {"tool_name": "calculate_route", "arguments": {"shop_ids": [1, 4]}, "reasoning": "route"}
        ]
    }))
    .unwrap();

    let result = demo_executor().execute_at(&plan, opening_time()).await;

    assert!(!result.success);
    assert_eq!(result.tool_trace.len(), 3);
    let failures: Vec<_> = result.tool_trace.iter().filter(|t| !t.success).collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].tool, "calculate_route");
    assert_eq!(failures[0].error.as_deref(), Some("No valid stops"));
    assert!(result
        .reasoning_trace
        .iter()
        .any(|line| line.contains("calculate_route failed: No valid stops")));
    assert_eq!(
        result.reasoning_trace[0],
        "[GOAL_DECOMPOSITION] Find fashion, then route"
    );

    // route [1, 4] holds Fashion Forward; the itinerary is still produced
    assert!(result.response.contains("Fashion Forward"));
}

#[tokio::test]
async fn test_final_answer_bypasses_renderer() {
    let plan: DecisionPlan = serde_json::from_value(json!({
        "tool_calls": [{"tool_name": "get_current_events", "arguments": {}}],
        "final_answer": "Restrooms are next to the food court."
    }))
    .unwrap();

    let result = demo_executor().execute_at(&plan, opening_time()).await;
    assert_eq!(result.response, "Restrooms are next to the food court.");
    assert!(result.success);
    assert_eq!(result.tool_trace.len(), 1);
}

#[tokio::test]
async fn test_everything_failed_apologizes() {
    let plan: DecisionPlan = serde_json::from_value(json!({
        "tool_calls": [
            {"tool_name": "get_shop_details", "arguments": {"shop_name": "Nowhere"}},
            {"tool_name": "teleport", "arguments": {}}
        ]
    }))
    .unwrap();

    let result = demo_executor().execute_at(&plan, opening_time()).await;
    assert!(!result.success);
    assert_eq!(result.response, APOLOGY);
}

#[tokio::test]
async fn test_budget_from_verification_report() {
    let plan: DecisionPlan = serde_json::from_value(json!({
        "reasoning_steps": [{"type": "CONSTRAINT_ANALYSIS", "description": "anniversary visit"}],
        "tool_calls": [
            {"tool_name": "search_shops", "arguments": {"category": "Jewelry"}},
            {"tool_name": "verify_route", "arguments": {"shop_ids": [4], "constraints": {"max_time_minutes": 70}}}
        ]
    }))
    .unwrap();

    let result = demo_executor().execute_at(&plan, opening_time()).await;
    assert!(result.success);
    assert!(result.response.starts_with("Your anniversary plan at Grand Plaza"));
    assert!(result.response.contains("Time budget: 70 min"));
    assert!(result.response.contains("11:00 AM - 12:10 PM  Jewelry Junction"));
    assert!(result.response.contains("[verified]"));
}

#[tokio::test]
async fn test_invoke_many_order_with_delays_and_panic() {
    let invoker = ToolInvoker::new(Arc::new(ScriptedBackend), Duration::from_secs(2));
    let invocations = vec![
        ToolInvocation::new("search_shops")
            .with_arg("tag", json!("slow"))
            .with_arg("delay_ms", json!(80)),
        ToolInvocation::new("get_current_events").with_arg("panic", json!(true)),
        ToolInvocation::new("check_wait_time").with_arg("fail", json!("queue sensor offline")),
        ToolInvocation::new("search_shops").with_arg("tag", json!("fast")),
    ];

    let outcomes = invoker.invoke_many(&invocations).await;

    assert_eq!(outcomes.len(), 4);
    let names: Vec<&str> = outcomes.iter().map(|o| o.operation.as_str()).collect();
    assert_eq!(
        names,
        vec!["search_shops", "get_current_events", "check_wait_time", "search_shops"]
    );
    assert_eq!(outcomes[0].payload["tag"], json!("slow"));
    assert!(!outcomes[1].success);
    assert!(outcomes[1].error.as_deref().unwrap().contains("aborted"));
    assert!(outcomes[2].error.as_deref().unwrap().contains("queue sensor offline"));
    assert_eq!(outcomes[3].payload["tag"], json!("fast"));

    let dataset = aggregate(&outcomes);
    assert_eq!(dataset.attempted, 4);
    assert_eq!(dataset.succeeded, 2);
}

#[tokio::test]
async fn test_lost_item_logged_then_found() {
    let plan: DecisionPlan = serde_json::from_value(json!({
        "tool_calls": [
            {"tool_name": "log_lost_item", "arguments": {"description": "Green scarf", "location": "Floor 2, Cinema"}}
        ]
    }))
    .unwrap();

    let result = demo_executor().execute_at(&plan, opening_time()).await;
    assert!(result.success);
    assert!(result.response.starts_with("Lost & found:"));
    assert!(result.response.contains("#104 Green scarf"));
}

#[tokio::test]
async fn test_itinerary_covers_routed_stops_outside_search() {
    let plan: DecisionPlan = serde_json::from_value(json!({
        "tool_calls": [
            {"tool_name": "search_shops", "arguments": {"category": "Food"}},
            {"tool_name": "calculate_route", "arguments": {"shop_ids": [4, 3]}}
        ],
        "time_budget_minutes": 90
    }))
    .unwrap();

    let result = demo_executor().execute_at(&plan, opening_time()).await;
    assert!(result.success);

    // 35 and 60 base minutes scaled to 90: 33 and 56, with a 5 minute walk
    assert!(result.response.contains("1. 11:00 AM - 11:33 AM  Jewelry Junction (Jewelry)"));
    assert!(result.response.contains("2. 11:38 AM - 12:34 PM  Food Court Central (Food)"));
    assert!(!result.response.contains("Bean There Cafe"));
    assert!(result.response.contains("You should be done around 12:34 PM."));
}

#[test]
fn test_release_profile_unwinds_panics() {
    // a backend panic must surface as a failed outcome, never abort the process
    let manifest = include_str!("../../Cargo.toml");
    let workspace: toml::Value = toml::from_str(manifest).unwrap();
    let panic = workspace
        .get("profile")
        .and_then(|p| p.get("release"))
        .and_then(|r| r.get("panic"))
        .and_then(toml::Value::as_str)
        .unwrap_or("unwind");
    assert_eq!(panic, "unwind");
}

#[tokio::test]
async fn test_missing_verification_is_flagged() {
    let unverified: DecisionPlan = serde_json::from_value(json!({
        "tool_calls": [{"tool_name": "calculate_route", "arguments": {"shop_ids": [1, 3]}}],
        "verification_needed": true
    }))
    .unwrap();
    let result = demo_executor().execute_at(&unverified, opening_time()).await;
    assert!(result.success);
    assert_eq!(
        result.reasoning_trace.last().map(String::as_str),
        Some("Warning: verification requested but no route was verified")
    );

    let verified: DecisionPlan = serde_json::from_value(json!({
        "tool_calls": [
            {"tool_name": "verify_route", "arguments": {"shop_ids": [1, 3], "constraints": {"max_floors": 3}}}
        ],
        "verification_needed": true
    }))
    .unwrap();
    let result = demo_executor().execute_at(&verified, opening_time()).await;
    assert!(result.reasoning_trace.iter().all(|line| !line.contains("verification requested")));
}
