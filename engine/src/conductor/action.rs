//! Action Executor
//!
//! Runs one decision plan end to end: invoke every tool call, fold the
//! outcomes, schedule the itinerary and render the reply.

use crate::conductor::aggregator::aggregate;
use crate::conductor::allocator::TimeAllocator;
use crate::conductor::context::ContextExtractor;
use crate::conductor::invoker::ToolInvoker;
use crate::conductor::renderer::ItineraryRenderer;
use crate::conductor::types::{ActionResult, DecisionPlan, PlanningDataset, TraceEntry};
use crate::config::ScheduleConfig;
use chrono::{Local, NaiveDateTime};
use sdk::schema::Operation;
use sdk::types::ToolOutcome;
use tracing::{info, warn};
use uuid::Uuid;

pub struct ActionExecutor {
    invoker: ToolInvoker,
    allocator: TimeAllocator,
    venue_name: String,
    extractor: Option<ContextExtractor>,
}

impl ActionExecutor {
    pub fn new(
        invoker: ToolInvoker,
        schedule: ScheduleConfig,
        venue_name: impl Into<String>,
    ) -> Self {
        let extractor = match ContextExtractor::new() {
            Ok(extractor) => Some(extractor),
            Err(e) => {
                warn!("Visit context enrichment disabled: {}", e);
                None
            }
        };

        Self {
            invoker,
            allocator: TimeAllocator::new(schedule),
            venue_name: venue_name.into(),
            extractor,
        }
    }

    /// Execute a plan, scheduling from the local wall clock
    pub async fn execute(&self, plan: &DecisionPlan) -> ActionResult {
        self.execute_at(plan, Local::now().naive_local()).await
    }

    /// Execute a plan with the itinerary starting at `now`
    pub async fn execute_at(&self, plan: &DecisionPlan, now: NaiveDateTime) -> ActionResult {
        let pass_id = Uuid::new_v4();
        info!(
            "Pass {}: {} reasoning steps, {} tool calls",
            pass_id,
            plan.reasoning_steps.len(),
            plan.tool_calls.len()
        );

        let mut reasoning_trace: Vec<String> =
            plan.reasoning_steps.iter().map(|s| s.trace_line()).collect();

        let outcomes = self.invoker.invoke_many(&plan.tool_calls).await;
        for outcome in outcomes.iter().filter(|o| !o.success) {
            reasoning_trace.push(format!(
                "Warning: {} failed: {}",
                outcome.operation,
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
        }

        let verified = outcomes
            .iter()
            .any(|o| o.success && o.operation == Operation::VerifyRoute.name());
        if plan.verification_needed && !verified {
            warn!("Pass {}: verification requested but no route was verified", pass_id);
            reasoning_trace
                .push("Warning: verification requested but no route was verified".to_string());
        }

        let tool_trace: Vec<TraceEntry> = outcomes.iter().map(trace_entry).collect();
        let success = outcomes.iter().all(|o| o.success);

        let response = match &plan.final_answer {
            Some(answer) => answer.clone(),
            None => {
                let dataset = aggregate(&outcomes);
                self.synthesize(plan, &dataset, &reasoning_trace, now)
            }
        };

        info!(
            "Pass {} finished: {}/{} tools succeeded",
            pass_id,
            tool_trace.iter().filter(|t| t.success).count(),
            tool_trace.len()
        );

        ActionResult {
            response,
            tool_trace,
            reasoning_trace,
            success,
        }
    }

    fn synthesize(
        &self,
        plan: &DecisionPlan,
        dataset: &PlanningDataset,
        reasoning_trace: &[String],
        now: NaiveDateTime,
    ) -> String {
        let budget = plan.time_budget_minutes.or_else(|| {
            dataset
                .verification
                .as_ref()
                .and_then(|report| report.required_minutes())
        });

        let stops = dataset.itinerary_stops();
        let allocation =
            (!stops.is_empty()).then(|| self.allocator.allocate_at(&stops, budget, now));

        let mut renderer = ItineraryRenderer::new(self.venue_name.clone());
        if let Some(extractor) = &self.extractor {
            let texts = reasoning_trace
                .iter()
                .chain(&dataset.reasoning)
                .map(String::as_str);
            renderer = renderer.with_context(extractor.extract(texts));
        }

        renderer.render(dataset, allocation.as_ref(), None)
    }
}

fn trace_entry(outcome: &ToolOutcome) -> TraceEntry {
    TraceEntry {
        tool: outcome.operation.clone(),
        success: outcome.success,
        elapsed_ms: outcome.elapsed_ms,
        error: outcome.error.clone(),
    }
}
