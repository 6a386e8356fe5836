use crate::conductor::allocator::Schedulable;
use sdk::schema::{
    AccessibilityRecord, HoursRecord, LostItemRecord, Route, RouteStop, VerificationReport,
    WaitTimeRecord,
};
use sdk::types::ToolInvocation;
use sdk::venue::{EventRecord, FacilityRecord, Stop};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One step of the planner's reasoning, e.g. `GOAL_DECOMPOSITION`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

impl ReasoningStep {
    /// `[KIND] description`
    pub fn trace_line(&self) -> String {
        format!("[{}] {}", self.kind, self.description)
    }
}

/// Structured plan produced by the external planner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionPlan {
    #[serde(default)]
    pub reasoning_steps: Vec<ReasoningStep>,
    #[serde(default)]
    pub tool_calls: Vec<ToolInvocation>,
    /// Returned verbatim when present
    #[serde(default)]
    pub final_answer: Option<String>,
    #[serde(default)]
    pub time_budget_minutes: Option<u32>,
    /// Expect a successful `verify_route`; its absence is flagged in the trace
    #[serde(default)]
    pub verification_needed: bool,
}

/// Per-tool entry of an action trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub tool: String,
    pub success: bool,
    pub elapsed_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What one planning pass hands back to the conversation loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub response: String,
    pub tool_trace: Vec<TraceEntry>,
    pub reasoning_trace: Vec<String>,
    pub success: bool,
}

/// One itinerary entry: full shop data, or only what the route carries
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItineraryStop<'a> {
    Known(&'a Stop),
    Routed(&'a RouteStop),
}

impl<'a> ItineraryStop<'a> {
    pub fn id(&self) -> u32 {
        match self {
            Self::Known(stop) => stop.id,
            Self::Routed(stop) => stop.stop_id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Self::Known(stop) => &stop.name,
            Self::Routed(stop) => &stop.name,
        }
    }

    pub fn category(&self) -> &'a str {
        match self {
            Self::Known(stop) => &stop.category,
            Self::Routed(stop) => &stop.category,
        }
    }

    pub fn floor(&self) -> u32 {
        match self {
            Self::Known(stop) => stop.floor,
            Self::Routed(stop) => stop.floor,
        }
    }

    /// Catalog record, when the pass fetched one
    pub fn details(&self) -> Option<&'a Stop> {
        match self {
            Self::Known(stop) => Some(stop),
            Self::Routed(_) => None,
        }
    }
}

impl Schedulable for ItineraryStop<'_> {
    fn stop_id(&self) -> u32 {
        self.id()
    }

    fn category(&self) -> &str {
        ItineraryStop::category(self)
    }
}

/// Canonical dataset built from every successful outcome of a pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanningDataset {
    /// Search results, first seen wins per id
    pub shops: Vec<Stop>,
    pub recommended: Vec<Stop>,
    pub shop_details: Vec<Stop>,
    pub route: Option<Route>,
    pub route_verified: Option<bool>,
    pub verification: Option<VerificationReport>,
    /// Keyed by lowercased shop name
    pub accessibility: BTreeMap<String, AccessibilityRecord>,
    pub hours: Vec<HoursRecord>,
    pub facilities: Vec<FacilityRecord>,
    pub events: Vec<EventRecord>,
    pub wait_times: Vec<WaitTimeRecord>,
    pub reasoning: Vec<String>,
    pub lost_and_found: Vec<LostItemRecord>,

    pub attempted: usize,
    pub succeeded: usize,
    pub decode_failures: usize,
}

impl PlanningDataset {
    /// Shops then recommendations, one entry per id
    pub fn pooled_stops(&self) -> Vec<&Stop> {
        let mut pooled: Vec<&Stop> = Vec::with_capacity(self.shops.len() + self.recommended.len());
        for stop in self.shops.iter().chain(&self.recommended) {
            if !pooled.iter().any(|s| s.id == stop.id) {
                pooled.push(stop);
            }
        }
        pooled
    }

    /// Itinerary entries. With a route, every routed stop in route order,
    /// using the pass's own shop data where it has some; otherwise every
    /// pooled stop by floor.
    pub fn itinerary_stops(&self) -> Vec<ItineraryStop<'_>> {
        let pooled = self.pooled_stops();

        if let Some(route) = &self.route {
            if !route.sequence.is_empty() {
                return route
                    .sequence
                    .iter()
                    .map(|routed| {
                        match pooled.iter().find(|s| s.id == routed.stop_id).copied() {
                            Some(stop) => ItineraryStop::Known(stop),
                            None => ItineraryStop::Routed(routed),
                        }
                    })
                    .collect();
            }
        }

        let mut by_floor = pooled;
        by_floor.sort_by_key(|s| s.floor);
        by_floor.into_iter().map(ItineraryStop::Known).collect()
    }

    pub fn accessibility_for(&self, shop_name: &str) -> Option<&AccessibilityRecord> {
        self.accessibility.get(&shop_name.trim().to_lowercase())
    }

    pub fn hours_for(&self, shop_name: &str) -> Option<&HoursRecord> {
        self.hours.iter().find(|h| h.shop_name.eq_ignore_ascii_case(shop_name))
    }

    pub fn wait_time_for(&self, shop_name: &str) -> Option<&WaitTimeRecord> {
        self.wait_times
            .iter()
            .find(|w| w.location.eq_ignore_ascii_case(shop_name))
    }

    /// True when outcomes were attempted and none succeeded
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.succeeded == 0
    }
}
