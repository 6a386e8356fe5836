//! Tool operation schema
//!
//! Every operation the planner may request, together with its argument struct
//! and its payload struct. Arguments and payloads are versioned together:
//! bump [`SCHEMA_VERSION`] whenever either side changes shape.
//!
//! Payloads travel as JSON between the tool backend and the aggregator.
//! [`Payload::decode`] turns the JSON back into a closed tagged variant so the
//! aggregator can fold it with an exhaustive match.

use crate::errors::EngineError;
use crate::venue::{EventRecord, FacilityRecord, Hours, Stop};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Version of the argument and payload shapes below
pub const SCHEMA_VERSION: u32 = 1;

/// Closed set of tool operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    SearchShops,
    GetShopDetails,
    CalculateRoute,
    VerifyRoute,
    GetRecommendations,
    CheckShopHours,
    GetAccessibilityInfo,
    CalculateAccessibleRoute,
    GetMallFacilities,
    GetCurrentEvents,
    CheckWaitTime,
    LogLostItem,
    SearchLostAndFound,
    ShowReasoning,
}

impl Operation {
    pub const ALL: [Operation; 14] = [
        Operation::ShowReasoning,
        Operation::SearchShops,
        Operation::GetShopDetails,
        Operation::CalculateRoute,
        Operation::VerifyRoute,
        Operation::GetRecommendations,
        Operation::CheckShopHours,
        Operation::GetAccessibilityInfo,
        Operation::CalculateAccessibleRoute,
        Operation::GetMallFacilities,
        Operation::GetCurrentEvents,
        Operation::CheckWaitTime,
        Operation::LogLostItem,
        Operation::SearchLostAndFound,
    ];

    /// Wire name used by the planner
    pub fn name(&self) -> &'static str {
        match self {
            Self::SearchShops => "search_shops",
            Self::GetShopDetails => "get_shop_details",
            Self::CalculateRoute => "calculate_route",
            Self::VerifyRoute => "verify_route",
            Self::GetRecommendations => "get_recommendations",
            Self::CheckShopHours => "check_shop_hours",
            Self::GetAccessibilityInfo => "get_accessibility_info",
            Self::CalculateAccessibleRoute => "calculate_accessible_route",
            Self::GetMallFacilities => "get_mall_facilities",
            Self::GetCurrentEvents => "get_current_events",
            Self::CheckWaitTime => "check_wait_time",
            Self::LogLostItem => "log_lost_item",
            Self::SearchLostAndFound => "search_lost_and_found",
            Self::ShowReasoning => "show_reasoning",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SearchShops => "Search for shops by category, floor, or keyword",
            Self::GetShopDetails => "Get a single shop by id or name",
            Self::CalculateRoute => "Order shops to minimize floor changes",
            Self::VerifyRoute => "Check a route against floor, time, and category constraints",
            Self::GetRecommendations => "Context-aware shop suggestions",
            Self::CheckShopHours => "Opening hours and open/closed status",
            Self::GetAccessibilityInfo => "Wheelchair, elevator, and aisle information for a shop",
            Self::CalculateAccessibleRoute => "Elevator-only route with rest points",
            Self::GetMallFacilities => "Restrooms, ATMs, nursing rooms, parking, elevators",
            Self::GetCurrentEvents => "Ongoing events, promotions, and upcoming activities",
            Self::CheckWaitTime => "Current wait time and crowd level",
            Self::LogLostItem => "Report a lost item",
            Self::SearchLostAndFound => "Search found items by type",
            Self::ShowReasoning => "Record the planner's reasoning steps",
        }
    }

    /// Argument shape, as shown to the planner
    pub fn argument_shape(&self) -> &'static str {
        match self {
            Self::SearchShops => r#"{"category"?: string, "floor"?: int, "keyword"?: string}"#,
            Self::GetShopDetails => r#"{"shop_id"?: int, "shop_name"?: string}"#,
            Self::CalculateRoute | Self::CalculateAccessibleRoute => r#"{"shop_ids": [int]}"#,
            Self::VerifyRoute => {
                r#"{"shop_ids": [int], "constraints": {"max_floors"?: int, "max_time_minutes"?: int, "required_categories"?: [string], "lower_floors_only"?: bool}}"#
            }
            Self::GetRecommendations => {
                r#"{"context": string, "preferences"?: {"budget"?: "low"|"medium"|"high", "interests"?: [string]}}"#
            }
            Self::CheckShopHours => r#"{"shop_name": string, "current_time"?: "HH:MM AM/PM"}"#,
            Self::GetAccessibilityInfo => r#"{"shop_name": string}"#,
            Self::GetMallFacilities => r#"{"facility_type"?: string}"#,
            Self::GetCurrentEvents => "{}",
            Self::CheckWaitTime => r#"{"location_name": string}"#,
            Self::LogLostItem => {
                r#"{"description": string, "location": string, "contact_info"?: string}"#
            }
            Self::SearchLostAndFound => r#"{"item_type": string}"#,
            Self::ShowReasoning => r#"{"steps": [string]}"#,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| EngineError::UnknownOperation(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchShopsArgs {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub floor: Option<u32>,
    #[serde(default)]
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopLookupArgs {
    #[serde(default)]
    pub shop_id: Option<u32>,
    #[serde(default)]
    pub shop_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopIdsArgs {
    pub shop_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyRouteArgs {
    pub shop_ids: Vec<u32>,
    #[serde(default)]
    pub constraints: ConstraintSet,
}

/// Declarative route constraints. Absent keys are not evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_floors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_categories: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_floors_only: Option<bool>,
    /// Keys this engine does not evaluate
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub budget: Option<BudgetLevel>,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationArgs {
    pub context: String,
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopHoursArgs {
    pub shop_name: String,
    #[serde(default)]
    pub current_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopNameArgs {
    pub shop_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityArgs {
    #[serde(default)]
    pub facility_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitTimeArgs {
    pub location_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLostItemArgs {
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostSearchArgs {
    pub item_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningArgs {
    pub steps: Vec<String>,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Ordered multi-stop route. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub stop_ids: Vec<u32>,
    pub floors_visited: Vec<u32>,
    pub distinct_floors: usize,
    pub floor_changes: usize,
    pub estimated_minutes: u32,
    pub sequence: Vec<RouteStop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<AccessibilityFeatures>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub sequence: usize,
    pub stop_id: u32,
    pub name: String,
    pub floor: u32,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityFeatures {
    pub elevator_only: bool,
    pub no_escalators: bool,
    pub wide_pathways: bool,
    pub rest_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintCheck {
    pub constraint: String,
    pub required: Value,
    pub actual: Value,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub verified: bool,
    pub checks: Vec<ConstraintCheck>,
}

impl VerificationReport {
    /// The `max_time_minutes` requirement, if it was checked
    pub fn required_minutes(&self) -> Option<u32> {
        self.checks
            .iter()
            .find(|c| c.constraint == "max_time_minutes")
            .and_then(|c| c.required.as_u64())
            .and_then(|m| u32::try_from(m).ok())
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &ConstraintCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub context: String,
    pub description: String,
    pub suggested: Vec<Stop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoursRecord {
    pub shop_name: String,
    pub floor: u32,
    #[serde(default)]
    pub hours: Option<Hours>,
    pub status: String,
    #[serde(default)]
    pub open_now: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityRecord {
    pub shop_name: String,
    pub floor: u32,
    pub wheelchair_accessible: bool,
    pub elevator_access: String,
    pub wide_aisles: bool,
    pub accessible_entrance: bool,
    pub accessible_restroom_nearby: bool,
    pub distance_from_elevator_m: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrowdLevel {
    Low,
    Moderate,
    Busy,
}

impl fmt::Display for CrowdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Busy => "busy",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitTimeRecord {
    pub location: String,
    pub wait_minutes: u32,
    pub crowd_level: CrowdLevel,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostItemRecord {
    pub item_id: u32,
    pub description: String,
    pub location: String,
    pub date: String,
    #[serde(default)]
    pub contact_info: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostAndFoundResults {
    pub search_term: String,
    pub items: Vec<LostItemRecord>,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningPayload {
    pub steps: Vec<String>,
}

/// Decoded tool payload, one variant per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Shops(Vec<Stop>),
    ShopDetail(Stop),
    Route(Route),
    Verification(VerificationReport),
    Recommendations(Recommendations),
    Hours(HoursRecord),
    Accessibility(AccessibilityRecord),
    AccessibleRoute(Route),
    Facilities(Vec<FacilityRecord>),
    Events(Vec<EventRecord>),
    WaitTime(WaitTimeRecord),
    LostItemLogged(LostItemRecord),
    LostAndFound(LostAndFoundResults),
    Reasoning(ReasoningPayload),
}

impl Payload {
    /// Decode a JSON payload according to the operation that produced it
    pub fn decode(operation: Operation, value: Value) -> Result<Self, EngineError> {
        fn de<T: serde::de::DeserializeOwned>(
            op: Operation,
            value: Value,
        ) -> Result<T, EngineError> {
            serde_json::from_value(value).map_err(|e| EngineError::Decode {
                operation: op.name().to_string(),
                reason: e.to_string(),
            })
        }

        Ok(match operation {
            Operation::SearchShops => Self::Shops(de(operation, value)?),
            Operation::GetShopDetails => Self::ShopDetail(de(operation, value)?),
            Operation::CalculateRoute => Self::Route(de(operation, value)?),
            Operation::VerifyRoute => Self::Verification(de(operation, value)?),
            Operation::GetRecommendations => Self::Recommendations(de(operation, value)?),
            Operation::CheckShopHours => Self::Hours(de(operation, value)?),
            Operation::GetAccessibilityInfo => Self::Accessibility(de(operation, value)?),
            Operation::CalculateAccessibleRoute => Self::AccessibleRoute(de(operation, value)?),
            Operation::GetMallFacilities => Self::Facilities(de(operation, value)?),
            Operation::GetCurrentEvents => Self::Events(de(operation, value)?),
            Operation::CheckWaitTime => Self::WaitTime(de(operation, value)?),
            Operation::LogLostItem => Self::LostItemLogged(de(operation, value)?),
            Operation::SearchLostAndFound => Self::LostAndFound(de(operation, value)?),
            Operation::ShowReasoning => Self::Reasoning(de(operation, value)?),
        })
    }

    /// Operation this payload answers
    pub fn operation(&self) -> Operation {
        match self {
            Self::Shops(_) => Operation::SearchShops,
            Self::ShopDetail(_) => Operation::GetShopDetails,
            Self::Route(_) => Operation::CalculateRoute,
            Self::Verification(_) => Operation::VerifyRoute,
            Self::Recommendations(_) => Operation::GetRecommendations,
            Self::Hours(_) => Operation::CheckShopHours,
            Self::Accessibility(_) => Operation::GetAccessibilityInfo,
            Self::AccessibleRoute(_) => Operation::CalculateAccessibleRoute,
            Self::Facilities(_) => Operation::GetMallFacilities,
            Self::Events(_) => Operation::GetCurrentEvents,
            Self::WaitTime(_) => Operation::CheckWaitTime,
            Self::LostItemLogged(_) => Operation::LogLostItem,
            Self::LostAndFound(_) => Operation::SearchLostAndFound,
            Self::Reasoning(_) => Operation::ShowReasoning,
        }
    }

    /// Encode to the JSON wire form
    pub fn encode(&self) -> Result<Value, EngineError> {
        let encoded = match self {
            Self::Shops(v) => serde_json::to_value(v),
            Self::ShopDetail(v) => serde_json::to_value(v),
            Self::Route(v) | Self::AccessibleRoute(v) => serde_json::to_value(v),
            Self::Verification(v) => serde_json::to_value(v),
            Self::Recommendations(v) => serde_json::to_value(v),
            Self::Hours(v) => serde_json::to_value(v),
            Self::Accessibility(v) => serde_json::to_value(v),
            Self::Facilities(v) => serde_json::to_value(v),
            Self::Events(v) => serde_json::to_value(v),
            Self::WaitTime(v) => serde_json::to_value(v),
            Self::LostItemLogged(v) => serde_json::to_value(v),
            Self::LostAndFound(v) => serde_json::to_value(v),
            Self::Reasoning(v) => serde_json::to_value(v),
        };
        encoded.map_err(|e| EngineError::Decode {
            operation: self.operation().name().to_string(),
            reason: e.to_string(),
        })
    }
}
