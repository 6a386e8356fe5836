//! Venue tools
//!
//! Serves all fourteen operations from the catalog. Every payload is built as
//! a typed `Payload` and encoded through the shared schema, so what the
//! aggregator decodes is exactly what is produced here.

use crate::catalog::lost_found::CLAIM_INSTRUCTIONS;
use crate::catalog::{LostAndFoundRegistry, VenueCatalog};
use crate::conductor::route::RoutePlanner;
use crate::conductor::verifier::ConstraintVerifier;
use crate::config::PlanningConfig;
use crate::tools::ToolBackend;
use async_trait::async_trait;
use sdk::errors::EngineError;
use sdk::schema::{
    AccessibilityRecord, BudgetLevel, CrowdLevel, FacilityArgs, HoursRecord, LogLostItemArgs,
    LostAndFoundResults, LostSearchArgs, Operation, Payload, ReasoningArgs, ReasoningPayload,
    RecommendationArgs, Recommendations, SearchShopsArgs, ShopHoursArgs, ShopIdsArgs,
    ShopLookupArgs, ShopNameArgs, VerifyRouteArgs, WaitTimeArgs, WaitTimeRecord,
};
use sdk::types::ToolInvocation;
use sdk::venue::{parse_clock_time, FacilityRecord, PriceTier, Stop};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub struct VenueTools {
    catalog: Arc<VenueCatalog>,
    lost_and_found: Arc<LostAndFoundRegistry>,
    planner: RoutePlanner,
    verifier: ConstraintVerifier,
}

impl VenueTools {
    pub fn new(
        catalog: Arc<VenueCatalog>,
        lost_and_found: Arc<LostAndFoundRegistry>,
        planning: &PlanningConfig,
    ) -> Self {
        Self {
            planner: RoutePlanner::new(Arc::clone(&catalog), planning.route.clone()),
            verifier: ConstraintVerifier::new(
                Arc::clone(&catalog),
                planning.route.clone(),
                planning.constraints.clone(),
            ),
            catalog,
            lost_and_found,
        }
    }

    fn shop_named(&self, name: &str) -> Result<&Stop, EngineError> {
        self.catalog
            .find_by_name(name)
            .ok_or_else(|| EngineError::ShopNotFound(name.to_string()))
    }

    fn search_shops(&self, args: SearchShopsArgs) -> Payload {
        let shops: Vec<Stop> = self.catalog.filter(&args).into_iter().cloned().collect();
        info!("Found {} shops", shops.len());
        Payload::Shops(shops)
    }

    fn shop_details(&self, args: ShopLookupArgs) -> Result<Payload, EngineError> {
        let shop = match (args.shop_id, args.shop_name.as_deref()) {
            (Some(id), _) => self
                .catalog
                .get(id)
                .ok_or_else(|| EngineError::ShopNotFound(id.to_string()))?,
            (None, Some(name)) => self.shop_named(name)?,
            (None, None) => {
                return Err(EngineError::InvalidArguments {
                    operation: Operation::GetShopDetails.name().to_string(),
                    reason: "either shop_id or shop_name is required".to_string(),
                })
            }
        };
        Ok(Payload::ShopDetail(shop.clone()))
    }

    fn recommendations(&self, args: RecommendationArgs) -> Payload {
        let (categories, description): (Vec<&str>, &str) =
            match args.context.trim().to_lowercase().as_str() {
                "anniversary" | "romantic" | "date" => {
                    (vec!["Jewelry", "Fashion", "Food"], "Romantic shopping experience")
                }
                "family" | "family_outing" => {
                    (vec!["Toys", "Food", "Entertainment"], "Family-friendly activities")
                }
                "quick_lunch" | "lunch" | "food" => (vec!["Food"], "Dining options"),
                "gift" | "gift_shopping" => (
                    vec!["Fashion", "Books", "Jewelry", "Beauty"],
                    "Gift shopping options",
                ),
                _ => (
                    self.catalog.categories().into_iter().collect(),
                    "General recommendations",
                ),
            };

        let preferences = args.preferences.unwrap_or_default();
        let mut suggested: Vec<Stop> = self
            .catalog
            .shops()
            .iter()
            .filter(|shop| categories.iter().any(|c| shop.is_category(c)))
            .filter(|shop| match preferences.budget {
                Some(BudgetLevel::Low) => shop.price_tier < PriceTier::Premium,
                Some(BudgetLevel::High) => shop.price_tier != PriceTier::Budget,
                Some(BudgetLevel::Medium) | None => true,
            })
            .cloned()
            .collect();

        // Stable: interest matches first, catalog order otherwise
        if !preferences.interests.is_empty() {
            suggested.sort_by_key(|shop| {
                !preferences
                    .interests
                    .iter()
                    .any(|interest| shop.is_category(interest))
            });
        }

        info!("Generated {} recommendations", suggested.len());
        Payload::Recommendations(Recommendations {
            context: args.context,
            description: description.to_string(),
            suggested,
        })
    }

    fn shop_hours(&self, args: ShopHoursArgs) -> Result<Payload, EngineError> {
        let shop = self.shop_named(&args.shop_name)?;

        let (status, open_now) = match (shop.hours, args.current_time.as_deref()) {
            (None, _) => ("Hours not listed".to_string(), None),
            (Some(hours), None) => (format!("Shop hours: {}", hours), None),
            (Some(hours), Some(raw)) => match parse_clock_time(raw) {
                Some(time) if hours.is_open_at(time) => {
                    (format!("Open now (hours: {})", hours), Some(true))
                }
                Some(_) => (format!("Closed now (hours: {})", hours), Some(false)),
                None => (format!("Check shop hours: {}", hours), None),
            },
        };

        Ok(Payload::Hours(HoursRecord {
            shop_name: shop.name.clone(),
            floor: shop.floor,
            hours: shop.hours,
            status,
            open_now,
        }))
    }

    fn accessibility(&self, args: ShopNameArgs) -> Result<Payload, EngineError> {
        let shop = self.shop_named(&args.shop_name)?;

        let elevators: Vec<&str> = self
            .catalog
            .facilities()
            .iter()
            .filter(|f| f.kind == "elevator")
            .map(|f| f.detail.as_deref().unwrap_or(&f.location))
            .collect();
        let elevator_access = if elevators.is_empty() {
            "Ask at the information desk for elevator access".to_string()
        } else {
            format!("{} serve Floor {}", elevators.join(", "), shop.floor)
        };

        let accessible_restroom_nearby = self.catalog.facilities().iter().any(|f| {
            f.kind == "restroom" && f.floor() == Some(shop.floor) && f.accessible == Some(true)
        });

        Ok(Payload::Accessibility(AccessibilityRecord {
            shop_name: shop.name.clone(),
            floor: shop.floor,
            wheelchair_accessible: true,
            elevator_access,
            wide_aisles: shop.floor <= 3,
            accessible_entrance: true,
            accessible_restroom_nearby,
            distance_from_elevator_m: (shop.id % 5 + 1) * 10,
        }))
    }

    fn facilities(&self, args: FacilityArgs) -> Result<Payload, EngineError> {
        let all = self.catalog.facilities();
        let Some(requested) = args.facility_type else {
            return Ok(Payload::Facilities(all.to_vec()));
        };

        let wanted = requested.trim().to_lowercase().replace(' ', "_");
        let matches = |kind: &str| -> Vec<FacilityRecord> {
            all.iter().filter(|f| f.kind == kind).cloned().collect()
        };

        let mut found = matches(&wanted);
        if found.is_empty() {
            if let Some(singular) = wanted.strip_suffix('s') {
                found = matches(singular);
            }
        }

        if found.is_empty() {
            return Err(EngineError::FacilityTypeNotFound {
                requested,
                available: self.catalog.facility_kinds().join(", "),
            });
        }
        Ok(Payload::Facilities(found))
    }

    fn wait_time(&self, args: WaitTimeArgs) -> Result<Payload, EngineError> {
        let shop = self
            .catalog
            .find_by_name(&args.location_name)
            .ok_or_else(|| EngineError::LocationNotFound(args.location_name.clone()))?;

        let seed = fnv1a(&shop.name.to_lowercase());
        let (wait_minutes, crowd_level) = if shop.is_category("food") {
            let wait = 5 + (seed % 26) as u32;
            (wait, if wait < 15 { CrowdLevel::Moderate } else { CrowdLevel::Busy })
        } else if shop.is_category("entertainment") {
            let wait = 10 + (seed % 36) as u32;
            (wait, if wait > 25 { CrowdLevel::Busy } else { CrowdLevel::Moderate })
        } else {
            ((seed % 11) as u32, CrowdLevel::Low)
        };

        let recommendation = if wait_minutes < 15 {
            "Good time to visit"
        } else if wait_minutes > 30 {
            "Consider visiting later"
        } else {
            "Moderate wait expected"
        };

        debug!("Wait time: {} min for {}", wait_minutes, shop.name);
        Ok(Payload::WaitTime(WaitTimeRecord {
            location: shop.name.clone(),
            wait_minutes,
            crowd_level,
            recommendation: recommendation.to_string(),
        }))
    }

    async fn search_lost_and_found(&self, args: LostSearchArgs) -> Payload {
        let items = self.lost_and_found.search(&args.item_type).await;
        info!("Found {} matching items", items.len());
        Payload::LostAndFound(LostAndFoundResults {
            search_term: args.item_type,
            items,
            instructions: CLAIM_INSTRUCTIONS.to_string(),
        })
    }
}

#[async_trait]
impl ToolBackend for VenueTools {
    async fn call(
        &self,
        operation: Operation,
        invocation: &ToolInvocation,
    ) -> Result<Value, EngineError> {
        debug!("Dispatching {} with {} args", operation, invocation.arguments.len());

        let payload = match operation {
            Operation::SearchShops => self.search_shops(decode(operation, invocation)?),
            Operation::GetShopDetails => self.shop_details(decode(operation, invocation)?)?,
            Operation::CalculateRoute => {
                let args: ShopIdsArgs = decode(operation, invocation)?;
                Payload::Route(self.planner.plan(&args.shop_ids)?)
            }
            Operation::VerifyRoute => {
                let args: VerifyRouteArgs = decode(operation, invocation)?;
                Payload::Verification(self.verifier.verify(&args.shop_ids, &args.constraints)?)
            }
            Operation::GetRecommendations => self.recommendations(decode(operation, invocation)?),
            Operation::CheckShopHours => self.shop_hours(decode(operation, invocation)?)?,
            Operation::GetAccessibilityInfo => self.accessibility(decode(operation, invocation)?)?,
            Operation::CalculateAccessibleRoute => {
                let args: ShopIdsArgs = decode(operation, invocation)?;
                Payload::AccessibleRoute(self.planner.plan_accessible(&args.shop_ids)?)
            }
            Operation::GetMallFacilities => self.facilities(decode(operation, invocation)?)?,
            Operation::GetCurrentEvents => Payload::Events(self.catalog.events().to_vec()),
            Operation::CheckWaitTime => self.wait_time(decode(operation, invocation)?)?,
            Operation::LogLostItem => {
                let args: LogLostItemArgs = decode(operation, invocation)?;
                Payload::LostItemLogged(
                    self.lost_and_found
                        .log(&args.description, &args.location, args.contact_info.as_deref())
                        .await,
                )
            }
            Operation::SearchLostAndFound => {
                self.search_lost_and_found(decode(operation, invocation)?).await
            }
            Operation::ShowReasoning => {
                let args: ReasoningArgs = decode(operation, invocation)?;
                Payload::Reasoning(ReasoningPayload { steps: args.steps })
            }
        };

        payload.encode()
    }
}

fn decode<T: DeserializeOwned>(
    operation: Operation,
    invocation: &ToolInvocation,
) -> Result<T, EngineError> {
    invocation
        .decode_args()
        .map_err(|e| EngineError::InvalidArguments {
            operation: operation.name().to_string(),
            reason: e.to_string(),
        })
}

/// 64-bit FNV-1a, stable across runs and platforms
fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tools() -> VenueTools {
        let catalog = Arc::new(VenueCatalog::demo().unwrap());
        VenueTools::new(
            catalog,
            Arc::new(LostAndFoundRegistry::seeded()),
            &PlanningConfig::default(),
        )
    }

    async fn run(op: Operation, args: Value) -> Result<Payload, EngineError> {
        let mut invocation = ToolInvocation::new(op.name());
        if let Value::Object(map) = args {
            invocation.arguments = map;
        }
        let value = tools().call(op, &invocation).await?;
        Payload::decode(op, value)
    }

    #[tokio::test]
    async fn test_search_by_category() {
        let Payload::Shops(shops) = run(Operation::SearchShops, json!({"category": "food"}))
            .await
            .unwrap()
        else {
            panic!("expected shops");
        };
        assert!(!shops.is_empty());
        assert!(shops.iter().all(|s| s.is_category("Food")));
    }

    #[tokio::test]
    async fn test_shop_details_by_id_and_name() {
        let by_id = run(Operation::GetShopDetails, json!({"shop_id": 1})).await.unwrap();
        let by_name = run(Operation::GetShopDetails, json!({"shop_name": "fashion forward"}))
            .await
            .unwrap();
        assert_eq!(by_id, by_name);

        let missing = run(Operation::GetShopDetails, json!({})).await;
        assert!(matches!(missing, Err(EngineError::InvalidArguments { .. })));
    }

    #[tokio::test]
    async fn test_route_with_no_ids() {
        let result = run(Operation::CalculateRoute, json!({"shop_ids": []})).await;
        assert!(matches!(result, Err(EngineError::NoValidStops)));
    }

    #[tokio::test]
    async fn test_malformed_arguments() {
        let result = run(Operation::CalculateRoute, json!({"shop_ids": "1,2"})).await;
        match result {
            Err(EngineError::InvalidArguments { operation, .. }) => {
                assert_eq!(operation, "calculate_route")
            }
            other => panic!("expected invalid arguments, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recommendations_budget_filter() {
        let Payload::Recommendations(recs) = run(
            Operation::GetRecommendations,
            json!({"context": "anniversary", "preferences": {"budget": "low"}}),
        )
        .await
        .unwrap() else {
            panic!("expected recommendations");
        };
        assert_eq!(recs.description, "Romantic shopping experience");
        assert!(!recs.suggested.is_empty());
        assert!(recs.suggested.iter().all(|s| s.price_tier < PriceTier::Premium));
        assert!(recs.suggested.iter().all(|s| !s.is_category("Books")));
    }

    #[tokio::test]
    async fn test_shop_hours_status() {
        let Payload::Hours(open) = run(
            Operation::CheckShopHours,
            json!({"shop_name": "Tech Haven", "current_time": "2:30 PM"}),
        )
        .await
        .unwrap() else {
            panic!("expected hours");
        };
        assert_eq!(open.open_now, Some(true));

        let Payload::Hours(closed) = run(
            Operation::CheckShopHours,
            json!({"shop_name": "Tech Haven", "current_time": "23:15"}),
        )
        .await
        .unwrap() else {
            panic!("expected hours");
        };
        assert_eq!(closed.open_now, Some(false));
        assert!(closed.status.starts_with("Closed"));
    }

    #[tokio::test]
    async fn test_accessibility_info() {
        let Payload::Accessibility(record) =
            run(Operation::GetAccessibilityInfo, json!({"shop_name": "Kids Kingdom"}))
                .await
                .unwrap()
        else {
            panic!("expected accessibility");
        };
        assert_eq!(record.floor, 4);
        assert!(!record.wide_aisles);
        assert!(!record.accessible_restroom_nearby);
        assert_eq!(record.distance_from_elevator_m, (6 % 5 + 1) * 10);
        assert!(record.elevator_access.contains("Elevator 1"));
    }

    #[tokio::test]
    async fn test_facilities_by_type() {
        let Payload::Facilities(restrooms) =
            run(Operation::GetMallFacilities, json!({"facility_type": "Restrooms"}))
                .await
                .unwrap()
        else {
            panic!("expected facilities");
        };
        assert_eq!(restrooms.len(), 5);

        let unknown = run(Operation::GetMallFacilities, json!({"facility_type": "helipad"})).await;
        match unknown {
            Err(EngineError::FacilityTypeNotFound { available, .. }) => {
                assert!(available.contains("atm"))
            }
            other => panic!("expected unknown facility type, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wait_time_is_stable() {
        let first = run(Operation::CheckWaitTime, json!({"location_name": "Sakura Sushi"}))
            .await
            .unwrap();
        let second = run(Operation::CheckWaitTime, json!({"location_name": "sakura sushi"}))
            .await
            .unwrap();
        assert_eq!(first, second);

        let Payload::WaitTime(record) = first else {
            panic!("expected wait time");
        };
        assert!((5..=30).contains(&record.wait_minutes));

        let missing = run(Operation::CheckWaitTime, json!({"location_name": "Nowhere"})).await;
        assert!(matches!(missing, Err(EngineError::LocationNotFound(_))));
    }

    #[tokio::test]
    async fn test_lost_and_found_round() {
        let tools = tools();
        let log = ToolInvocation::new("log_lost_item")
            .with_arg("description", json!("Red umbrella"))
            .with_arg("location", json!("Floor 2"));
        let logged = tools.call(Operation::LogLostItem, &log).await.unwrap();
        assert_eq!(logged["item_id"], json!(104));

        let search =
            ToolInvocation::new("search_lost_and_found").with_arg("item_type", json!("umbrella"));
        let found = Payload::decode(
            Operation::SearchLostAndFound,
            tools.call(Operation::SearchLostAndFound, &search).await.unwrap(),
        )
        .unwrap();
        let Payload::LostAndFound(results) = found else {
            panic!("expected lost and found");
        };
        assert_eq!(results.items.len(), 1);
        assert_eq!(results.instructions, CLAIM_INSTRUCTIONS);
    }

    #[test]
    fn test_fnv1a_known_value() {
        assert_eq!(fnv1a(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a("a"), 0xaf63_dc4c_8601_ec8c);
    }
}
