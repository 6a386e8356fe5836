//! Route Planner
//!
//! Orders stops floor by floor. Ties keep the caller's order, so a route is
//! reproducible from the same id list.

use crate::catalog::VenueCatalog;
use crate::config::RouteCostConfig;
use sdk::errors::EngineError;
use sdk::schema::{AccessibilityFeatures, Route, RouteStop};
use sdk::venue::Stop;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

const ACCESSIBLE_NOTES: [&str; 4] = [
    "All routes use elevators only",
    "Wide aisles throughout the path",
    "Accessible restrooms on each floor",
    "Rest areas available every 50 meters",
];

/// Walking estimate for `stops` visits across `floors` distinct floors
pub fn estimate_minutes(stops: usize, floors: usize, per_stop: u32, per_floor: u32) -> u32 {
    let stops = u32::try_from(stops).unwrap_or(u32::MAX);
    let floors = u32::try_from(floors).unwrap_or(u32::MAX);
    stops
        .saturating_mul(per_stop)
        .saturating_add(floors.saturating_mul(per_floor))
}

pub struct RoutePlanner {
    catalog: Arc<VenueCatalog>,
    costs: RouteCostConfig,
}

impl RoutePlanner {
    pub fn new(catalog: Arc<VenueCatalog>, costs: RouteCostConfig) -> Self {
        Self { catalog, costs }
    }

    /// Standard route: 15 min per stop plus 3 per floor by default
    pub fn plan(&self, stop_ids: &[u32]) -> Result<Route, EngineError> {
        let (stops, unresolved) = self.sorted_stops(stop_ids)?;
        let floors = distinct_floors(&stops);
        let estimated = estimate_minutes(
            stops.len(),
            floors.len(),
            self.costs.per_stop_minutes,
            self.costs.per_floor_minutes,
        );

        debug!(
            "Route planned: {} stops across {} floors, ~{} min",
            stops.len(),
            floors.len(),
            estimated
        );
        Ok(build_route(&stops, floors, estimated, unresolved, None))
    }

    /// Elevator-only route with slower transit and one rest point per floor
    pub fn plan_accessible(&self, stop_ids: &[u32]) -> Result<Route, EngineError> {
        let (stops, unresolved) = self.sorted_stops(stop_ids)?;
        let floors = distinct_floors(&stops);
        let estimated = estimate_minutes(
            stops.len(),
            floors.len(),
            self.costs.accessible_per_stop_minutes,
            self.costs.accessible_per_floor_minutes,
        );

        let features = AccessibilityFeatures {
            elevator_only: true,
            no_escalators: true,
            wide_pathways: true,
            rest_points: floors.len(),
        };

        debug!(
            "Accessible route planned: {} stops, {} rest points",
            stops.len(),
            features.rest_points
        );
        Ok(build_route(&stops, floors, estimated, unresolved, Some(features)))
    }

    fn sorted_stops(&self, stop_ids: &[u32]) -> Result<(Vec<&Stop>, Vec<u32>), EngineError> {
        let resolved = self.catalog.resolve(stop_ids);
        if !resolved.unresolved.is_empty() {
            warn!("Skipping unknown stop ids: {:?}", resolved.unresolved);
        }
        if resolved.stops.is_empty() {
            return Err(EngineError::NoValidStops);
        }

        let mut stops = resolved.stops;
        // sort_by_key is stable
        stops.sort_by_key(|s| s.floor);
        Ok((stops, resolved.unresolved))
    }
}

fn distinct_floors(stops: &[&Stop]) -> BTreeSet<u32> {
    stops.iter().map(|s| s.floor).collect()
}

fn build_route(
    stops: &[&Stop],
    floors: BTreeSet<u32>,
    estimated_minutes: u32,
    unresolved_ids: Vec<u32>,
    accessibility: Option<AccessibilityFeatures>,
) -> Route {
    let floor_changes = stops.windows(2).filter(|w| w[0].floor != w[1].floor).count();

    let sequence = stops
        .iter()
        .enumerate()
        .map(|(i, stop)| RouteStop {
            sequence: i + 1,
            stop_id: stop.id,
            name: stop.name.clone(),
            floor: stop.floor,
            category: stop.category.clone(),
        })
        .collect();

    let notes = if accessibility.is_some() {
        ACCESSIBLE_NOTES.iter().map(|n| n.to_string()).collect()
    } else {
        Vec::new()
    };

    Route {
        stop_ids: stops.iter().map(|s| s.id).collect(),
        distinct_floors: floors.len(),
        floors_visited: floors.into_iter().collect(),
        floor_changes,
        estimated_minutes,
        sequence,
        accessibility,
        notes,
        unresolved_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VenueData;
    use sdk::venue::PriceTier;

    fn stop(id: u32, floor: u32, category: &str) -> Stop {
        Stop {
            id,
            name: format!("Stop {}", id),
            category: category.to_string(),
            floor,
            price_tier: PriceTier::Moderate,
            rating: None,
            description: String::new(),
            hours: None,
            specialties: vec![],
        }
    }

    fn planner() -> RoutePlanner {
        let catalog = VenueCatalog::from_data(VenueData {
            name: "Test".to_string(),
            shops: vec![
                stop(1, 1, "Fashion"),
                stop(2, 3, "Food"),
                stop(3, 1, "Jewelry"),
                stop(4, 2, "Books"),
            ],
            facilities: vec![],
            events: vec![],
        })
        .unwrap();
        RoutePlanner::new(Arc::new(catalog), RouteCostConfig::default())
    }

    #[test]
    fn test_plan_two_floors() {
        let route = planner().plan(&[1, 2]).unwrap();
        assert_eq!(route.stop_ids, vec![1, 2]);
        assert_eq!(route.distinct_floors, 2);
        assert_eq!(route.estimated_minutes, 15 * 2 + 3 * 2);
        assert!(route.accessibility.is_none());
    }

    #[test]
    fn test_plan_sorts_by_floor_stably() {
        let route = planner().plan(&[2, 3, 4, 1]).unwrap();
        assert_eq!(route.stop_ids, vec![3, 1, 4, 2]);
        assert_eq!(route.floors_visited, vec![1, 2, 3]);
        assert_eq!(route.floor_changes, 2);
        assert_eq!(route.sequence[0].sequence, 1);
        assert_eq!(route.sequence[3].category, "Food");
    }

    #[test]
    fn test_plan_accessible() {
        let route = planner().plan_accessible(&[1, 2, 4]).unwrap();
        assert_eq!(route.estimated_minutes, 20 * 3 + 5 * 3);
        let features = route.accessibility.unwrap();
        assert!(features.elevator_only);
        assert_eq!(features.rest_points, 3);
        assert_eq!(route.notes.len(), ACCESSIBLE_NOTES.len());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(planner().plan(&[]), Err(EngineError::NoValidStops)));
        assert!(matches!(
            planner().plan_accessible(&[]),
            Err(EngineError::NoValidStops)
        ));
    }

    #[test]
    fn test_unknown_ids() {
        assert!(matches!(planner().plan(&[40, 41]), Err(EngineError::NoValidStops)));

        let route = planner().plan(&[40, 1, 1]).unwrap();
        assert_eq!(route.stop_ids, vec![1]);
        assert_eq!(route.unresolved_ids, vec![40]);
    }

    #[test]
    fn test_estimate_saturates() {
        assert_eq!(estimate_minutes(usize::MAX, 1, 15, 3), u32::MAX);
        assert_eq!(estimate_minutes(0, 0, 15, 3), 0);
    }
}
