//! Constraint Verifier
//!
//! Checks a candidate route against a declarative constraint set. Only the
//! keys present in the set are evaluated, always in the same order, so a
//! report is reproducible byte for byte.

use crate::catalog::VenueCatalog;
use crate::conductor::route::estimate_minutes;
use crate::config::{ConstraintConfig, RouteCostConfig};
use sdk::errors::EngineError;
use sdk::schema::{ConstraintCheck, ConstraintSet, VerificationReport};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

pub struct ConstraintVerifier {
    catalog: Arc<VenueCatalog>,
    costs: RouteCostConfig,
    limits: ConstraintConfig,
}

impl ConstraintVerifier {
    pub fn new(
        catalog: Arc<VenueCatalog>,
        costs: RouteCostConfig,
        limits: ConstraintConfig,
    ) -> Self {
        Self {
            catalog,
            costs,
            limits,
        }
    }

    pub fn verify(
        &self,
        stop_ids: &[u32],
        constraints: &ConstraintSet,
    ) -> Result<VerificationReport, EngineError> {
        let resolved = self.catalog.resolve(stop_ids);
        if resolved.stops.is_empty() {
            return Err(EngineError::NoValidStops);
        }
        let stops = resolved.stops;

        for key in constraints.other.keys() {
            debug!("Ignoring unsupported constraint '{}'", key);
        }

        let floors: BTreeSet<u32> = stops.iter().map(|s| s.floor).collect();
        let mut checks = Vec::new();

        if let Some(max_floors) = constraints.max_floors {
            let actual = floors.len();
            checks.push(ConstraintCheck {
                constraint: "max_floors".to_string(),
                required: json!(max_floors),
                actual: json!(actual),
                passed: actual <= max_floors as usize,
            });
        }

        if let Some(max_minutes) = constraints.max_time_minutes {
            let actual = estimate_minutes(
                stops.len(),
                floors.len(),
                self.costs.per_stop_minutes,
                self.costs.per_floor_minutes,
            );
            checks.push(ConstraintCheck {
                constraint: "max_time_minutes".to_string(),
                required: json!(max_minutes),
                actual: json!(actual),
                passed: actual <= max_minutes,
            });
        }

        if let Some(required) = &constraints.required_categories {
            let present: BTreeSet<&str> = stops.iter().map(|s| s.category.as_str()).collect();
            let passed = required
                .iter()
                .all(|want| present.iter().any(|have| have.eq_ignore_ascii_case(want)));
            checks.push(ConstraintCheck {
                constraint: "required_categories".to_string(),
                required: json!(required),
                actual: json!(present),
                passed,
            });
        }

        if constraints.lower_floors_only == Some(true) {
            let max_floor = floors.iter().next_back().copied().unwrap_or(0);
            checks.push(ConstraintCheck {
                constraint: "lower_floors_only".to_string(),
                required: json!(self.limits.lower_floor_threshold),
                actual: json!(max_floor),
                passed: max_floor <= self.limits.lower_floor_threshold,
            });
        }

        let verified = checks.iter().all(|c| c.passed);
        debug!(
            "Verified {} constraints over {} stops: {}",
            checks.len(),
            stops.len(),
            if verified { "pass" } else { "fail" }
        );

        Ok(VerificationReport { verified, checks })
    }
}
