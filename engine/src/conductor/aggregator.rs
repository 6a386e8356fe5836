//! Result Aggregator
//!
//! Folds the heterogeneous outcomes of one pass into a `PlanningDataset`.
//! Every payload is decoded into its `Payload` variant first, so an operation
//! without a merge rule does not compile.

use crate::conductor::types::PlanningDataset;
use sdk::schema::{Operation, Payload};
use sdk::types::ToolOutcome;
use sdk::venue::Stop;
use tracing::{debug, warn};

/// Aggregate outcomes in order. Failed outcomes are skipped and undecodable
/// payloads contribute nothing.
pub fn aggregate(outcomes: &[ToolOutcome]) -> PlanningDataset {
    let mut dataset = PlanningDataset {
        attempted: outcomes.len(),
        ..Default::default()
    };

    for outcome in outcomes {
        if !outcome.success {
            debug!(
                "Skipping failed {} outcome: {}",
                outcome.operation,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
            continue;
        }
        dataset.succeeded += 1;

        let payload = outcome
            .operation
            .parse::<Operation>()
            .and_then(|op| Payload::decode(op, outcome.payload.clone()));

        match payload {
            Ok(payload) => dataset.merge(payload),
            Err(e) => {
                warn!("Dropping {} payload: {}", outcome.operation, e);
                dataset.decode_failures += 1;
            }
        }
    }

    debug!(
        "Aggregated {}/{} outcomes: {} shops, {} recommended, route: {}",
        dataset.succeeded,
        dataset.attempted,
        dataset.shops.len(),
        dataset.recommended.len(),
        dataset.route.is_some()
    );
    dataset
}

impl PlanningDataset {
    /// Fold one decoded payload into the dataset
    pub fn merge(&mut self, payload: Payload) {
        match payload {
            Payload::Shops(shops) => extend_unique(&mut self.shops, shops),
            Payload::ShopDetail(shop) => extend_unique(&mut self.shop_details, [shop]),
            Payload::Route(route) | Payload::AccessibleRoute(route) => self.route = Some(route),
            Payload::Verification(report) => {
                self.route_verified = Some(report.verified);
                self.verification = Some(report);
            }
            Payload::Recommendations(recs) => extend_unique(&mut self.recommended, recs.suggested),
            Payload::Hours(record) => self.hours.push(record),
            Payload::Accessibility(record) => {
                self.accessibility
                    .entry(record.shop_name.trim().to_lowercase())
                    .or_insert(record);
            }
            Payload::Facilities(records) => self.facilities.extend(records),
            Payload::Events(records) => self.events.extend(records),
            Payload::WaitTime(record) => self.wait_times.push(record),
            Payload::LostItemLogged(record) => self.lost_and_found.push(record),
            Payload::LostAndFound(results) => self.lost_and_found.extend(results.items),
            Payload::Reasoning(reasoning) => self.reasoning.extend(reasoning.steps),
        }
    }
}

fn extend_unique(target: &mut Vec<Stop>, incoming: impl IntoIterator<Item = Stop>) {
    for stop in incoming {
        if !target.iter().any(|s| s.id == stop.id) {
            target.push(stop);
        }
    }
}
