//! Itinerary Renderer
//!
//! Picks one response shape from the dataset by strict priority and renders
//! it as plain text. Output depends only on the inputs, so the same dataset,
//! allocation and report always render identically.

use crate::catalog::lost_found::CLAIM_INSTRUCTIONS;
use crate::conductor::allocator::{Slot, TimeAllocation};
use crate::conductor::context::VisitContext;
use crate::conductor::types::{ItineraryStop, PlanningDataset};
use chrono::NaiveDateTime;
use sdk::schema::{Route, VerificationReport};
use sdk::venue::{EventKind, EventRecord, FacilityRecord, Stop};
use std::fmt::Write;

pub const APOLOGY: &str =
    "I apologize, but I encountered an error processing your request. Could you rephrase?";
pub const ACKNOWLEDGMENT: &str = "I've processed your request. How else can I help?";

/// Response shapes, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Apology,
    Itinerary,
    ShopDetail,
    RouteSummary,
    Facilities,
    Events,
    LostAndFound,
    WaitTimes,
    Acknowledgment,
}

impl ResponseShape {
    pub fn classify(dataset: &PlanningDataset) -> Self {
        if dataset.all_failed() {
            Self::Apology
        } else if !dataset.shops.is_empty() || !dataset.recommended.is_empty() {
            Self::Itinerary
        } else if !dataset.shop_details.is_empty() {
            Self::ShopDetail
        } else if dataset.route.is_some() {
            Self::RouteSummary
        } else if !dataset.facilities.is_empty() {
            Self::Facilities
        } else if !dataset.events.is_empty() {
            Self::Events
        } else if !dataset.lost_and_found.is_empty() {
            Self::LostAndFound
        } else if !dataset.wait_times.is_empty() {
            Self::WaitTimes
        } else {
            Self::Acknowledgment
        }
    }
}

pub struct ItineraryRenderer {
    venue_name: String,
    context: VisitContext,
}

impl ItineraryRenderer {
    pub fn new(venue_name: impl Into<String>) -> Self {
        Self {
            venue_name: venue_name.into(),
            context: VisitContext::default(),
        }
    }

    pub fn with_context(mut self, context: VisitContext) -> Self {
        self.context = context;
        self
    }

    /// Render the dataset. `report` falls back to the dataset's own
    /// verification report.
    pub fn render(
        &self,
        dataset: &PlanningDataset,
        allocation: Option<&TimeAllocation>,
        report: Option<&VerificationReport>,
    ) -> String {
        let report = report.or(dataset.verification.as_ref());

        match ResponseShape::classify(dataset) {
            ResponseShape::Apology => APOLOGY.to_string(),
            ResponseShape::Itinerary => self.itinerary(dataset, allocation, report),
            ResponseShape::ShopDetail => dataset
                .shop_details
                .iter()
                .map(|shop| detail_card(shop, dataset))
                .collect::<Vec<_>>()
                .join("\n\n"),
            ResponseShape::RouteSummary => match &dataset.route {
                Some(route) => route_summary(route, report),
                None => ACKNOWLEDGMENT.to_string(),
            },
            ResponseShape::Facilities => facility_listing(&dataset.facilities),
            ResponseShape::Events => event_listing(&dataset.events),
            ResponseShape::LostAndFound => lost_and_found_listing(dataset),
            ResponseShape::WaitTimes => wait_time_listing(dataset),
            ResponseShape::Acknowledgment => ACKNOWLEDGMENT.to_string(),
        }
    }

    fn headline(&self) -> String {
        let lead = self
            .context
            .occasion
            .map(|o| o.headline())
            .unwrap_or("Your visit plan");
        if self.venue_name.is_empty() {
            lead.to_string()
        } else {
            format!("{} at {}", lead, self.venue_name)
        }
    }

    fn itinerary(
        &self,
        dataset: &PlanningDataset,
        allocation: Option<&TimeAllocation>,
        report: Option<&VerificationReport>,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.headline());

        match (allocation.and_then(|a| a.budget_minutes), self.context.minutes_hint) {
            (Some(budget), _) => {
                let _ = writeln!(out, "Time budget: {} min", budget);
            }
            (None, Some(hint)) => {
                let _ = writeln!(out, "Planned around your ~{} minute window", hint);
            }
            (None, None) => {}
        }
        if let Some(report) = report {
            let _ = writeln!(out, "{}", badge(report));
        }

        for (index, stop) in dataset.itinerary_stops().into_iter().enumerate() {
            let slot = allocation.and_then(|a| a.get(stop.id()));
            out.push('\n');
            render_stop(&mut out, index + 1, stop, slot, dataset);
        }

        if let Some(end) = allocation.and_then(TimeAllocation::ends_at) {
            let _ = write!(out, "\nYou should be done around {}.", clock(end));
        }
        out.trim_end().to_string()
    }
}

fn render_stop(
    out: &mut String,
    number: usize,
    stop: ItineraryStop<'_>,
    slot: Option<&Slot>,
    dataset: &PlanningDataset,
) {
    let (name, floor) = (stop.name(), stop.floor());
    match slot {
        Some(slot) => {
            let _ = writeln!(
                out,
                "{}. {} - {}  {} ({})",
                number,
                clock(slot.start),
                clock(slot.end),
                name,
                stop.category()
            );
        }
        None => {
            let _ = writeln!(out, "{}. {} ({})", number, name, stop.category());
        }
    }

    let mut facts = vec![format!("Floor {}", floor)];
    if let Some(details) = stop.details() {
        facts.push(details.price_tier.to_string());
        if let Some(rating) = details.rating {
            facts.push(format!("Rating {:.1}", rating));
        }
    }
    if let Some(status) = open_status(stop, slot, dataset) {
        facts.push(status);
    }
    let _ = writeln!(out, "   {}", facts.join(" | "));

    if let Some(wait) = dataset.wait_time_for(name) {
        let _ = writeln!(
            out,
            "   Wait: ~{} min ({}). {}",
            wait.wait_minutes, wait.crowd_level, wait.recommendation
        );
    }

    let events: Vec<&str> = dataset
        .events
        .iter()
        .filter(|e| e.applies_at(name, floor))
        .map(|e| e.name.as_str())
        .collect();
    if !events.is_empty() {
        let _ = writeln!(out, "   Events: {}", events.join(", "));
    }

    if let Some(access) = dataset.accessibility_for(name) {
        let mut notes = vec![
            access.elevator_access.clone(),
            format!("{} m from elevator", access.distance_from_elevator_m),
        ];
        if access.wide_aisles {
            notes.push("wide aisles".to_string());
        }
        if access.accessible_restroom_nearby {
            notes.push("accessible restroom nearby".to_string());
        }
        let _ = writeln!(out, "   Accessibility: {}", notes.join("; "));
    }

    let nearby: Vec<String> = dataset
        .facilities
        .iter()
        .filter(|f| f.floor() == Some(floor))
        .map(|f| format!("{} ({})", facility_kind(f), f.location))
        .collect();
    if !nearby.is_empty() {
        let _ = writeln!(out, "   Nearby: {}", nearby.join(", "));
    }
}

/// Open/closed at the scheduled start, or the last reported status
fn open_status(
    stop: ItineraryStop<'_>,
    slot: Option<&Slot>,
    dataset: &PlanningDataset,
) -> Option<String> {
    let hours = stop.details().and_then(|s| s.hours);
    match (hours, slot) {
        (Some(hours), Some(slot)) => {
            let state = if hours.is_open_at(slot.start.time()) {
                "Open"
            } else {
                "Closed"
            };
            Some(format!("{} at {} (hours {})", state, clock(slot.start), hours))
        }
        _ => {
            let record = dataset.hours_for(stop.name());
            match (record.and_then(|r| r.open_now), hours) {
                (Some(true), _) => Some("Open now".to_string()),
                (Some(false), _) => Some("Closed now".to_string()),
                (None, Some(hours)) => Some(format!("Hours {}", hours)),
                (None, None) => None,
            }
        }
    }
}

fn detail_card(shop: &Stop, dataset: &PlanningDataset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", shop.name, shop.category);
    let _ = writeln!(out, "Floor {} | {}", shop.floor, shop.price_tier);
    if let Some(rating) = shop.rating {
        let _ = writeln!(out, "Rating: {:.1}/5", rating);
    }
    if let Some(hours) = shop.hours {
        let _ = writeln!(out, "Hours: {}", hours);
    }
    if !shop.description.is_empty() {
        let _ = writeln!(out, "{}", shop.description);
    }
    if !shop.specialties.is_empty() {
        let _ = writeln!(out, "Specialties: {}", shop.specialties.join(", "));
    }
    if let Some(access) = dataset.accessibility_for(&shop.name) {
        let _ = writeln!(out, "Accessibility: {}", access.elevator_access);
    }
    out.trim_end().to_string()
}

fn route_summary(route: &Route, report: Option<&VerificationReport>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Route: {} stops across {} floor(s), about {} min",
        route.stop_ids.len(),
        route.distinct_floors,
        route.estimated_minutes
    );
    if let Some(report) = report {
        let _ = writeln!(out, "{}", badge(report));
    }
    for stop in &route.sequence {
        let _ = writeln!(
            out,
            "{}. {} (Floor {}, {})",
            stop.sequence, stop.name, stop.floor, stop.category
        );
    }
    if let Some(features) = &route.accessibility {
        let _ = writeln!(
            out,
            "Elevator-only route with {} rest point(s)",
            features.rest_points
        );
    }
    for note in &route.notes {
        let _ = writeln!(out, "- {}", note);
    }
    if !route.unresolved_ids.is_empty() {
        let ids: Vec<String> = route.unresolved_ids.iter().map(u32::to_string).collect();
        let _ = writeln!(out, "Skipped unknown stops: {}", ids.join(", "));
    }
    out.trim_end().to_string()
}

fn badge(report: &VerificationReport) -> String {
    if report.verified {
        return "[verified] All constraints met".to_string();
    }
    let failed: Vec<String> = report
        .failed_checks()
        .map(|c| format!("{} (required {}, actual {})", c.constraint, c.required, c.actual))
        .collect();
    format!("[not verified] {}", failed.join("; "))
}

fn facility_kind(facility: &FacilityRecord) -> String {
    facility.kind.replace('_', " ")
}

fn facility_listing(facilities: &[FacilityRecord]) -> String {
    let mut out = String::from("Facilities:");
    for facility in facilities {
        let _ = write!(out, "\n- {}: {}", facility_kind(facility), facility.location);
        if facility.accessible == Some(true) {
            out.push_str(" (accessible)");
        }
        if let Some(detail) = &facility.detail {
            let _ = write!(out, " - {}", detail);
        }
    }
    out
}

fn event_listing(events: &[EventRecord]) -> String {
    let sections = [
        (EventKind::Ongoing, "Happening now:"),
        (EventKind::Promotion, "Promotions:"),
        (EventKind::Upcoming, "Coming up:"),
    ];

    let mut blocks = Vec::new();
    for (kind, title) in sections {
        let mut block = String::from(title);
        let mut any = false;
        for event in events.iter().filter(|e| e.kind == kind) {
            any = true;
            let _ = write!(block, "\n- {}", event.name);
            if let Some(location) = &event.location {
                let _ = write!(block, " ({})", location);
            }
            if let Some(schedule) = &event.schedule {
                let _ = write!(block, ", {}", schedule);
            }
            if !event.description.is_empty() {
                let _ = write!(block, ": {}", event.description);
            }
        }
        if any {
            blocks.push(block);
        }
    }
    blocks.join("\n\n")
}

fn lost_and_found_listing(dataset: &PlanningDataset) -> String {
    let mut out = String::from("Lost & found:");
    for item in &dataset.lost_and_found {
        let _ = write!(
            out,
            "\n- #{} {}, {} ({}). {}",
            item.item_id, item.description, item.location, item.date, item.status
        );
    }
    let _ = write!(out, "\n\n{}", CLAIM_INSTRUCTIONS);
    out
}

fn wait_time_listing(dataset: &PlanningDataset) -> String {
    let mut out = String::from("Current wait times:");
    for wait in &dataset.wait_times {
        let _ = write!(
            out,
            "\n- {}: ~{} min, {}. {}",
            wait.location, wait.wait_minutes, wait.crowd_level, wait.recommendation
        );
    }
    out
}

fn clock(time: NaiveDateTime) -> String {
    time.format("%-I:%M %p").to_string()
}
