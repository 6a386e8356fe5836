//! Venue Catalog
//!
//! Read-only store of the venue's stops, facilities and events, loaded from a
//! JSON venue-data file. A small demo venue is bundled for the CLI and tests.

pub mod lost_found;

pub use lost_found::LostAndFoundRegistry;

use sdk::errors::EngineError;
use sdk::schema::SearchShopsArgs;
use sdk::venue::{EventRecord, FacilityRecord, Stop};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const DEMO_VENUE: &str = include_str!("../../data/grand_plaza.json");

/// On-disk venue data layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueData {
    #[serde(default)]
    pub name: String,
    pub shops: Vec<Stop>,
    #[serde(default)]
    pub facilities: Vec<FacilityRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

/// Stops resolved from a list of ids
#[derive(Debug)]
pub struct Resolved<'a> {
    /// Known stops, in first-mention order, each at most once
    pub stops: Vec<&'a Stop>,
    /// Ids absent from the catalog
    pub unresolved: Vec<u32>,
}

#[derive(Debug)]
pub struct VenueCatalog {
    name: String,
    shops: Vec<Stop>,
    by_id: HashMap<u32, usize>,
    facilities: Vec<FacilityRecord>,
    events: Vec<EventRecord>,
}

impl VenueCatalog {
    /// Build a catalog, rejecting duplicate ids and out-of-range values
    pub fn from_data(data: VenueData) -> Result<Self, EngineError> {
        let mut by_id = HashMap::with_capacity(data.shops.len());

        for (index, shop) in data.shops.iter().enumerate() {
            if shop.floor < 1 {
                return Err(EngineError::Catalog(format!(
                    "shop {} ('{}') has floor {}; floors start at 1",
                    shop.id, shop.name, shop.floor
                )));
            }
            if let Some(rating) = shop.rating {
                if !(0.0..=5.0).contains(&rating) {
                    return Err(EngineError::Catalog(format!(
                        "shop {} ('{}') has rating {} outside 0-5",
                        shop.id, shop.name, rating
                    )));
                }
            }
            if by_id.insert(shop.id, index).is_some() {
                return Err(EngineError::Catalog(format!("duplicate shop id {}", shop.id)));
            }
        }

        Ok(Self {
            name: data.name,
            shops: data.shops,
            by_id,
            facilities: data.facilities,
            events: data.events,
        })
    }

    /// Parse venue data from JSON text
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let data: VenueData = serde_json::from_str(raw)
            .map_err(|e| EngineError::Catalog(format!("Failed to parse venue data: {}", e)))?;
        Self::from_data(data)
    }

    /// Load venue data from a file
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = fs::read_to_string(path)?;
        let catalog = Self::from_json(&raw)?;
        info!(
            "Loaded venue '{}' with {} shops from {:?}",
            catalog.name,
            catalog.shops.len(),
            path
        );
        Ok(catalog)
    }

    /// The bundled demo venue
    pub fn demo() -> Result<Self, EngineError> {
        Self::from_json(DEMO_VENUE)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shops(&self) -> &[Stop] {
        &self.shops
    }

    pub fn facilities(&self) -> &[FacilityRecord] {
        &self.facilities
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn get(&self, id: u32) -> Option<&Stop> {
        self.by_id.get(&id).map(|&i| &self.shops[i])
    }

    /// Case-insensitive lookup by shop name
    pub fn find_by_name(&self, name: &str) -> Option<&Stop> {
        self.shops.iter().find(|s| s.is_named(name))
    }

    /// Filter by category (case-insensitive), exact floor, and keyword
    /// (substring of name, description, or category)
    pub fn filter(&self, args: &SearchShopsArgs) -> Vec<&Stop> {
        let keyword = args.keyword.as_deref().map(str::to_lowercase);

        self.shops
            .iter()
            .filter(|shop| {
                args.category
                    .as_deref()
                    .map_or(true, |c| shop.is_category(c))
            })
            .filter(|shop| args.floor.map_or(true, |f| shop.floor == f))
            .filter(|shop| {
                keyword.as_deref().map_or(true, |k| {
                    shop.name.to_lowercase().contains(k)
                        || shop.description.to_lowercase().contains(k)
                        || shop.category.to_lowercase().contains(k)
                })
            })
            .collect()
    }

    /// Resolve stop ids in input order; repeats are dropped
    pub fn resolve(&self, ids: &[u32]) -> Resolved<'_> {
        let mut seen = HashSet::new();
        let mut stops = Vec::new();
        let mut unresolved = Vec::new();

        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            match self.get(id) {
                Some(stop) => stops.push(stop),
                None => {
                    debug!("Stop id {} is not in the catalog", id);
                    unresolved.push(id);
                }
            }
        }

        Resolved { stops, unresolved }
    }

    /// Every category in the catalog, sorted
    pub fn categories(&self) -> BTreeSet<&str> {
        self.shops.iter().map(|s| s.category.as_str()).collect()
    }

    /// Facility kinds in first-listed order
    pub fn facility_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for facility in &self.facilities {
            if !kinds.contains(&facility.kind.as_str()) {
                kinds.push(&facility.kind);
            }
        }
        kinds
    }
}
