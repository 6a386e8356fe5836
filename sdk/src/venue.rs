//! Venue data types
//!
//! Stops, opening hours, facilities and events as they appear in venue data
//! files and tool payloads.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single visitable location (shop, restaurant, attraction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub floor: u32,
    #[serde(rename = "price_range", alias = "price_tier")]
    pub price_tier: PriceTier,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hours: Option<Hours>,
    #[serde(default)]
    pub specialties: Vec<String>,
}

impl Stop {
    /// Case-insensitive category comparison
    pub fn is_category(&self, category: &str) -> bool {
        self.category.eq_ignore_ascii_case(category)
    }

    /// Case-insensitive name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

/// Price tier, written on the wire as a run of dollar signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceTier {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Premium,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl PriceTier {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Budget => "$",
            Self::Moderate => "$$",
            Self::Premium => "$$$",
            Self::Luxury => "$$$$",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Daily opening hours.
///
/// Accepted wire forms: `"10:00 AM - 10:00 PM"` and `"10:00 - 22:00"`.
/// A close time at or before the open time means the stop closes after
/// midnight; identical times mean open around the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Hours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    /// Parse an hours range such as `"10:00 AM - 10:00 PM"`
    pub fn parse(raw: &str) -> Option<Self> {
        let (open, close) = raw.split_once('-')?;
        Some(Self {
            open: parse_clock_time(open)?,
            close: parse_clock_time(close)?,
        })
    }

    /// Whether the stop is open at the given time of day
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        if self.open == self.close {
            true
        } else if self.open < self.close {
            self.open <= time && time < self.close
        } else {
            time >= self.open || time < self.close
        }
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.open.format("%-I:%M %p"),
            self.close.format("%-I:%M %p")
        )
    }
}

impl TryFrom<String> for Hours {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid hours '{}'", value))
    }
}

impl From<Hours> for String {
    fn from(hours: Hours) -> Self {
        hours.to_string()
    }
}

/// Parse a clock time in `"HH:MM AM/PM"` or 24-hour `"HH:MM"` form
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    ["%I:%M %p", "%I:%M%p", "%H:%M", "%I %p"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
}

/// Extract the floor number from a location such as `"Floor 3, East Wing"`.
/// The first `floor ` followed by digits wins.
pub fn floor_from_location(location: &str) -> Option<u32> {
    let lower = location.to_ascii_lowercase();
    lower.match_indices("floor ").find_map(|(at, word)| {
        let digits: String = lower[at + word.len()..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    })
}

/// A venue facility (restroom, ATM, nursing room, parking, elevator, info desk).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub kind: String,
    pub location: String,
    #[serde(default)]
    pub floor: Option<u32>,
    #[serde(default)]
    pub accessible: Option<bool>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl FacilityRecord {
    /// Explicit floor, or the one named in the location text
    pub fn floor(&self) -> Option<u32> {
        self.floor.or_else(|| floor_from_location(&self.location))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Ongoing,
    Promotion,
    Upcoming,
}

/// An event, promotion, or upcoming activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    pub kind: EventKind,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub featured_shops: Vec<String>,
    #[serde(default)]
    pub cost: Option<String>,
}

impl EventRecord {
    /// Whether the event is relevant to a visit to the named stop
    ///
    /// True when the stop is featured, the event spans all floors, or the
    /// event takes place on `floor`.
    pub fn applies_at(&self, name: &str, floor: u32) -> bool {
        if self
            .featured_shops
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(name.trim()))
        {
            return true;
        }
        match self.location.as_deref() {
            Some(loc) if loc.eq_ignore_ascii_case("all floors") => true,
            Some(loc) => floor_from_location(loc) == Some(floor),
            None => false,
        }
    }
}
