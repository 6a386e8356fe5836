//! Time Allocator
//!
//! Spreads a visit's time budget across its stops. With a budget every
//! category's base dwell time is scaled by `budget / needed`; the whole budget
//! is spent even when the per-stop floor pushes the total past it.

use crate::config::ScheduleConfig;
use chrono::{Duration, NaiveDateTime};
use sdk::venue::Stop;
use serde::Serialize;
use tracing::debug;

/// One scheduled stop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub stop_id: u32,
    pub duration_minutes: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Ordered schedule for one planning pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeAllocation {
    pub slots: Vec<Slot>,
    pub budget_minutes: Option<u32>,
}

impl TimeAllocation {
    pub fn get(&self, stop_id: u32) -> Option<&Slot> {
        self.slots.iter().find(|s| s.stop_id == stop_id)
    }

    /// Sum of dwell times, travel buffers excluded
    pub fn total_minutes(&self) -> u32 {
        self.slots.iter().map(|s| s.duration_minutes).sum()
    }

    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        self.slots.last().map(|s| s.end)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Anything the allocator can put on a schedule
pub trait Schedulable {
    fn stop_id(&self) -> u32;
    fn category(&self) -> &str;
}

impl Schedulable for Stop {
    fn stop_id(&self) -> u32 {
        self.id
    }

    fn category(&self) -> &str {
        &self.category
    }
}

impl<T: Schedulable + ?Sized> Schedulable for &T {
    fn stop_id(&self) -> u32 {
        (**self).stop_id()
    }

    fn category(&self) -> &str {
        (**self).category()
    }
}

pub struct TimeAllocator {
    schedule: ScheduleConfig,
}

impl TimeAllocator {
    pub fn new(schedule: ScheduleConfig) -> Self {
        Self { schedule }
    }

    /// Allocate starting at `now`
    pub fn allocate_at<S: Schedulable>(
        &self,
        stops: &[S],
        budget_minutes: Option<u32>,
        now: NaiveDateTime,
    ) -> TimeAllocation {
        let bases: Vec<u32> = stops
            .iter()
            .map(|s| self.schedule.base_for(s.category()))
            .collect();
        let needed: u64 = bases.iter().map(|&b| u64::from(b)).sum();

        let durations: Vec<u32> = match budget_minutes {
            None => bases,
            Some(budget) => bases
                .iter()
                .map(|&base| {
                    let scaled = if needed == 0 {
                        u64::from(base)
                    } else {
                        u64::from(base) * u64::from(budget) / needed
                    };
                    u32::try_from(scaled)
                        .unwrap_or(u32::MAX)
                        .max(self.schedule.min_stop_minutes)
                })
                .collect(),
        };

        let buffer = Duration::minutes(i64::from(self.schedule.travel_buffer_minutes));
        let mut cursor = now;
        let mut slots = Vec::with_capacity(stops.len());

        for (stop, minutes) in stops.iter().zip(durations) {
            let start = cursor;
            let end = start + Duration::minutes(i64::from(minutes));
            slots.push(Slot {
                stop_id: stop.stop_id(),
                duration_minutes: minutes,
                start,
                end,
            });
            cursor = end + buffer;
        }

        debug!(
            "Allocated {} stops, {} min of visits (budget {:?})",
            slots.len(),
            slots.iter().map(|s| s.duration_minutes).sum::<u32>(),
            budget_minutes
        );

        TimeAllocation {
            slots,
            budget_minutes,
        }
    }
}
