//! Cached schedule per holiday date and the journey polyline built from it.
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::city::City;
use crate::geo::GeoPoint;
use crate::position::CharacterPosition;
use crate::schedule::Schedule;

/// Owns the most recently built schedule and the holiday it belongs to.
#[derive(Debug, Clone, Default)]
pub struct JourneyPathCache {
    cached: Option<Arc<Schedule>>,
    rebuilds: u64,
}

impl JourneyPathCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cached: None,
            rebuilds: 0,
        }
    }

    /// Schedule for `holiday`, rebuilt only when the holiday changes.
    pub fn schedule_for(&mut self, holiday: DateTime<Utc>, cities: &[City]) -> Arc<Schedule> {
        if let Some(schedule) = self.cached.as_ref().filter(|s| s.holiday() == holiday) {
            return Arc::clone(schedule);
        }
        let schedule = Arc::new(Schedule::build(cities, holiday));
        self.cached = Some(Arc::clone(&schedule));
        self.rebuilds += 1;
        schedule
    }

    /// Visited city coordinates followed by the current position.
    ///
    /// Empty when fewer than two points would result.
    pub fn journey_path(
        &mut self,
        position: &CharacterPosition,
        holiday: DateTime<Utc>,
        cities: &[City],
    ) -> Vec<GeoPoint> {
        let schedule = self.schedule_for(holiday, cities);
        let mut path: Vec<GeoPoint> = schedule
            .entries()
            .iter()
            .take(position.visited_cities)
            .map(|entry| entry.city.point())
            .collect();
        path.push(position.point());
        if path.len() < 2 {
            return Vec::new();
        }
        path
    }

    /// Holiday of the cached schedule, if any.
    #[must_use]
    pub fn cached_holiday(&self) -> Option<DateTime<Utc>> {
        self.cached.as_ref().map(|s| s.holiday())
    }

    /// Number of schedule builds since construction or the last reset.
    #[must_use]
    pub const fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn reset(&mut self) {
        self.cached = None;
        self.rebuilds = 0;
    }
}
