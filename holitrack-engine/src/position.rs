//! Position engine: where the character is at a given instant.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::calendar::GlobalWindow;
use crate::city::{City, nearest_city};
use crate::error::TrackerError;
use crate::geo::{GeoPoint, normalize_longitude};
use crate::hop::hop_position;
use crate::numbers::unit_ratio;
use crate::router::OverlandRouter;
use crate::schedule::{Schedule, Segment};

/// Per-tick snapshot of the character.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub current_city: City,
    /// Equal to `current_city` while delivering.
    pub next_city: City,
    pub nearest_city: City,
    pub total_cities: usize,
    pub visited_cities: usize,
    pub completion_percentage: f64,
    pub transition_progress: f64,
    pub map_zoom_level: u8,
    pub over_land: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmass_name: Option<String>,
}

impl CharacterPosition {
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Delivering at a city rather than flying between two.
    #[must_use]
    pub fn is_delivering(&self) -> bool {
        self.current_city.id == self.next_city.id
    }
}

/// Inputs that vary per tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    pub now: DateTime<Utc>,
    pub wall_millis: i64,
    pub window: &'a GlobalWindow,
    pub schedule: &'a Schedule,
    pub zoom: u8,
}

/// Computes [`CharacterPosition`]s from a schedule and the router.
#[derive(Debug, Clone)]
pub struct PositionEngine {
    router: OverlandRouter,
}

impl PositionEngine {
    #[must_use]
    pub const fn new(router: OverlandRouter) -> Self {
        Self { router }
    }

    #[must_use]
    pub const fn router(&self) -> &OverlandRouter {
        &self.router
    }

    /// Resolve the character's position for one tick.
    ///
    /// # Errors
    ///
    /// Returns an error when the city list or schedule is empty, or when a
    /// non-finite coordinate is produced.
    pub fn compute(
        &self,
        input: TickInput<'_>,
        cities: &[City],
    ) -> Result<CharacterPosition, TrackerError> {
        if cities.is_empty() {
            return Err(TrackerError::NoCities);
        }
        let schedule = input.schedule;
        let (Some(first), Some(last)) = (schedule.first(), schedule.last()) else {
            return Err(TrackerError::EmptySchedule {
                holiday: schedule.holiday().date_naive().to_string(),
            });
        };

        let (current, next, transition_progress) = match schedule.segment_at(input.now) {
            Segment::Inbound => {
                let progress = unit_ratio(
                    input.window.elapsed_millis(input.now),
                    (first.arrival - input.window.start).num_milliseconds(),
                );
                (first, first, progress)
            }
            Segment::Finished => (last, last, 1.0),
            Segment::Between { index } => {
                let progress = schedule.segment_progress(index, input.now);
                match (schedule.get(index), schedule.get(index + 1)) {
                    (Some(current), Some(next)) => (current, next, progress),
                    _ => (last, last, 1.0),
                }
            }
        };

        let delivering = current.city.id == next.city.id;
        let raw = if delivering {
            hop_position(current.city.point(), input.wall_millis, input.zoom)
        } else {
            self.router
                .overland_position(current.city.point(), next.city.point(), transition_progress)
        };
        let mut point = GeoPoint::new(raw.latitude, normalize_longitude(raw.longitude))
            .ensure_finite()?;

        let mut over_land = self.router.is_land(point);
        log::debug!(
            "Character position: {:.4}, {:.4} (over land: {over_land})",
            point.latitude,
            point.longitude
        );
        if !over_land && !delivering {
            if let Some(land) = self.router.correct_to_land(point) {
                log::debug!(
                    "Adjusted to nearby land: {:.4}, {:.4}",
                    land.latitude,
                    land.longitude
                );
                point = land;
                over_land = true;
            }
        }

        let nearest = nearest_city(point, cities)?;
        let landmass_name = self
            .router
            .landmass()
            .landmass_name(point.latitude, point.longitude);

        Ok(CharacterPosition {
            latitude: point.latitude,
            longitude: point.longitude,
            current_city: current.city.clone(),
            next_city: next.city.clone(),
            nearest_city: nearest.clone(),
            total_cities: schedule.len(),
            visited_cities: schedule.visited_count(input.now),
            completion_percentage: input.window.percentage(input.now),
            transition_progress,
            map_zoom_level: input.zoom,
            over_land,
            landmass_name,
        })
    }
}
