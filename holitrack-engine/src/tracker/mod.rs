//! Tracker session: the per-process object that owns all tracking state.
//!
//! A session is driven by two ticks. [`TrackerSession::refresh_calendar`]
//! is the slow tick (about once a minute) that re-resolves the holiday and
//! arrival labels; [`TrackerSession::tick`] is the fast tick (about once a
//! second) that produces a [`TrackerSnapshot`].

#[cfg(feature = "async")]
mod runtime;

#[cfg(feature = "async")]
pub use runtime::{GeolocationProvider, TrackerHandle, TrackerRuntime};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::calendar::{GlobalWindow, HolidayCalendar};
use crate::city::{City, UtcOffset};
use crate::clock::Clock;
use crate::constants::DEFAULT_MAP_ZOOM;
use crate::deliveries::items_delivered;
use crate::geo::GeoPoint;
use crate::holiday::{HolidayConfig, format_holiday_date};
use crate::path_cache::JourneyPathCache;
use crate::position::{CharacterPosition, PositionEngine, TickInput};
use crate::router::OverlandRouter;
use crate::schedule::{Schedule, arrival_time_label};
use crate::viewer::ViewerLocation;

/// Result of the slow calendar tick.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarStatus {
    pub is_holiday: bool,
    pub next_holiday: Option<DateTime<Utc>>,
    pub next_holiday_label: Option<String>,
    /// `HH:MM` arrival at the viewer's nearest city.
    pub estimated_arrival: Option<String>,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    pub now: DateTime<Utc>,
    pub position: Option<CharacterPosition>,
    pub completion_percentage: f64,
    pub items_delivered: u64,
    pub is_nearby: bool,
    pub journey_path: Vec<GeoPoint>,
    pub is_holiday: bool,
    pub next_holiday: Option<DateTime<Utc>>,
    pub estimated_arrival: Option<String>,
    pub status_message: Option<String>,
}

impl TrackerSnapshot {
    fn idle(now: DateTime<Utc>, status: &CalendarStatus, is_holiday: bool) -> Self {
        Self {
            now,
            position: None,
            completion_percentage: 0.0,
            items_delivered: 0,
            is_nearby: false,
            journey_path: Vec::new(),
            is_holiday,
            next_holiday: status.next_holiday,
            estimated_arrival: status.estimated_arrival.clone(),
            status_message: None,
        }
    }
}

/// Owns config, cities, engine, cache, clock and viewer state for one process.
pub struct TrackerSession {
    config: HolidayConfig,
    calendar: HolidayCalendar,
    cities: Arc<[City]>,
    engine: PositionEngine,
    cache: JourneyPathCache,
    clock: Arc<dyn Clock>,
    zoom: u8,
    display_offset: UtcOffset,
    viewer: Option<ViewerLocation>,
    status: CalendarStatus,
}

impl std::fmt::Debug for TrackerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerSession")
            .field("holiday", &self.config.id)
            .field("cities", &self.cities.len())
            .field("zoom", &self.zoom)
            .field("viewer", &self.viewer)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl TrackerSession {
    /// Build a session and run the first calendar refresh.
    #[must_use]
    pub fn new(
        config: HolidayConfig,
        cities: Arc<[City]>,
        router: OverlandRouter,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let calendar = config.calendar();
        let mut session = Self {
            config,
            calendar,
            cities,
            engine: PositionEngine::new(router),
            cache: JourneyPathCache::new(),
            clock,
            zoom: DEFAULT_MAP_ZOOM,
            display_offset: UtcOffset::UTC,
            viewer: None,
            status: CalendarStatus::default(),
        };
        session.refresh_calendar();
        session
    }

    /// Slow tick: holiday status, next holiday and the viewer's arrival label.
    pub fn refresh_calendar(&mut self) -> &CalendarStatus {
        let now = self.clock.now();
        let is_holiday = self.calendar.is_holiday_now(now);
        let next_holiday = self.calendar.next_holiday(now);
        let estimated_arrival = match (&self.viewer, next_holiday) {
            (Some(viewer), Some(holiday)) if is_holiday => viewer
                .nearest_city
                .as_ref()
                .map(|city| arrival_time_label(city, holiday, self.display_offset)),
            _ => None,
        };
        self.status = CalendarStatus {
            is_holiday,
            next_holiday,
            next_holiday_label: next_holiday.map(format_holiday_date),
            estimated_arrival,
        };
        &self.status
    }

    /// Fast tick. Failures are logged and reported as "no position".
    pub fn tick(&mut self) -> TrackerSnapshot {
        let now = self.clock.now();
        let Some(window) = self.calendar.active_window(now) else {
            return TrackerSnapshot::idle(now, &self.status, false);
        };
        let schedule = self.cache.schedule_for(window.holiday, &self.cities);
        let position = match self.compute_position(now, &window, &schedule) {
            Ok(position) => position,
            Err(err) => {
                log::error!("Error calculating character position: {err}");
                return TrackerSnapshot::idle(now, &self.status, true);
            }
        };
        let journey_path = self
            .cache
            .journey_path(&position, window.holiday, &self.cities);
        let is_nearby = self
            .viewer
            .as_ref()
            .is_some_and(|viewer| viewer.is_nearby(&position));
        TrackerSnapshot {
            now,
            completion_percentage: position.completion_percentage,
            items_delivered: items_delivered(
                position.completion_percentage,
                self.config.people_per_item(),
            ),
            is_nearby,
            journey_path,
            is_holiday: true,
            next_holiday: self.status.next_holiday,
            estimated_arrival: self.status.estimated_arrival.clone(),
            status_message: Some(self.status_message(&position)),
            position: Some(position),
        }
    }

    fn compute_position(
        &self,
        now: DateTime<Utc>,
        window: &GlobalWindow,
        schedule: &Schedule,
    ) -> Result<CharacterPosition, crate::TrackerError> {
        self.engine.compute(
            TickInput {
                now,
                wall_millis: self.clock.wall_millis(),
                window,
                schedule,
                zoom: self.zoom,
            },
            &self.cities,
        )
    }

    fn status_message(&self, position: &CharacterPosition) -> String {
        if position.is_delivering() {
            self.config
                .delivering_message(&position.current_city.name, &position.current_city.country)
        } else {
            self.config
                .traveling_message(&position.current_city.name, &position.next_city.name)
        }
    }

    /// Schedule for the active holiday, or the next one when idle.
    pub fn upcoming_schedule(&mut self) -> Option<Arc<Schedule>> {
        let now = self.clock.now();
        let holiday = self.calendar.next_holiday(now)?;
        Some(self.cache.schedule_for(holiday, &self.cities))
    }

    /// Record the viewer's coordinates and resolve their nearest city.
    pub fn set_viewer_location(&mut self, latitude: f64, longitude: f64) -> &ViewerLocation {
        let viewer = ViewerLocation::resolve(latitude, longitude, &self.cities);
        log::debug!(
            "Viewer located at {latitude:.4}, {longitude:.4} near {:?}",
            viewer.nearest_city.as_ref().map(|c| c.name.as_str())
        );
        self.viewer.insert(viewer)
    }

    #[must_use]
    pub const fn viewer(&self) -> Option<&ViewerLocation> {
        self.viewer.as_ref()
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
    }

    #[must_use]
    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Offset used to render arrival labels.
    pub fn set_display_offset(&mut self, offset: UtcOffset) {
        self.display_offset = offset;
    }

    #[must_use]
    pub const fn status(&self) -> &CalendarStatus {
        &self.status
    }

    #[must_use]
    pub const fn config(&self) -> &HolidayConfig {
        &self.config
    }

    #[must_use]
    pub const fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    #[must_use]
    pub const fn cache(&self) -> &JourneyPathCache {
        &self.cache
    }

    /// Drop the cached schedule.
    pub fn reset_cache(&mut self) {
        self.cache.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::CityData;
    use crate::clock::FixedClock;
    use crate::holiday::HolidayMode;
    use crate::landmass::PolygonLandmass;
    use crate::router::RouterConfig;
    use chrono::{TimeDelta, TimeZone};

    fn session_at(now: DateTime<Utc>) -> (TrackerSession, FixedClock) {
        let clock = FixedClock::new(now);
        let config = HolidayConfig::load_from_static(HolidayMode::Easter).unwrap();
        let cities = CityData::load_from_static().unwrap().into_shared();
        let router = OverlandRouter::new(
            Arc::new(PolygonLandmass::load_from_static().unwrap()),
            RouterConfig::default(),
        );
        let session = TrackerSession::new(config, cities, router, Arc::new(clock.clone()));
        (session, clock)
    }

    fn easter_2025() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 20, 0, 0, 0).unwrap()
    }

    #[test]
    fn idle_outside_the_window() {
        let (mut session, _) = session_at(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        let snap = session.tick();
        assert!(!snap.is_holiday);
        assert!(snap.position.is_none());
        assert!(snap.journey_path.is_empty());
        assert_eq!(session.status().next_holiday, Some(easter_2025()));
        assert_eq!(
            session.status().next_holiday_label.as_deref(),
            Some("Sunday, April 20, 2025")
        );
        assert_eq!(session.cache().rebuilds(), 0);
    }

    #[test]
    fn tracks_during_the_window() {
        let (mut session, clock) = session_at(easter_2025() + TimeDelta::hours(3));
        let snap = session.tick();
        let position = snap.position.expect("position during the window");
        assert!(snap.is_holiday);
        assert!(snap.items_delivered > 0);
        assert_eq!(snap.journey_path.len(), position.visited_cities + 1);
        assert!(snap.status_message.is_some());

        clock.advance_millis(60_000);
        let later = session.tick();
        assert!(later.completion_percentage > snap.completion_percentage);
        assert_eq!(session.cache().rebuilds(), 1);
    }

    #[test]
    fn viewer_gets_arrival_label_and_nearby_flag() {
        let (mut session, clock) = session_at(easter_2025() - TimeDelta::hours(2));
        let viewer = session.set_viewer_location(-36.9, 174.8).clone();
        assert_eq!(viewer.nearest_city.map(|c| c.id), Some("auckland".to_string()));
        session.refresh_calendar();
        assert_eq!(session.status().estimated_arrival.as_deref(), Some("12:00"));

        session.set_display_offset(UtcOffset::from_east_minutes(720));
        session.refresh_calendar();
        assert_eq!(session.status().estimated_arrival.as_deref(), Some("00:00"));

        // Auckland arrives at 12:00 UTC the day before; a minute later the
        // character has only just left for Sydney.
        clock.set(easter_2025() - TimeDelta::hours(12) + TimeDelta::minutes(1));
        let snap = session.tick();
        let position = snap.position.expect("position");
        assert_eq!(position.current_city.id, "auckland");
        assert_eq!(position.next_city.id, "sydney");
        assert_eq!(position.nearest_city.id, "auckland");
        assert!(snap.is_nearby);
    }

    #[test]
    fn reset_cache_forces_rebuild() {
        let (mut session, _) = session_at(easter_2025());
        session.tick();
        session.reset_cache();
        assert_eq!(session.cache().rebuilds(), 0);
        session.tick();
        assert_eq!(session.cache().rebuilds(), 1);
    }
}
