//! Holitrack Engine
//!
//! Platform-agnostic tracking logic for a holiday character (Easter Bunny,
//! Santa) travelling the world during its global holiday window.
//! This crate provides calendar, schedule, position and routing logic
//! without any rendering or platform-specific dependencies.

pub mod calendar;
pub mod city;
pub mod clock;
pub mod constants;
pub mod deliveries;
pub mod error;
pub mod geo;
pub mod holiday;
pub mod hop;
pub mod landmass;
pub mod numbers;
pub mod path_cache;
pub mod position;
pub mod router;
pub mod schedule;
pub mod tracker;
pub mod viewer;

use std::sync::Arc;

// Re-export commonly used types
pub use calendar::{
    DateAlgorithm, DateConfig, GlobalWindow, HolidayCalendar, HolidayDateRule, easter_date,
    is_within_window,
};
pub use city::{City, CityData, UtcOffset, nearest_city, timezone_label};
pub use clock::{Clock, ClockOverride, FixedClock, OverrideClock, SystemClock};
pub use constants::DEFAULT_MAP_ZOOM;
pub use deliveries::{format_count, items_delivered, total_items};
pub use error::{DataError, GeolocationError, TrackerError};
pub use geo::{GeoPoint, haversine_km};
pub use holiday::{HolidayConfig, HolidayFact, HolidayMode, format_holiday_date};
pub use hop::{delivery_range, hop_offset, hop_position};
pub use landmass::{LandmassProvider, PolygonLandmass, UnloadedLandmass};
pub use path_cache::JourneyPathCache;
pub use position::{CharacterPosition, PositionEngine, TickInput};
pub use router::{KnownCrossing, OverlandRouter, RouterConfig, interpolate_path};
pub use schedule::{Schedule, ScheduleEntry, Segment, arrival_time_label, ideal_arrival};
pub use tracker::{CalendarStatus, TrackerSession, TrackerSnapshot};
#[cfg(feature = "async")]
pub use tracker::{GeolocationProvider, TrackerHandle, TrackerRuntime};
pub use viewer::ViewerLocation;

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the city dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the city data cannot be loaded.
    fn load_cities(&self) -> Result<CityData, Self::Error>;

    /// Load the landmass polygons.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon data cannot be loaded or parsed.
    fn load_landmass(&self) -> Result<PolygonLandmass, Self::Error>;

    /// Load the configuration for a holiday.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_holiday_config(&self, mode: HolidayMode) -> Result<HolidayConfig, Self::Error>;

    /// Load router tuning; defaults when the platform has none.
    ///
    /// # Errors
    ///
    /// Returns an error if a provided configuration cannot be parsed.
    fn load_router_config(&self) -> Result<RouterConfig, Self::Error> {
        Ok(RouterConfig::default())
    }
}

/// Serves the datasets embedded in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataLoader;

impl DataLoader for StaticDataLoader {
    type Error = DataError;

    fn load_cities(&self) -> Result<CityData, Self::Error> {
        CityData::load_from_static()
    }

    fn load_landmass(&self) -> Result<PolygonLandmass, Self::Error> {
        PolygonLandmass::load_from_static()
    }

    fn load_holiday_config(&self, mode: HolidayMode) -> Result<HolidayConfig, Self::Error> {
        HolidayConfig::load_from_static(mode)
    }
}

/// Main engine for building tracker sessions
pub struct TrackerEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
}

impl<L> TrackerEngine<L>
where
    L: DataLoader,
{
    /// Create a new engine with the provided data loader
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    #[must_use]
    pub const fn data_loader(&self) -> &L {
        &self.data_loader
    }

    /// Build a session for one of the bundled holiday modes.
    ///
    /// # Errors
    ///
    /// Returns an error if the cities, holiday config or router config cannot
    /// be loaded. Missing landmass data only disables overland routing.
    pub fn create_session(
        &self,
        mode: HolidayMode,
        clock: Arc<dyn Clock>,
    ) -> Result<TrackerSession, L::Error> {
        let config = self.data_loader.load_holiday_config(mode)?;
        self.create_session_with_config(config, clock)
    }

    /// Build a session for an arbitrary holiday config.
    ///
    /// # Errors
    ///
    /// Returns an error if the cities or router config cannot be loaded.
    pub fn create_session_with_config(
        &self,
        config: HolidayConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<TrackerSession, L::Error> {
        let cities = self.data_loader.load_cities()?.into_shared();
        let router_config = self.data_loader.load_router_config()?;
        let router = OverlandRouter::new(self.landmass(), router_config);
        log::debug!(
            "Creating {} tracker session with {} cities",
            config.id,
            cities.len()
        );
        Ok(TrackerSession::new(config, cities, router, clock))
    }

    fn landmass(&self) -> Arc<dyn LandmassProvider> {
        match self.data_loader.load_landmass() {
            Ok(landmass) => Arc::new(landmass),
            Err(err) => {
                log::warn!("Landmass data unavailable, overland routing disabled: {err}");
                Arc::new(UnloadedLandmass)
            }
        }
    }
}
