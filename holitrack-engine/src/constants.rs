//! Centralized tuning constants for Holitrack tracking logic.
//!
//! These values define the deterministic math for the calendar, the hop
//! animation and the overland router. Keeping them together ensures the
//! character's behaviour can only be adjusted via reviewed code changes,
//! rather than drifting between call sites.

// Global holiday window ------------------------------------------------------
/// UTC+14 (Kiritimati): the holiday starts 14 hours before UTC midnight.
pub(crate) const EASTERNMOST_OFFSET_HOURS: i64 = 14;
/// UTC-12 (Baker Island): the holiday ends 12 hours after UTC end of day.
pub(crate) const WESTERNMOST_OFFSET_HOURS: i64 = 12;
/// Last representable millisecond of a UTC day.
pub(crate) const END_OF_DAY_MILLIS: i64 = 24 * 60 * 60 * 1000 - 1;

// Position engine ------------------------------------------------------------
/// Map zoom assumed when the renderer has not reported one.
pub const DEFAULT_MAP_ZOOM: u8 = 4;
pub(crate) const EARTH_RADIUS_KM: f64 = 6371.0;
/// Length of a single delivery hop in wall-clock milliseconds.
pub(crate) const HOP_PERIOD_MILLIS: i64 = 1000;
/// Fraction of a hop spent resting at either end.
pub(crate) const HOP_REST_FRACTION: f64 = 0.1;
/// Height of the sine arc added to the middle of a hop.
pub(crate) const HOP_ARC_HEIGHT: f64 = 0.1;
pub(crate) const HOP_LAT_SCALE: f64 = 123.456;
pub(crate) const HOP_LON_SCALE: f64 = 789.012;
/// `(max zoom, delivery range in degrees)` tiers, checked in order.
pub(crate) const DELIVERY_RANGE_TIERS: [(u8, f64); 5] =
    [(2, 8.0), (4, 4.0), (6, 2.0), (8, 1.0), (10, 0.5)];
pub(crate) const DELIVERY_RANGE_STREET: f64 = 0.2;

// Overland router ------------------------------------------------------------
pub(crate) const ROUTER_SAMPLE_COUNT: usize = 8;
pub(crate) const ROUTER_WATER_THRESHOLD: f64 = 0.3;
pub(crate) const ROUTER_SHORT_HOP_KM: f64 = 500.0;
pub(crate) const ROUTER_WAYPOINT_MIN_KM: f64 = 1000.0;
pub(crate) const ROUTER_CROSSING_MATCH_KM: f64 = 1500.0;
pub(crate) const ROUTER_SEARCH_STEP_DEG: f64 = 0.5;
pub(crate) const ROUTER_MIDPOINT_SEARCH_DEG: f64 = 10.0;
pub(crate) const ROUTER_CORRECTION_SEARCH_DEG: f64 = 2.0;
pub(crate) const ROUTER_SEARCH_DIRECTIONS: u16 = 8;

// Deliveries -----------------------------------------------------------------
pub(crate) const WORLD_POPULATION: u64 = 8_100_000_000;

// Tracker runtime ------------------------------------------------------------
pub(crate) const POSITION_TICK_MILLIS: u64 = 1000;
pub(crate) const CALENDAR_TICK_MILLIS: u64 = 60_000;
pub(crate) const GEOLOCATION_RETRY_MILLIS: u64 = 3000;

// Clock overrides ------------------------------------------------------------
pub(crate) const MOCK_TIME_PARAM: &str = "mock_time";
pub(crate) const MOCK_DATE_PARAM: &str = "mock_date";
pub(crate) const MOCK_TIME_ENV_VAR: &str = "HOLITRACK_MOCK_TIME";
pub(crate) const MOCK_DATE_ENV_VAR: &str = "HOLITRACK_MOCK_DATE";
