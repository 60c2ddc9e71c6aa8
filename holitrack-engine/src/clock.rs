//! Time sources and the `mock_time` / `mock_date` testing overrides.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use url::Url;

use crate::constants::{MOCK_DATE_ENV_VAR, MOCK_DATE_PARAM, MOCK_TIME_ENV_VAR, MOCK_TIME_PARAM};

/// Source of the tracked instant and of the animation clock.
pub trait Clock: Send + Sync {
    /// Instant the tracker should treat as "now".
    fn now(&self) -> DateTime<Utc>;

    /// Real wall-clock milliseconds driving the hop animation.
    fn wall_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock; clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    millis: Arc<AtomicI64>,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(now.timestamp_millis())),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.millis.store(now.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance_millis(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(millis).unwrap_or_default()
    }

    fn wall_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Raw override values as supplied by a query string or the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockOverride {
    pub mock_time: Option<String>,
    pub mock_date: Option<String>,
}

impl ClockOverride {
    /// Read `mock_time` and `mock_date` from a query string or full URL.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut overrides = Self::default();
        let pairs: Vec<(String, String)> = match Url::parse(query) {
            Ok(url) => url.query_pairs().into_owned().collect(),
            Err(_) => url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect(),
        };
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                MOCK_TIME_PARAM => overrides.mock_time = Some(value),
                MOCK_DATE_PARAM => overrides.mock_date = Some(value),
                _ => {}
            }
        }
        overrides
    }

    /// Read `HOLITRACK_MOCK_TIME` and `HOLITRACK_MOCK_DATE`.
    #[must_use]
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            mock_time: read(MOCK_TIME_ENV_VAR),
            mock_date: read(MOCK_DATE_ENV_VAR),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mock_time.is_none() && self.mock_date.is_none()
    }

    /// Query overrides win; the environment is consulted only when the query has none.
    #[must_use]
    pub fn resolve(query: Self, env: Self) -> Self {
        if query.is_empty() { env } else { query }
    }
}

/// Parse a mock instant. Accepts RFC 3339, naive ISO date-times (UTC) and bare dates.
#[must_use]
pub fn parse_mock_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    parse_mock_date(raw).map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

#[must_use]
pub fn parse_mock_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Clock applying [`ClockOverride`] values on top of a base clock.
///
/// `mock_time` wins over `mock_date`. An invalid `mock_time` falls back to
/// the base clock. Each notice is logged at most once per clock.
#[derive(Debug)]
pub struct OverrideClock<C: Clock = SystemClock> {
    base: C,
    overrides: ClockOverride,
    logged_mock_time: AtomicBool,
    logged_mock_date: AtomicBool,
    logged_error: AtomicBool,
}

impl OverrideClock<SystemClock> {
    #[must_use]
    pub fn system(overrides: ClockOverride) -> Self {
        Self::new(SystemClock, overrides)
    }
}

impl<C: Clock> OverrideClock<C> {
    #[must_use]
    pub const fn new(base: C, overrides: ClockOverride) -> Self {
        Self {
            base,
            overrides,
            logged_mock_time: AtomicBool::new(false),
            logged_mock_date: AtomicBool::new(false),
            logged_error: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn overrides(&self) -> &ClockOverride {
        &self.overrides
    }

    fn once(flag: &AtomicBool) -> bool {
        !flag.swap(true, Ordering::Relaxed)
    }
}

impl<C: Clock> Clock for OverrideClock<C> {
    fn now(&self) -> DateTime<Utc> {
        let real = self.base.now();
        if let Some(raw) = self.overrides.mock_time.as_deref() {
            if let Some(mock) = parse_mock_time(raw) {
                if Self::once(&self.logged_mock_time) {
                    log::info!("Using mock time: {}", mock.to_rfc3339());
                }
                return mock;
            }
            if Self::once(&self.logged_error) {
                log::error!("Invalid mock time format: {raw}, using real time instead");
            }
            return real;
        }
        if let Some(raw) = self.overrides.mock_date.as_deref() {
            if let Some(date) = parse_mock_date(raw) {
                let hybrid = date.and_time(real.time()).and_utc();
                if Self::once(&self.logged_mock_date) {
                    log::info!("Using mock date with real time: {}", hybrid.to_rfc3339());
                }
                return hybrid;
            }
            if Self::once(&self.logged_error) {
                log::error!("Invalid mock date format: {raw}, using real date instead");
            }
        }
        real
    }

    fn wall_millis(&self) -> i64 {
        self.base.wall_millis()
    }
}
