//! City dataset and the timezone sign convention it carries.
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, TrackerError};
use crate::geo::{GeoPoint, haversine_km};

const DEFAULT_CITY_DATA: &str = include_str!("../assets/data/cities.json");

static OFFSET_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"([+-])(\d{2}):?(\d{2})?").ok());

/// Signed distance of a timezone from UTC.
///
/// Stored east-positive (`UTC+09:00` is `+540`). The city dataset uses the
/// inverted convention where east is negative; convert with
/// [`UtcOffset::from_inverted_minutes`] rather than negating at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UtcOffset {
    east_minutes: i32,
}

impl UtcOffset {
    pub const UTC: Self = Self { east_minutes: 0 };

    #[must_use]
    pub const fn from_east_minutes(east_minutes: i32) -> Self {
        Self { east_minutes }
    }

    /// Build from the dataset's `timezoneOffsetMinutes` (negative = east).
    #[must_use]
    pub const fn from_inverted_minutes(inverted: i32) -> Self {
        Self {
            east_minutes: -inverted,
        }
    }

    /// Parse the signed offset embedded in strings such as `UTC+05:30`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let pattern = OFFSET_PATTERN.as_ref()?;
        let caps = pattern.captures(raw)?;
        let sign = if &caps[1] == "-" { -1 } else { 1 };
        let hours: i32 = caps[2].parse().ok()?;
        let minutes: i32 = caps
            .get(3)
            .map_or(Ok(0), |m| m.as_str().parse())
            .ok()?;
        Some(Self::from_east_minutes(sign * (hours * 60 + minutes)))
    }

    /// Parse an offset, falling back to UTC with a warning.
    #[must_use]
    pub fn parse_or_utc(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            log::warn!("Could not parse timezone `{raw}`, defaulting to UTC");
            Self::UTC
        })
    }

    #[must_use]
    pub const fn east_minutes(self) -> i32 {
        self.east_minutes
    }

    #[must_use]
    pub const fn inverted_minutes(self) -> i32 {
        -self.east_minutes
    }

    /// UTC instant at which local midnight of `date` occurs in this offset.
    ///
    /// Eastern offsets reach midnight before UTC does.
    #[must_use]
    pub fn local_midnight_utc(self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(NaiveTime::MIN).and_utc() - TimeDelta::minutes(i64::from(self.east_minutes))
    }

    /// Chrono offset for display; out-of-range values render as UTC.
    #[must_use]
    pub fn as_fixed_offset(self) -> FixedOffset {
        FixedOffset::east_opt(self.east_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// `UTC+HH` or `UTC+HH:MM` when the offset has a minute component.
    #[must_use]
    pub fn label(self) -> String {
        let sign = if self.east_minutes >= 0 { '+' } else { '-' };
        let abs = self.east_minutes.unsigned_abs();
        let (hours, minutes) = (abs / 60, abs % 60);
        if minutes > 0 {
            format!("UTC{sign}{hours:02}:{minutes:02}")
        } else {
            format!("UTC{sign}{hours:02}")
        }
    }
}

/// Label for a dataset offset in the inverted convention.
#[must_use]
pub fn timezone_label(inverted_minutes: i32) -> String {
    UtcOffset::from_inverted_minutes(inverted_minutes).label()
}

/// A stop on the character's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub population: u64,
    pub timezone: String,
    /// Minutes from UTC, negative for east.
    pub timezone_offset_minutes: i32,
}

impl City {
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Offset parsed from the `timezone` string.
    #[must_use]
    pub fn utc_offset(&self) -> UtcOffset {
        UtcOffset::parse_or_utc(&self.timezone)
    }

    /// Offset from the precomputed dataset minutes.
    #[must_use]
    pub const fn dataset_offset(&self) -> UtcOffset {
        UtcOffset::from_inverted_minutes(self.timezone_offset_minutes)
    }
}

/// Container for the bundled city list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CityData {
    pub cities: Vec<City>,
}

impl CityData {
    /// Load city data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or lists no cities.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let data: Self = serde_json::from_str(json).map_err(|e| DataError::parse("cities", e))?;
        if data.cities.is_empty() {
            return Err(DataError::Empty { dataset: "cities" });
        }
        Ok(data)
    }

    /// Bundled dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset is malformed.
    pub fn load_from_static() -> Result<Self, DataError> {
        Self::from_json(DEFAULT_CITY_DATA)
    }

    #[must_use]
    pub fn into_shared(self) -> Arc<[City]> {
        Arc::from(self.cities)
    }
}

/// Nearest city to `point` by exhaustive haversine scan.
///
/// # Errors
///
/// Returns [`TrackerError::NoCities`] when `cities` is empty.
pub fn nearest_city(point: GeoPoint, cities: &[City]) -> Result<&City, TrackerError> {
    cities
        .iter()
        .map(|city| (city, haversine_km(point, city.point())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(city, _)| city)
        .ok_or(TrackerError::NoCities)
}

#[cfg(test)]
pub(crate) fn test_city(id: &str, lat: f64, lon: f64, inverted_minutes: i32) -> City {
    let offset = UtcOffset::from_inverted_minutes(inverted_minutes);
    let hours = offset.east_minutes().unsigned_abs() / 60;
    let minutes = offset.east_minutes().unsigned_abs() % 60;
    let sign = if offset.east_minutes() >= 0 { '+' } else { '-' };
    City {
        id: id.to_string(),
        name: id.to_string(),
        country: format!("{id}-land"),
        latitude: lat,
        longitude: lon,
        population: 1000,
        timezone: format!("UTC{sign}{hours:02}:{minutes:02}"),
        timezone_offset_minutes: inverted_minutes,
    }
}
