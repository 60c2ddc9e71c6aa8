//! Holiday calendar: date rules, Easter computation and the global window.
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{END_OF_DAY_MILLIS, EASTERNMOST_OFFSET_HOURS, WESTERNMOST_OFFSET_HOURS};
use crate::numbers::{i64_to_f64, unit_ratio};

/// Gregorian Easter Sunday for `year` using Butcher's algorithm.
#[must_use]
pub fn easter_date(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b.div_euclid(4);
    let e = b.rem_euclid(4);
    let f = (b + 8).div_euclid(25);
    let g = (b - f + 1).div_euclid(3);
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c.div_euclid(4);
    let k = c.rem_euclid(4);
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l).div_euclid(451);
    let month = (h + l - 7 * m + 114).div_euclid(31);
    let day = (h + l - 7 * m + 114).rem_euclid(31) + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

/// Algorithms available for calculated holidays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateAlgorithm {
    #[default]
    Easter,
}

impl DateAlgorithm {
    #[must_use]
    pub fn date_for_year(self, year: i32) -> Option<NaiveDate> {
        match self {
            Self::Easter => easter_date(year),
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Easter => "easter",
        }
    }
}

/// How a holiday's calendar date is resolved for a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "DateConfig", into = "DateConfig")]
pub enum HolidayDateRule {
    Fixed { month: u32, day: u32 },
    Calculated(DateAlgorithm),
}

impl Default for HolidayDateRule {
    fn default() -> Self {
        Self::Calculated(DateAlgorithm::Easter)
    }
}

impl HolidayDateRule {
    /// Calendar date of the holiday in `year`.
    ///
    /// Returns `None` when a fixed rule names a day missing from that year
    /// (February 29 outside leap years).
    #[must_use]
    pub fn date_for_year(self, year: i32) -> Option<NaiveDate> {
        match self {
            Self::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
            Self::Calculated(algorithm) => algorithm.date_for_year(year),
        }
    }
}

/// Wire shape of a date rule as written in holiday JSON files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DateConfig {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_algorithm: Option<String>,
}

impl From<DateConfig> for HolidayDateRule {
    fn from(cfg: DateConfig) -> Self {
        match cfg.kind.as_str() {
            "fixed" => {
                let month = cfg.fixed_month.unwrap_or(12);
                let day = cfg.fixed_day.unwrap_or(25);
                // 2000 is a leap year, so only truly impossible dates fail here.
                if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
                    log::warn!("Invalid fixed holiday date {month}-{day}, falling back to Easter");
                    return Self::default();
                }
                Self::Fixed { month, day }
            }
            "calculated" => match cfg.calculation_algorithm.as_deref() {
                Some("easter") => Self::Calculated(DateAlgorithm::Easter),
                other => {
                    log::warn!("Unknown calculation algorithm: {other:?}, falling back to Easter");
                    Self::default()
                }
            },
            other => {
                log::warn!("Unknown date type: {other:?}, falling back to Easter");
                Self::default()
            }
        }
    }
}

impl From<HolidayDateRule> for DateConfig {
    fn from(rule: HolidayDateRule) -> Self {
        match rule {
            HolidayDateRule::Fixed { month, day } => Self {
                kind: "fixed".to_string(),
                fixed_month: Some(month),
                fixed_day: Some(day),
                calculation_algorithm: None,
            },
            HolidayDateRule::Calculated(algorithm) => Self {
                kind: "calculated".to_string(),
                fixed_month: None,
                fixed_day: None,
                calculation_algorithm: Some(algorithm.key().to_string()),
            },
        }
    }
}

/// UTC span during which the holiday is the local date somewhere on Earth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalWindow {
    /// UTC midnight of the holiday date.
    pub holiday: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl GlobalWindow {
    /// Window for the holiday whose UTC midnight is `holiday`.
    ///
    /// Starts when UTC+14 reaches midnight and ends when UTC-12 leaves the date.
    #[must_use]
    pub fn for_holiday(holiday: DateTime<Utc>) -> Self {
        let start = holiday - TimeDelta::hours(EASTERNMOST_OFFSET_HOURS);
        let end = holiday
            + TimeDelta::milliseconds(END_OF_DAY_MILLIS)
            + TimeDelta::hours(WESTERNMOST_OFFSET_HOURS);
        Self {
            holiday,
            start,
            end,
        }
    }

    /// Inclusive at both ends.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }

    #[must_use]
    pub fn width(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Elapsed fraction of the window in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self, now: DateTime<Utc>) -> f64 {
        unit_ratio(
            (now - self.start).num_milliseconds(),
            self.width().num_milliseconds(),
        )
    }

    /// Completion percentage in `[0, 100]`.
    #[must_use]
    pub fn percentage(&self, now: DateTime<Utc>) -> f64 {
        self.fraction(now) * 100.0
    }

    /// Milliseconds from window start, used for inbound progress.
    #[must_use]
    pub fn elapsed_millis(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start).num_milliseconds()
    }
}

/// Is `now` inside the window of the holiday at `holiday`?
#[must_use]
pub fn is_within_window(now: DateTime<Utc>, holiday: DateTime<Utc>) -> bool {
    GlobalWindow::for_holiday(holiday).contains(now)
}

/// Resolves holiday dates and windows from a [`HolidayDateRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HolidayCalendar {
    rule: HolidayDateRule,
}

impl HolidayCalendar {
    #[must_use]
    pub const fn new(rule: HolidayDateRule) -> Self {
        Self { rule }
    }

    #[must_use]
    pub const fn rule(&self) -> HolidayDateRule {
        self.rule
    }

    /// UTC midnight of the holiday in `year`.
    #[must_use]
    pub fn holiday_date(&self, year: i32) -> Option<DateTime<Utc>> {
        self.rule
            .date_for_year(year)
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
    }

    #[must_use]
    pub fn window(&self, year: i32) -> Option<GlobalWindow> {
        self.holiday_date(year).map(GlobalWindow::for_holiday)
    }

    /// Window containing `now`, checking the UTC year of `now` and both neighbours.
    #[must_use]
    pub fn active_window(&self, now: DateTime<Utc>) -> Option<GlobalWindow> {
        let year = now.year();
        [year, year - 1, year + 1]
            .into_iter()
            .filter_map(|y| self.window(y))
            .find(|window| window.contains(now))
    }

    #[must_use]
    pub fn active_holiday(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.active_window(now).map(|window| window.holiday)
    }

    #[must_use]
    pub fn is_holiday_now(&self, now: DateTime<Utc>) -> bool {
        self.active_window(now).is_some()
    }

    /// The active holiday, else the first one whose window has not started.
    #[must_use]
    pub fn next_holiday(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if let Some(active) = self.active_holiday(now) {
            return Some(active);
        }
        let year = now.year();
        (year..=year + 1)
            .filter_map(|y| self.window(y))
            .find(|window| now < window.start)
            .map(|window| window.holiday)
    }

    /// Percentage through the active window, 0 outside any window.
    #[must_use]
    pub fn global_progress(&self, now: DateTime<Utc>) -> f64 {
        self.active_window(now)
            .map_or(0.0, |window| window.percentage(now))
    }
}

/// Hours in a full window, for display.
#[must_use]
pub fn window_hours(window: &GlobalWindow) -> f64 {
    i64_to_f64(window.width().num_milliseconds()) / 3_600_000.0
}
