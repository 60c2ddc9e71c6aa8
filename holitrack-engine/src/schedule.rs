//! City schedule: every city's local-midnight arrival, sorted by instant.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::city::{City, UtcOffset};
use crate::numbers::unit_ratio;

/// One city and the UTC instant the character should arrive there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub city: City,
    pub arrival: DateTime<Utc>,
}

/// Where `now` falls relative to the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Before the first arrival; travelling in to entry 0.
    Inbound,
    /// Between entry `index` and entry `index + 1`.
    Between { index: usize },
    /// At or after the last arrival.
    Finished,
}

/// UTC instant of local midnight on the holiday for `city`.
#[must_use]
pub fn ideal_arrival(city: &City, holiday: DateTime<Utc>) -> DateTime<Utc> {
    city.utc_offset().local_midnight_utc(holiday.date_naive())
}

/// Arrival instants for all cities of one holiday, ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    holiday: DateTime<Utc>,
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Build the schedule for `holiday`; ties keep dataset order.
    #[must_use]
    pub fn build(cities: &[City], holiday: DateTime<Utc>) -> Self {
        let mut entries: Vec<ScheduleEntry> = cities
            .iter()
            .map(|city| ScheduleEntry {
                arrival: ideal_arrival(city, holiday),
                city: city.clone(),
            })
            .collect();
        entries.sort_by_key(|entry| entry.arrival);
        log::debug!(
            "Built schedule for {} with {} cities",
            holiday.date_naive(),
            entries.len()
        );
        Self { holiday, entries }
    }

    #[must_use]
    pub const fn holiday(&self) -> DateTime<Utc> {
        self.holiday
    }

    #[must_use]
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&ScheduleEntry> {
        self.entries.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ScheduleEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ScheduleEntry> {
        self.entries.get(index)
    }

    /// Segment containing `now`. An empty schedule is always finished.
    #[must_use]
    pub fn segment_at(&self, now: DateTime<Utc>) -> Segment {
        match (self.first(), self.last()) {
            (Some(first), _) if now < first.arrival => Segment::Inbound,
            (Some(_), Some(last)) if now < last.arrival => {
                // First entry whose arrival is after now; the one before it is current.
                let next = self.entries.partition_point(|e| e.arrival <= now);
                Segment::Between { index: next - 1 }
            }
            _ => Segment::Finished,
        }
    }

    /// Progress through the segment between `index` and `index + 1`.
    #[must_use]
    pub fn segment_progress(&self, index: usize, now: DateTime<Utc>) -> f64 {
        match (self.get(index), self.get(index + 1)) {
            (Some(current), Some(next)) => unit_ratio(
                (now - current.arrival).num_milliseconds(),
                (next.arrival - current.arrival).num_milliseconds(),
            ),
            _ => 1.0,
        }
    }

    /// Count of entries whose arrival is strictly before `now`.
    #[must_use]
    pub fn visited_count(&self, now: DateTime<Utc>) -> usize {
        self.entries.partition_point(|e| e.arrival < now)
    }

    #[must_use]
    pub fn position_of(&self, city_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.city.id == city_id)
    }
}

/// `HH:MM` of `city`'s ideal arrival, shown in `display` offset.
#[must_use]
pub fn arrival_time_label(city: &City, holiday: DateTime<Utc>, display: UtcOffset) -> String {
    ideal_arrival(city, holiday)
        .with_timezone(&display.as_fixed_offset())
        .format("%H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::test_city;
    use chrono::{TimeDelta, TimeZone};

    fn holiday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 20, 0, 0, 0).unwrap()
    }

    fn cities() -> Vec<City> {
        vec![
            test_city("west", 40.0, -74.0, 300),
            test_city("east", -33.0, 151.0, -600),
            test_city("utc", 51.0, 0.0, 0),
            test_city("utc-twin", 53.0, -6.0, 0),
        ]
    }

    #[test]
    fn east_arrives_before_west() {
        let schedule = Schedule::build(&cities(), holiday());
        let ids: Vec<&str> = schedule.entries().iter().map(|e| e.city.id.as_str()).collect();
        assert_eq!(ids, ["east", "utc", "utc-twin", "west"]);
        assert_eq!(
            schedule.entries()[0].arrival,
            holiday() - TimeDelta::hours(10)
        );
        assert_eq!(
            schedule.entries()[3].arrival,
            holiday() + TimeDelta::hours(5)
        );
    }

    #[test]
    fn segments_cover_the_timeline() {
        let schedule = Schedule::build(&cities(), holiday());
        let first = schedule.entries()[0].arrival;
        assert_eq!(schedule.segment_at(first - TimeDelta::seconds(1)), Segment::Inbound);
        assert_eq!(schedule.segment_at(first), Segment::Between { index: 0 });
        // Tied arrivals skip the zero-length segment.
        assert_eq!(schedule.segment_at(holiday()), Segment::Between { index: 2 });
        let last = schedule.entries()[3].arrival;
        assert_eq!(
            schedule.segment_at(last - TimeDelta::milliseconds(1)),
            Segment::Between { index: 2 }
        );
        assert_eq!(schedule.segment_at(last), Segment::Finished);
    }

    #[test]
    fn visited_counts_strictly_earlier_entries() {
        let schedule = Schedule::build(&cities(), holiday());
        let first = schedule.entries()[0].arrival;
        assert_eq!(schedule.visited_count(first), 0);
        assert_eq!(schedule.visited_count(first + TimeDelta::milliseconds(1)), 1);
        assert_eq!(schedule.visited_count(holiday() + TimeDelta::days(2)), 4);
    }

    #[test]
    fn segment_progress_resets_at_arrival() {
        let schedule = Schedule::build(&cities(), holiday());
        let start = schedule.entries()[0].arrival;
        assert!(schedule.segment_progress(0, start).abs() < f64::EPSILON);
        let midway = start + TimeDelta::hours(5);
        assert!((schedule.segment_progress(0, midway) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn arrival_label_uses_viewer_offset() {
        let city = test_city("tokyo", 35.7, 139.7, -540);
        assert_eq!(arrival_time_label(&city, holiday(), UtcOffset::UTC), "15:00");
        assert_eq!(
            arrival_time_label(&city, holiday(), UtcOffset::from_east_minutes(540)),
            "00:00"
        );
    }
}
