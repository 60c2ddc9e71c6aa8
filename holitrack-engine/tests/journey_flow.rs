use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use holitrack_engine::{
    City, Clock, ClockOverride, DEFAULT_MAP_ZOOM, FixedClock, GeoPoint, GlobalWindow, HolidayMode,
    OverlandRouter, OverrideClock, PolygonLandmass, PositionEngine, RouterConfig, Schedule,
    Segment, StaticDataLoader, TickInput, TrackerEngine, TrackerSession, delivery_range,
    haversine_km, total_items,
};

fn easter_2025() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 20, 0, 0, 0).unwrap()
}

fn easter_session(clock: &FixedClock) -> TrackerSession {
    TrackerEngine::new(StaticDataLoader)
        .create_session(HolidayMode::Easter, Arc::new(clock.clone()))
        .unwrap()
}

fn bundled_router() -> OverlandRouter {
    OverlandRouter::new(
        Arc::new(PolygonLandmass::load_from_static().unwrap()),
        RouterConfig::default(),
    )
}

#[test]
fn full_window_progresses_from_zero_to_complete() {
    let window = GlobalWindow::for_holiday(easter_2025());
    let clock = FixedClock::new(window.start);
    let mut session = easter_session(&clock);
    let people_per_item = session.config().people_per_item();

    let first = session.tick();
    assert!(first.is_holiday);
    assert_eq!(first.completion_percentage, 0.0);
    assert_eq!(first.items_delivered, 0);

    let mut last_pct = 0.0;
    let mut last_visited = 0;
    let mut now = window.start;
    while now <= window.end {
        clock.set(now);
        let snap = session.tick();
        let position = snap.position.expect("position inside the window");
        assert!(snap.completion_percentage >= last_pct);
        assert!(position.visited_cities >= last_visited);
        assert!((-90.0..=90.0).contains(&position.latitude));
        assert!((-180.0..180.0).contains(&position.longitude));
        if snap.journey_path.is_empty() {
            assert_eq!(position.visited_cities, 0);
        } else {
            assert_eq!(snap.journey_path.len(), position.visited_cities + 1);
        }
        last_pct = snap.completion_percentage;
        last_visited = position.visited_cities;
        now += TimeDelta::minutes(10);
    }

    clock.set(window.end);
    let done = session.tick();
    assert_eq!(done.completion_percentage, 100.0);
    assert_eq!(done.items_delivered, total_items(people_per_item));
    let position = done.position.unwrap();
    assert_eq!(position.visited_cities, position.total_cities);
    assert!(position.is_delivering());
    assert_eq!(session.cache().rebuilds(), 1);

    clock.set(window.end + TimeDelta::milliseconds(1));
    let after = session.tick();
    assert!(after.position.is_none());
    assert!(!after.is_holiday);
}

#[test]
fn arrivals_line_up_with_the_previous_leg() {
    let clock = FixedClock::new(easter_2025());
    let mut session = easter_session(&clock);
    let schedule = session.upcoming_schedule().unwrap();
    let entries = schedule.entries();

    let mut checked = 0;
    for i in 1..entries.len() - 1 {
        let entry = &entries[i];
        let shared = entries[i - 1].arrival == entry.arrival
            || entries[i + 1].arrival == entry.arrival;
        if shared {
            continue;
        }

        clock.set(entry.arrival - TimeDelta::milliseconds(1));
        let before = session.tick().position.unwrap();
        assert_eq!(before.next_city.id, entry.city.id);
        let gap = haversine_km(before.point(), entry.city.point());
        assert!(gap < 1.0, "{} approach ends {gap} km away", entry.city.id);

        clock.set(entry.arrival);
        let at = session.tick().position.unwrap();
        assert_eq!(at.current_city.id, entry.city.id);
        assert_eq!(at.transition_progress, 0.0);
        assert!(haversine_km(at.point(), entry.city.point()) < 0.01);
        checked += 1;
    }
    assert!(checked >= 5, "only {checked} unique arrivals checked");
}

#[test]
fn atlantic_legs_route_over_land() {
    let router = bundled_router();
    let london = GeoPoint::new(51.51, -0.13);
    let new_york = GeoPoint::new(40.71, -74.01);
    assert!(router.is_water_crossing(london, new_york));
    let waypoints = router.find_waypoints(london, new_york);
    assert_eq!(waypoints.len(), 3);
    let back = router.find_waypoints(new_york, london);
    assert_eq!(back.first(), waypoints.last());

    let reykjavik = GeoPoint::new(64.15, -21.94);
    let st_johns = GeoPoint::new(47.56, -52.71);
    let detour = router.find_waypoints(reykjavik, st_johns);
    assert_eq!(detour.len(), 1);
    assert_eq!(
        router
            .landmass()
            .landmass_name(detour[0].latitude, detour[0].longitude)
            .as_deref(),
        Some("Greenland")
    );

    // Halfway point bends towards the Greenland waypoint.
    let straight = holitrack_engine::geo::midpoint(reykjavik, st_johns);
    let halfway = router.overland_position(reykjavik, st_johns, 0.5);
    assert!(haversine_km(halfway, straight) > 300.0);
    assert!(haversine_km(halfway, detour[0]) < 500.0);
}

#[test]
fn scheduled_atlantic_leg_without_land_flies_straight() {
    let clock = FixedClock::new(easter_2025());
    let mut session = easter_session(&clock);
    let schedule = session.upcoming_schedule().unwrap();
    let from = schedule.position_of("reykjavik").unwrap();
    let departure = schedule.get(from).unwrap();
    let destination = schedule.get(from + 1).unwrap();
    assert_eq!(destination.city.id, "rio-de-janeiro");

    clock.set(departure.arrival + (destination.arrival - departure.arrival) / 2);
    let position = session.tick().position.unwrap();
    assert_eq!(position.current_city.id, "reykjavik");
    assert_eq!(position.next_city.id, "rio-de-janeiro");
    assert!(!position.is_delivering());
    assert!((position.transition_progress - 0.5).abs() < 1e-9);

    // No land within reach of the mid-Atlantic midpoint, so no detour or correction.
    let straight =
        holitrack_engine::geo::midpoint(departure.city.point(), destination.city.point());
    assert!(haversine_km(position.point(), straight) < 1.0);
    assert!(!position.over_land);
    assert!(position.landmass_name.is_none());
}

fn paris(timezone: &str, inverted_minutes: i32) -> City {
    City {
        id: "paris".to_string(),
        name: "Paris".to_string(),
        country: "France".to_string(),
        latitude: 48.86,
        longitude: 2.35,
        population: 11_000_000,
        timezone: timezone.to_string(),
        timezone_offset_minutes: inverted_minutes,
    }
}

#[test]
fn repeated_city_between_arrivals_keeps_hopping() {
    let cities = vec![
        paris("UTC+01:00", -60),
        paris("UTC+00:00", 0),
        City {
            id: "new-york".to_string(),
            name: "New York".to_string(),
            country: "United States".to_string(),
            latitude: 40.71,
            longitude: -74.01,
            population: 8_300_000,
            timezone: "UTC-05:00".to_string(),
            timezone_offset_minutes: 300,
        },
    ];
    let schedule = Schedule::build(&cities, easter_2025());
    let window = GlobalWindow::for_holiday(easter_2025());
    let now = easter_2025() - TimeDelta::minutes(30);
    assert_eq!(schedule.segment_at(now), Segment::Between { index: 0 });

    let engine = PositionEngine::new(bundled_router());
    let range = delivery_range(DEFAULT_MAP_ZOOM);
    for wall_millis in (0..5_000).step_by(250) {
        let position = engine
            .compute(
                TickInput {
                    now,
                    wall_millis,
                    window: &window,
                    schedule: &schedule,
                    zoom: DEFAULT_MAP_ZOOM,
                },
                &cities,
            )
            .unwrap();
        assert!(position.is_delivering());
        assert_eq!(position.current_city.id, "paris");
        assert!((position.transition_progress - 0.5).abs() < 1e-9);
        assert!((position.latitude - 48.86).abs() <= range + 1e-9);
        assert!((position.longitude - 2.35).abs() <= range + 1e-9);
    }
}

#[test]
fn mock_overrides_drive_a_session() {
    let real = FixedClock::new(Utc.with_ymd_and_hms(2025, 7, 1, 3, 0, 0).unwrap());
    let engine = TrackerEngine::new(StaticDataLoader);

    let query = ClockOverride::from_query("https://tracker.test/?mock_date=2025-12-25");
    let clock = Arc::new(OverrideClock::new(real.clone(), query));
    let mut santa = engine
        .create_session(HolidayMode::Christmas, clock)
        .unwrap();
    let snap = santa.tick();
    assert_eq!(snap.now, Utc.with_ymd_and_hms(2025, 12, 25, 3, 0, 0).unwrap());
    assert!(snap.is_holiday);
    assert!(snap.position.is_some());

    let broken = ClockOverride {
        mock_time: Some("tomorrow-ish".to_string()),
        mock_date: Some("2025-12-25".to_string()),
    };
    let clock = Arc::new(OverrideClock::new(real.clone(), broken));
    let mut idle = engine
        .create_session(HolidayMode::Christmas, clock)
        .unwrap();
    let snap = idle.tick();
    assert_eq!(snap.now, real.now());
    assert!(!snap.is_holiday);
    assert_eq!(
        snap.next_holiday,
        Some(Utc.with_ymd_and_hms(2025, 12, 25, 0, 0, 0).unwrap())
    );
}
