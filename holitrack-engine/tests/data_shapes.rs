use std::collections::HashSet;

use holitrack_engine::{
    CityData, DateAlgorithm, HolidayConfig, HolidayDateRule, HolidayMode, LandmassProvider,
    OverlandRouter, PolygonLandmass, RouterConfig,
};
use serde_json::Value;
use std::sync::Arc;

const CITIES_JSON: &str = include_str!("../assets/data/cities.json");

#[test]
fn bundled_cities_are_well_formed() {
    let data = CityData::load_from_static().unwrap();
    assert!(data.cities.len() >= 50);

    let mut ids = HashSet::new();
    for city in &data.cities {
        assert!(ids.insert(city.id.as_str()), "duplicate city id {}", city.id);
        assert!((-90.0..=90.0).contains(&city.latitude), "{}", city.id);
        assert!((-180.0..=180.0).contains(&city.longitude), "{}", city.id);
        assert_eq!(
            city.utc_offset(),
            city.dataset_offset(),
            "{}: label {} disagrees with offset {}",
            city.id,
            city.timezone,
            city.timezone_offset_minutes
        );
    }
}

#[test]
fn city_records_use_camel_case_keys() {
    let raw: Value = serde_json::from_str(CITIES_JSON).unwrap();
    let first = &raw["cities"][0];
    for key in [
        "id",
        "name",
        "country",
        "latitude",
        "longitude",
        "population",
        "timezone",
        "timezoneOffsetMinutes",
    ] {
        assert!(first.get(key).is_some(), "missing key {key}");
    }
}

#[test]
fn bundled_holidays_resolve_their_dates() {
    let easter = HolidayConfig::load_from_static(HolidayMode::Easter).unwrap();
    assert_eq!(easter.id, "easter");
    assert_eq!(easter.date, HolidayDateRule::Calculated(DateAlgorithm::Easter));
    assert!(!easter.facts.is_empty());

    let christmas = HolidayConfig::load_from_static(HolidayMode::Christmas).unwrap();
    assert_eq!(christmas.id, "christmas");
    assert_eq!(christmas.date, HolidayDateRule::Fixed { month: 12, day: 25 });
    assert_eq!(christmas.character_name, "Santa");

    for config in [&easter, &christmas] {
        let ids: HashSet<u32> = config.facts.iter().map(|fact| fact.id).collect();
        assert_eq!(ids.len(), config.facts.len(), "{} fact ids repeat", config.id);
        assert!(config.people_per_item() >= 1);
        assert!(!config.delivery_items.is_empty());
    }
}

#[test]
fn bundled_cities_sit_on_land() {
    let landmass = PolygonLandmass::load_from_static().unwrap();
    let cities = CityData::load_from_static().unwrap().cities;
    let offshore: Vec<&str> = cities
        .iter()
        .filter(|city| !landmass.is_over_land(city.latitude, city.longitude))
        .map(|city| city.id.as_str())
        .collect();
    // Atolls are below the polygon resolution.
    assert_eq!(offshore, ["kiritimati"]);
    assert_eq!(
        landmass.landmass_name(51.51, -0.13).as_deref(),
        Some("Great Britain")
    );
}

#[test]
fn known_crossing_waypoints_are_on_land() {
    let landmass = Arc::new(PolygonLandmass::load_from_static().unwrap());
    let router = OverlandRouter::new(landmass, RouterConfig::default());
    assert!(!router.config().known_crossings.is_empty());
    for crossing in &router.config().known_crossings {
        for waypoint in &crossing.waypoints {
            assert!(
                router.is_land(*waypoint),
                "{} waypoint {:?} is in the water",
                crossing.name,
                waypoint
            );
        }
    }
}
