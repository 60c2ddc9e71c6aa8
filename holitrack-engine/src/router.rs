//! Overland routing: keep transit paths from cutting straight across oceans.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::constants::{
    ROUTER_CORRECTION_SEARCH_DEG, ROUTER_CROSSING_MATCH_KM, ROUTER_MIDPOINT_SEARCH_DEG,
    ROUTER_SAMPLE_COUNT, ROUTER_SEARCH_DIRECTIONS, ROUTER_SEARCH_STEP_DEG, ROUTER_SHORT_HOP_KM,
    ROUTER_WATER_THRESHOLD, ROUTER_WAYPOINT_MIN_KM,
};
use crate::geo::{GeoPoint, haversine_km, lerp, midpoint, normalize_longitude};
use crate::landmass::LandmassProvider;
use crate::numbers::{floor_f64_to_u64, u64_to_f64};

pub type Waypoints = SmallVec<[GeoPoint; 4]>;

/// A long ocean crossing with hand-picked land stepping stones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownCrossing {
    pub name: String,
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub waypoints: Waypoints,
}

impl KnownCrossing {
    /// Waypoints for a trip from `start` to `end`, reversed for the return direction.
    #[must_use]
    pub fn waypoints_for(&self, start: GeoPoint, end: GeoPoint, radius_km: f64) -> Option<Waypoints> {
        let near = |a: GeoPoint, b: GeoPoint| haversine_km(a, b) < radius_km;
        if near(start, self.from) && near(end, self.to) {
            return Some(self.waypoints.clone());
        }
        if near(start, self.to) && near(end, self.from) {
            return Some(self.waypoints.iter().rev().copied().collect());
        }
        None
    }
}

/// Router thresholds and the known-crossings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    #[serde(default = "default_water_threshold")]
    pub water_threshold: f64,
    #[serde(default = "default_short_hop_km")]
    pub short_hop_km: f64,
    #[serde(default = "default_waypoint_min_km")]
    pub waypoint_min_km: f64,
    #[serde(default = "default_crossing_match_km")]
    pub crossing_match_km: f64,
    #[serde(default = "default_search_step_deg")]
    pub search_step_deg: f64,
    #[serde(default = "default_midpoint_search_deg")]
    pub midpoint_search_deg: f64,
    #[serde(default = "default_correction_search_deg")]
    pub correction_search_deg: f64,
    #[serde(default = "default_search_directions")]
    pub search_directions: u16,
    #[serde(default = "default_known_crossings")]
    pub known_crossings: Vec<KnownCrossing>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            water_threshold: default_water_threshold(),
            short_hop_km: default_short_hop_km(),
            waypoint_min_km: default_waypoint_min_km(),
            crossing_match_km: default_crossing_match_km(),
            search_step_deg: default_search_step_deg(),
            midpoint_search_deg: default_midpoint_search_deg(),
            correction_search_deg: default_correction_search_deg(),
            search_directions: default_search_directions(),
            known_crossings: default_known_crossings(),
        }
    }
}

const fn default_sample_count() -> usize {
    ROUTER_SAMPLE_COUNT
}

const fn default_water_threshold() -> f64 {
    ROUTER_WATER_THRESHOLD
}

const fn default_short_hop_km() -> f64 {
    ROUTER_SHORT_HOP_KM
}

const fn default_waypoint_min_km() -> f64 {
    ROUTER_WAYPOINT_MIN_KM
}

const fn default_crossing_match_km() -> f64 {
    ROUTER_CROSSING_MATCH_KM
}

const fn default_search_step_deg() -> f64 {
    ROUTER_SEARCH_STEP_DEG
}

const fn default_midpoint_search_deg() -> f64 {
    ROUTER_MIDPOINT_SEARCH_DEG
}

const fn default_correction_search_deg() -> f64 {
    ROUTER_CORRECTION_SEARCH_DEG
}

const fn default_search_directions() -> u16 {
    ROUTER_SEARCH_DIRECTIONS
}

fn default_known_crossings() -> Vec<KnownCrossing> {
    vec![
        KnownCrossing {
            name: "North Atlantic".to_string(),
            from: GeoPoint::new(50.0, -5.0),
            to: GeoPoint::new(40.0, -70.0),
            waypoints: smallvec![
                GeoPoint::new(64.1, -20.0),
                GeoPoint::new(61.0, -46.0),
                GeoPoint::new(48.0, -56.0),
            ],
        },
        KnownCrossing {
            name: "North Pacific".to_string(),
            from: GeoPoint::new(37.0, -122.0),
            to: GeoPoint::new(35.0, 140.0),
            waypoints: smallvec![GeoPoint::new(51.9, -176.0), GeoPoint::new(43.5, 142.8)],
        },
        KnownCrossing {
            name: "Europe-Africa".to_string(),
            from: GeoPoint::new(40.0, 10.0),
            to: GeoPoint::new(0.0, 10.0),
            waypoints: smallvec![GeoPoint::new(37.5, 14.0)],
        },
    ]
}

/// Interpolate along `points` by great-circle share of the total length.
///
/// Returns `None` for an empty list.
#[must_use]
pub fn interpolate_path(points: &[GeoPoint], progress: f64) -> Option<GeoPoint> {
    let first = *points.first()?;
    let last = *points.last()?;
    if progress <= 0.0 {
        return Some(first);
    }
    if progress >= 1.0 {
        return Some(last);
    }
    let lengths: SmallVec<[f64; 8]> = points
        .windows(2)
        .map(|pair| haversine_km(pair[0], pair[1]))
        .collect();
    let total: f64 = lengths.iter().sum();
    if total <= 0.0 {
        return Some(first);
    }
    let mut covered = 0.0;
    for (pair, length) in points.windows(2).zip(&lengths) {
        let share = length / total;
        if progress <= covered + share && share > 0.0 {
            return Some(lerp(pair[0], pair[1], (progress - covered) / share));
        }
        covered += share;
    }
    Some(last)
}

/// Routes transit positions around large bodies of water.
#[derive(Clone)]
pub struct OverlandRouter {
    landmass: Arc<dyn LandmassProvider>,
    config: RouterConfig,
}

impl std::fmt::Debug for OverlandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlandRouter")
            .field("landmass_loaded", &self.landmass.is_loaded())
            .field("config", &self.config)
            .finish()
    }
}

impl OverlandRouter {
    #[must_use]
    pub fn new(landmass: Arc<dyn LandmassProvider>, config: RouterConfig) -> Self {
        Self { landmass, config }
    }

    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn landmass(&self) -> &dyn LandmassProvider {
        self.landmass.as_ref()
    }

    #[must_use]
    pub fn is_land(&self, point: GeoPoint) -> bool {
        self.landmass.is_over_land(point.latitude, point.longitude)
    }

    /// Does the straight line from `a` to `b` cross significant water?
    #[must_use]
    pub fn is_water_crossing(&self, a: GeoPoint, b: GeoPoint) -> bool {
        let a_land = self.is_land(a);
        let b_land = self.is_land(b);
        let distance = haversine_km(a, b);
        if a_land && b_land && distance < self.config.short_hop_km {
            return false;
        }
        if a_land != b_land && distance > self.config.short_hop_km {
            return true;
        }
        let samples = self.config.sample_count;
        if samples == 0 {
            return false;
        }
        let steps = u64_to_f64(samples as u64 + 1);
        let water = (1..=samples)
            .filter(|&i| !self.is_land(lerp(a, b, u64_to_f64(i as u64) / steps)))
            .count();
        u64_to_f64(water as u64) / u64_to_f64(samples as u64) > self.config.water_threshold
    }

    /// Intermediate land points for a long water crossing, possibly none.
    #[must_use]
    pub fn find_waypoints(&self, a: GeoPoint, b: GeoPoint) -> Waypoints {
        if haversine_km(a, b) < self.config.waypoint_min_km {
            return Waypoints::new();
        }
        if let Some(crossing) = self.config.known_crossings.iter().find_map(|crossing| {
            crossing
                .waypoints_for(a, b, self.config.crossing_match_km)
                .map(|waypoints| (crossing.name.as_str(), waypoints))
        }) {
            log::debug!("Routing via known crossing {}", crossing.0);
            return crossing.1;
        }
        self.find_nearby_land(midpoint(a, b), self.config.midpoint_search_deg)
            .map(|land| smallvec![land])
            .unwrap_or_default()
    }

    /// Nearest land found by expanding rings around `point`, up to `max_deg`.
    #[must_use]
    pub fn find_nearby_land(&self, point: GeoPoint, max_deg: f64) -> Option<GeoPoint> {
        if self.is_land(point) {
            return Some(point);
        }
        let step = self.config.search_step_deg;
        if step <= 0.0 || self.config.search_directions == 0 {
            return None;
        }
        let rings = floor_f64_to_u64(max_deg / step + 1e-9);
        let directions = f64::from(self.config.search_directions);
        for ring in 1..=rings {
            let radius = u64_to_f64(ring) * step;
            for direction in 0..self.config.search_directions {
                let angle = (f64::from(direction) * 360.0 / directions).to_radians();
                let candidate = GeoPoint::new(
                    (point.latitude + radius * angle.sin()).clamp(-90.0, 90.0),
                    normalize_longitude(point.longitude + radius * angle.cos()),
                );
                if self.is_land(candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Position at `progress` from `a` to `b`, routed over land where possible.
    #[must_use]
    pub fn overland_position(&self, a: GeoPoint, b: GeoPoint, progress: f64) -> GeoPoint {
        if progress <= 0.0 {
            return a;
        }
        if progress >= 1.0 {
            return b;
        }
        if !self.landmass.is_loaded() || !self.is_water_crossing(a, b) {
            return lerp(a, b, progress);
        }
        let waypoints = self.find_waypoints(a, b);
        if waypoints.is_empty() {
            return lerp(a, b, progress);
        }
        let mut path: SmallVec<[GeoPoint; 6]> = SmallVec::with_capacity(waypoints.len() + 2);
        path.push(a);
        path.extend(waypoints);
        path.push(b);
        interpolate_path(&path, progress).unwrap_or_else(|| lerp(a, b, progress))
    }

    /// Nearest land within the correction radius, if any.
    #[must_use]
    pub fn correct_to_land(&self, point: GeoPoint) -> Option<GeoPoint> {
        self.find_nearby_land(point, self.config.correction_search_deg)
    }
}
