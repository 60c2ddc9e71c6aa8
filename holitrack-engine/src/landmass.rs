//! Land/water lookup backed by GeoJSON polygons.
use serde::Deserialize;
use smallvec::SmallVec;

use crate::error::DataError;
use crate::geo::GeoPoint;

const DEFAULT_LANDMASS_DATA: &str = include_str!("../assets/data/landmass.json");

/// Answers whether a coordinate lies on land.
pub trait LandmassProvider: Send + Sync {
    fn is_over_land(&self, lat: f64, lon: f64) -> bool;

    fn landmass_name(&self, lat: f64, lon: f64) -> Option<String>;

    /// `false` while the dataset is absent; callers skip rerouting then.
    fn is_loaded(&self) -> bool {
        true
    }
}

/// Stand-in used when no polygon data is available: everything counts as land.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnloadedLandmass;

impl LandmassProvider for UnloadedLandmass {
    fn is_over_land(&self, _lat: f64, _lon: f64) -> bool {
        true
    }

    fn landmass_name(&self, _lat: f64, _lon: f64) -> Option<String> {
        None
    }

    fn is_loaded(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl BoundingBox {
    fn of(ring: &[GeoPoint]) -> Self {
        ring.iter().fold(
            Self {
                min_lat: f64::INFINITY,
                max_lat: f64::NEG_INFINITY,
                min_lon: f64::INFINITY,
                max_lon: f64::NEG_INFINITY,
            },
            |b, p| Self {
                min_lat: b.min_lat.min(p.latitude),
                max_lat: b.max_lat.max(p.latitude),
                min_lon: b.min_lon.min(p.longitude),
                max_lon: b.max_lon.max(p.longitude),
            },
        )
    }

    fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// One polygon: an outer ring and optional holes.
#[derive(Debug, Clone, PartialEq)]
struct LandPolygon {
    name: String,
    bbox: BoundingBox,
    outer: Vec<GeoPoint>,
    holes: SmallVec<[Vec<GeoPoint>; 1]>,
}

impl LandPolygon {
    fn contains(&self, lat: f64, lon: f64) -> bool {
        self.bbox.contains(lat, lon)
            && ring_contains(&self.outer, lat, lon)
            && !self.holes.iter().any(|hole| ring_contains(hole, lat, lon))
    }
}

/// Even-odd ray casting along the longitude axis.
fn ring_contains(ring: &[GeoPoint], lat: f64, lon: f64) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for (i, pi) in ring.iter().enumerate() {
        let pj = ring[j];
        if (pi.latitude > lat) != (pj.latitude > lat)
            && lon
                < (pj.longitude - pi.longitude) * (lat - pi.latitude)
                    / (pj.latitude - pi.latitude)
                    + pi.longitude
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: FeatureProperties,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize, Default)]
struct FeatureProperties {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: serde_json::Value,
}

type RawRing = Vec<Vec<f64>>;

fn to_ring(raw: RawRing) -> Vec<GeoPoint> {
    raw.into_iter()
        .filter(|pos| pos.len() >= 2)
        .map(|pos| GeoPoint::new(pos[1], pos[0]))
        .collect()
}

fn to_polygon(name: &str, mut rings: Vec<RawRing>) -> Option<LandPolygon> {
    if rings.is_empty() {
        return None;
    }
    let outer = to_ring(rings.remove(0));
    if outer.len() < 3 {
        return None;
    }
    Some(LandPolygon {
        name: name.to_string(),
        bbox: BoundingBox::of(&outer),
        outer,
        holes: rings.into_iter().map(to_ring).collect(),
    })
}

/// Polygon dataset answering land queries by ray casting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonLandmass {
    polygons: Vec<LandPolygon>,
}

impl PolygonLandmass {
    /// Parse a GeoJSON `FeatureCollection` of Polygon / MultiPolygon features.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed, names an unsupported
    /// geometry type, or yields no usable polygons.
    pub fn from_geojson(json: &str) -> Result<Self, DataError> {
        let collection: FeatureCollection =
            serde_json::from_str(json).map_err(|e| DataError::parse("landmass", e))?;
        let mut polygons = Vec::new();
        for (index, feature) in collection.features.into_iter().enumerate() {
            let Some(geometry) = feature.geometry else {
                continue;
            };
            let name = feature
                .properties
                .name
                .unwrap_or_else(|| format!("landmass-{index}"));
            match geometry.kind.as_str() {
                "Polygon" => {
                    let rings: Vec<RawRing> = serde_json::from_value(geometry.coordinates)
                        .map_err(|e| DataError::parse("landmass", e))?;
                    polygons.extend(to_polygon(&name, rings));
                }
                "MultiPolygon" => {
                    let parts: Vec<Vec<RawRing>> = serde_json::from_value(geometry.coordinates)
                        .map_err(|e| DataError::parse("landmass", e))?;
                    polygons.extend(parts.into_iter().filter_map(|rings| to_polygon(&name, rings)));
                }
                other => {
                    return Err(DataError::UnsupportedGeometry {
                        kind: other.to_string(),
                        feature: name,
                    });
                }
            }
        }
        if polygons.is_empty() {
            return Err(DataError::Empty {
                dataset: "landmass",
            });
        }
        log::debug!("Loaded {} landmass polygons", polygons.len());
        Ok(Self { polygons })
    }

    /// Bundled coarse world outline.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset is malformed.
    pub fn load_from_static() -> Result<Self, DataError> {
        Self::from_geojson(DEFAULT_LANDMASS_DATA)
    }

    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    fn find(&self, lat: f64, lon: f64) -> Option<&LandPolygon> {
        self.polygons.iter().find(|poly| poly.contains(lat, lon))
    }
}

impl LandmassProvider for PolygonLandmass {
    fn is_over_land(&self, lat: f64, lon: f64) -> bool {
        self.find(lat, lon).is_some()
    }

    fn landmass_name(&self, lat: f64, lon: f64) -> Option<String> {
        self.find(lat, lon).map(|poly| poly.name.clone())
    }
}
