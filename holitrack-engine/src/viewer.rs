//! The person watching the tracker and their nearest city.
use serde::{Deserialize, Serialize};

use crate::city::{City, nearest_city};
use crate::geo::GeoPoint;
use crate::position::CharacterPosition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub nearest_city: Option<City>,
}

impl ViewerLocation {
    /// Locate the viewer and resolve their nearest city from `cities`.
    #[must_use]
    pub fn resolve(latitude: f64, longitude: f64, cities: &[City]) -> Self {
        let nearest = nearest_city(GeoPoint::new(latitude, longitude), cities)
            .map_err(|err| log::error!("Error finding nearest city: {err}"))
            .ok()
            .cloned();
        Self {
            latitude,
            longitude,
            nearest_city: nearest,
        }
    }

    /// Is the character currently nearest to the same city as the viewer?
    #[must_use]
    pub fn is_nearby(&self, position: &CharacterPosition) -> bool {
        self.nearest_city
            .as_ref()
            .is_some_and(|city| city.name == position.nearest_city.name)
    }
}
