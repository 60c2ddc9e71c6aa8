use async_trait::async_trait;
use holitrack_engine::{GeoPoint, GeolocationError, GeolocationProvider};

/// Viewer position supplied on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocation {
    point: GeoPoint,
}

impl FixedGeolocation {
    pub const fn new(point: GeoPoint) -> Self {
        Self { point }
    }
}

#[async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn current_position(&self) -> Result<GeoPoint, GeolocationError> {
        self.point
            .ensure_finite()
            .map_err(|err| GeolocationError::Unavailable(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_the_configured_point() {
        let provider = FixedGeolocation::new(GeoPoint::new(-33.87, 151.21));
        assert_eq!(
            provider.current_position().await,
            Ok(GeoPoint::new(-33.87, 151.21))
        );
    }

    #[tokio::test]
    async fn rejects_non_finite_coordinates() {
        let provider = FixedGeolocation::new(GeoPoint::new(f64::NAN, 0.0));
        assert!(matches!(
            provider.current_position().await,
            Err(GeolocationError::Unavailable(_))
        ));
    }
}
