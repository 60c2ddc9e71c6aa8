//! Error types raised at the engine's seams.
use thiserror::Error;

/// Failure while computing a tracker position for one tick.
///
/// The tick boundary turns every variant into "no position".
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackerError {
    #[error("city dataset is empty")]
    NoCities,
    #[error("schedule for {holiday} has no entries")]
    EmptySchedule { holiday: String },
    #[error("non-finite coordinate computed for {field}: {value}")]
    NonFiniteCoordinate { field: &'static str, value: f64 },
}

/// Failure while loading bundled or external datasets.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to parse {dataset} dataset: {source}")]
    Parse {
        dataset: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{dataset} dataset is empty")]
    Empty { dataset: &'static str },
    #[error("unsupported geometry type `{kind}` in feature `{feature}`")]
    UnsupportedGeometry { kind: String, feature: String },
}

/// Failure reported by a viewer geolocation provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("geolocation request timed out")]
    Timeout,
    #[error("position unavailable: {0}")]
    Unavailable(String),
}

impl DataError {
    pub(crate) const fn parse(dataset: &'static str, source: serde_json::Error) -> Self {
        Self::Parse { dataset, source }
    }
}
