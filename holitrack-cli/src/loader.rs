use std::fs;
use std::path::PathBuf;

use holitrack_engine::{
    CityData, DataError, DataLoader, HolidayConfig, HolidayMode, PolygonLandmass, RouterConfig,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Loads datasets from a directory laid out like the bundled assets:
///
/// ```text
/// <root>/cities.json
/// <root>/landmass.json
/// <root>/router.json          (optional)
/// <root>/holidays/<mode>.json (falls back to the bundled config)
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryDataLoader {
    root: PathBuf,
}

impl DirectoryDataLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, relative: &str) -> Result<String, LoaderError> {
        let path = self.root.join(relative);
        fs::read_to_string(&path).map_err(|source| LoaderError::Io { path, source })
    }
}

impl DataLoader for DirectoryDataLoader {
    type Error = LoaderError;

    fn load_cities(&self) -> Result<CityData, Self::Error> {
        Ok(CityData::from_json(&self.read("cities.json")?)?)
    }

    fn load_landmass(&self) -> Result<PolygonLandmass, Self::Error> {
        Ok(PolygonLandmass::from_geojson(&self.read("landmass.json")?)?)
    }

    fn load_holiday_config(&self, mode: HolidayMode) -> Result<HolidayConfig, Self::Error> {
        let relative = format!("holidays/{}.json", mode.key());
        match self.read(&relative) {
            Ok(raw) => Ok(HolidayConfig::from_json(&raw)?),
            Err(err) => {
                log::warn!("{err}; using bundled {mode} config");
                Ok(HolidayConfig::load_from_static(mode)?)
            }
        }
    }

    fn load_router_config(&self) -> Result<RouterConfig, Self::Error> {
        let path = self.root.join("router.json");
        if !path.exists() {
            return Ok(RouterConfig::default());
        }
        let raw = self.read("router.json")?;
        serde_json::from_str(&raw).map_err(|source| {
            LoaderError::Data(DataError::Parse {
                dataset: "router",
                source,
            })
        })
    }
}
