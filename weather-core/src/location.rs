//! Single-shot sources for the user's current coordinates.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{config::LocationConfig, error::WeatherError, model::Coordinates};

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Read the current position once.
    ///
    /// Fails with `GeolocationUnsupported` when no position source exists and
    /// `GeolocationDenied` when one exists but refuses to answer.
    async fn locate(&self) -> Result<Coordinates, WeatherError>;
}

/// Coordinates given explicitly, e.g. on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinates);

#[async_trait]
impl Geolocator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, WeatherError> {
        Ok(self.0)
    }
}

/// Position stored in the `[location]` table of the config file.
#[derive(Debug, Clone)]
pub struct ConfiguredLocator {
    location: Option<LocationConfig>,
}

impl ConfiguredLocator {
    pub fn new(location: Option<LocationConfig>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl Geolocator for ConfiguredLocator {
    async fn locate(&self) -> Result<Coordinates, WeatherError> {
        match &self.location {
            None => Err(WeatherError::GeolocationUnsupported),
            Some(loc) if !loc.enabled => Err(WeatherError::GeolocationDenied),
            Some(loc) => Ok(loc.coordinates()),
        }
    }
}
