//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The fetch gateway over the OpenWeatherMap API
//! - Reduction of the 3-hourly forecast into daily summaries
//! - The query flow that drives an injected presenter
//!
//! It is used by `weather-cli`, but can also be reused by other front-ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod location;
pub mod model;
pub mod provider;

pub use config::{Config, LocationConfig};
pub use dashboard::{Dashboard, Outcome, Presenter};
pub use error::WeatherError;
pub use forecast::{MAX_FORECAST_DAYS, daily_summaries, round_half_up};
pub use location::{ConfiguredLocator, FixedLocator, Geolocator};
pub use model::{
    Condition, Coordinates, CurrentConditions, DailySummary, ForecastSample, LocationQuery, Units,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
