use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    error::WeatherError,
    model::{Condition, CurrentConditions, ForecastSample, LocationQuery, Units},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: Units,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at another endpoint (a proxy or a mock server).
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            units: Units::default(),
            http: Client::new(),
        }
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn unit_system(&self) -> Units {
        self.units
    }

    /// Query parameters for one request: location, credential and unit system.
    fn params(&self, query: &LocationQuery) -> Vec<(&'static str, String)> {
        let mut params = match query {
            LocationQuery::City(name) => vec![("q", name.clone())],
            LocationQuery::Coordinates(c) => {
                vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
            }
        };

        params.push(("appid", self.api_key.clone()));
        params.push(("units", self.units.as_str().to_string()));
        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &LocationQuery,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, %query, units = self.units.as_str(), "requesting OpenWeather");

        let res = self.http.get(&url).query(&self.params(query)).send().await.map_err(|e| {
            warn!(%url, error = %e, "OpenWeather {endpoint} request failed to send");
            WeatherError::Unreachable(e.to_string())
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            warn!(%url, error = %e, "failed to read OpenWeather {endpoint} response body");
            WeatherError::Unreachable(e.to_string())
        })?;

        if !status.is_success() {
            warn!(
                %url,
                status = status.as_u16(),
                body = %truncate_body(&body),
                "OpenWeather {endpoint} request failed"
            );
            return Err(status_error(status));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(%url, error = %e, "failed to parse OpenWeather {endpoint} JSON");
            WeatherError::Malformed(e.to_string())
        })
    }
}

/// Map a non-success status to the failure kind it stands for.
fn status_error(status: StatusCode) -> WeatherError {
    match status {
        StatusCode::NOT_FOUND => WeatherError::NotFound,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => WeatherError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => WeatherError::RateLimited,
        other => WeatherError::UnexpectedStatus(other.as_u16()),
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

impl From<OwWeather> for Condition {
    fn from(w: OwWeather) -> Self {
        Condition { icon: w.icon, description: w.description }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn first_condition(weather: Vec<OwWeather>) -> Result<Condition, WeatherError> {
    weather
        .into_iter()
        .next()
        .map(Condition::from)
        .ok_or_else(|| WeatherError::Malformed("entry has no weather condition".to_string()))
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| WeatherError::Malformed(format!("timestamp {ts} is out of range")))
}

impl TryFrom<OwCurrentResponse> for CurrentConditions {
    type Error = WeatherError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self, Self::Error> {
        Ok(CurrentConditions {
            place: parsed.name,
            country: parsed.sys.country,
            condition: first_condition(parsed.weather)?,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            visibility_m: parsed.visibility,
            pressure_hpa: parsed.main.pressure,
            observed_at: unix_to_utc(parsed.dt)?,
        })
    }
}

impl TryFrom<OwForecastEntry> for ForecastSample {
    type Error = WeatherError;

    fn try_from(entry: OwForecastEntry) -> Result<Self, Self::Error> {
        Ok(ForecastSample {
            timestamp: unix_to_utc(entry.dt)?,
            temperature: entry.main.temp,
            condition: first_condition(entry.weather)?,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, query: &LocationQuery) -> Result<CurrentConditions, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json("weather", query).await?;
        CurrentConditions::try_from(parsed)
    }

    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        let parsed: OwForecastResponse = self.get_json("forecast", query).await?;
        parsed.list.into_iter().map(ForecastSample::try_from).collect()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
