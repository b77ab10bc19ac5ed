use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use weather_core::{
    Config, ConfiguredLocator, Coordinates, Dashboard, FixedLocator, Geolocator, LocationQuery,
    OpenWeatherProvider, Outcome, Presenter, WeatherError, provider_from_config,
};

use crate::render::TerminalPresenter;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and, optionally, a home location.
    Configure {
        /// API key; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,

        /// Latitude used by `weather here`.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude used by `weather here`.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Show weather for a city.
    Show {
        /// City name; prompted for when absent.
        city: Option<String>,
    },

    /// Show weather for explicit coordinates or the configured location.
    Here {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure { api_key, lat, lon } => {
                let api_key = match api_key {
                    Some(key) => key,
                    None => Password::new("OpenWeatherMap API key:")
                        .with_display_mode(PasswordDisplayMode::Masked)
                        .without_confirmation()
                        .prompt()
                        .context("Failed to read API key")?,
                };
                config.set_api_key(api_key);

                if let (Some(lat), Some(lon)) = (lat, lon) {
                    config.set_location(Coordinates::new(lat, lon));
                }

                let path = config.save()?;
                println!("Configuration saved to {}", path.display());
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city } => {
                let city = match city {
                    Some(city) => city,
                    None => Text::new("City:").prompt().context("Failed to read city name")?,
                };

                match city_dashboard(&config, &city) {
                    Ok((query, dashboard)) => Ok(exit_code(&dashboard.run(query).await)),
                    Err(e) => {
                        TerminalPresenter::new(config.units).show_error(&e.user_message());
                        Ok(ExitCode::FAILURE)
                    }
                }
            }
            Command::Here { lat, lon } => {
                let locator: Box<dyn Geolocator> = match (lat, lon) {
                    (Some(lat), Some(lon)) => Box::new(FixedLocator(Coordinates::new(lat, lon))),
                    _ => Box::new(ConfiguredLocator::new(config.location.clone())),
                };

                match dashboard(&config) {
                    Ok(dashboard) => Ok(exit_code(&dashboard.search_here(locator.as_ref()).await)),
                    Err(e) => {
                        TerminalPresenter::new(config.units).show_error(&e.user_message());
                        Ok(ExitCode::FAILURE)
                    }
                }
            }
        }
    }
}

type TerminalDashboard = Dashboard<OpenWeatherProvider, TerminalPresenter>;

fn dashboard(config: &Config) -> Result<TerminalDashboard, WeatherError> {
    let provider = provider_from_config(config)?;
    Ok(Dashboard::new(provider, TerminalPresenter::new(config.units))
        .detailed_errors(config.detailed_errors))
}

/// A blank city is rejected before the credential is looked at.
fn city_dashboard(
    config: &Config,
    city: &str,
) -> Result<(LocationQuery, TerminalDashboard), WeatherError> {
    let query = LocationQuery::city(city)?;
    Ok((query, dashboard(config)?))
}

fn exit_code(outcome: &Outcome) -> ExitCode {
    if succeeded(outcome) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn succeeded(outcome: &Outcome) -> bool {
    !matches!(outcome, Outcome::Failed(_))
}
