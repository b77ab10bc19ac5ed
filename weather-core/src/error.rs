use thiserror::Error;

/// Everything that can end a dashboard query.
///
/// The fetch kinds (`NotFound` through `Malformed`) are kept apart so a
/// front-end can word its message per cause, while `is_fetch_failure`
/// still lets it fall back to one generic message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("location query is empty")]
    EmptyQuery,

    #[error("no API key configured for the weather provider")]
    MissingCredential,

    #[error("the provider has no data for this location")]
    NotFound,

    #[error("the provider rejected the API key")]
    Unauthorized,

    #[error("the provider is rate limiting requests")]
    RateLimited,

    #[error("the provider is unreachable: {0}")]
    Unreachable(String),

    #[error("the provider answered with unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("the provider response could not be decoded: {0}")]
    Malformed(String),

    #[error("geolocation is not available on this system")]
    GeolocationUnsupported,

    #[error("access to the current location was denied")]
    GeolocationDenied,
}

impl WeatherError {
    /// True for any failure raised by the fetch gateway.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            WeatherError::NotFound
                | WeatherError::Unauthorized
                | WeatherError::RateLimited
                | WeatherError::Unreachable(_)
                | WeatherError::UnexpectedStatus(_)
                | WeatherError::Malformed(_)
        )
    }

    /// Text shown to the end user in place of the weather content.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::EmptyQuery => "Please enter a city name".to_string(),
            WeatherError::MissingCredential => {
                "Please add your OpenWeatherMap API key to use live data.\n\
                 Hint: run `weather configure` and enter your API key."
                    .to_string()
            }
            WeatherError::NotFound => {
                "City not found. Please check the spelling and try again.".to_string()
            }
            WeatherError::Unauthorized => {
                "The weather service rejected the API key. Please check your configuration."
                    .to_string()
            }
            WeatherError::RateLimited => {
                "Too many requests to the weather service. Please wait a moment and try again."
                    .to_string()
            }
            WeatherError::Unreachable(_) => {
                "Could not reach the weather service. Please check your connection.".to_string()
            }
            WeatherError::UnexpectedStatus(code) => {
                format!("The weather service is unavailable right now (status {code}).")
            }
            WeatherError::Malformed(_) => {
                "The weather service sent data that could not be read.".to_string()
            }
            WeatherError::GeolocationUnsupported => {
                "Geolocation is not supported on this system".to_string()
            }
            WeatherError::GeolocationDenied => {
                "Unable to access your location. Please search for a city instead.".to_string()
            }
        }
    }
}
