//! One user action in, one rendered state out.
//!
//! Every action takes a fresh request id. Results are handed to the
//! presenter only if their id is still the latest when they arrive, so a
//! slow answer to an old query never overwrites a newer one.

use chrono::{FixedOffset, Local, TimeZone};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use crate::{
    error::WeatherError,
    forecast::daily_summaries,
    location::Geolocator,
    model::{CurrentConditions, DailySummary, LocationQuery},
    provider::WeatherProvider,
};

/// Rendering surface the dashboard drives.
pub trait Presenter: Send + Sync {
    fn show_loading(&self);
    fn show_error(&self, message: &str);
    fn show_weather(&self, current: &CurrentConditions, forecast: &[DailySummary]);
}

/// How a query ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Shown,
    Failed(WeatherError),
    /// A newer query was issued before this one finished; its result was dropped.
    Superseded,
}

/// `Tz` is the zone day labels are computed in; each sample is converted
/// with the offset in force at its own timestamp.
pub struct Dashboard<P, R, Tz = Local> {
    provider: P,
    presenter: R,
    tz: Tz,
    detailed_errors: bool,
    latest: AtomicU64,
}

impl<P: WeatherProvider, R: Presenter> Dashboard<P, R, Local> {
    /// Day labels are computed in the local time zone.
    pub fn new(provider: P, presenter: R) -> Self {
        Self {
            provider,
            presenter,
            tz: Local,
            detailed_errors: true,
            latest: AtomicU64::new(0),
        }
    }
}

impl<P, R, Tz> Dashboard<P, R, Tz>
where
    P: WeatherProvider,
    R: Presenter,
    Tz: TimeZone + Send + Sync,
    Tz::Offset: std::fmt::Display,
{
    pub fn with_time_zone<Z: TimeZone>(self, tz: Z) -> Dashboard<P, R, Z> {
        Dashboard {
            provider: self.provider,
            presenter: self.presenter,
            tz,
            detailed_errors: self.detailed_errors,
            latest: self.latest,
        }
    }

    pub fn with_offset(self, offset: FixedOffset) -> Dashboard<P, R, FixedOffset> {
        self.with_time_zone(offset)
    }

    /// When off, every fetch failure is shown with one generic message.
    pub fn detailed_errors(mut self, detailed: bool) -> Self {
        self.detailed_errors = detailed;
        self
    }

    pub fn presenter(&self) -> &R {
        &self.presenter
    }

    /// Search by place name. Blank input fails before any network call.
    pub async fn search(&self, raw: &str) -> Outcome {
        let id = self.begin();
        match LocationQuery::city(raw) {
            Ok(query) => self.load(id, query).await,
            Err(e) => self.finish(id, None, Err(e)),
        }
    }

    /// Search at the position reported by `locator`.
    /// Loading is shown only once a position is known.
    pub async fn search_here(&self, locator: &dyn Geolocator) -> Outcome {
        let id = self.begin();

        match locator.locate().await {
            Ok(coords) => self.load(id, LocationQuery::Coordinates(coords)).await,
            Err(e) => self.finish(id, None, Err(e)),
        }
    }

    /// Run an already-built query.
    pub async fn run(&self, query: LocationQuery) -> Outcome {
        let id = self.begin();
        self.load(id, query).await
    }

    async fn load(&self, id: u64, query: LocationQuery) -> Outcome {
        self.presenter.show_loading();
        let result = self.fetch(&query).await;
        self.finish(id, Some(&query), result)
    }

    fn begin(&self) -> u64 {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(request_id = id, "query started");
        id
    }

    /// Both calls must succeed; a failure of either fails the query.
    async fn fetch(
        &self,
        query: &LocationQuery,
    ) -> Result<(CurrentConditions, Vec<DailySummary>), WeatherError> {
        let (current, samples) = tokio::try_join!(
            self.provider.fetch_current(query),
            self.provider.fetch_forecast(query),
        )?;

        let forecast = daily_summaries(&samples, &self.tz);
        Ok((current, forecast))
    }

    fn finish(
        &self,
        id: u64,
        query: Option<&LocationQuery>,
        result: Result<(CurrentConditions, Vec<DailySummary>), WeatherError>,
    ) -> Outcome {
        if self.latest.load(Ordering::SeqCst) != id {
            debug!(request_id = id, "discarding result of superseded query");
            return Outcome::Superseded;
        }

        match result {
            Ok((current, forecast)) => {
                info!(request_id = id, place = %current.place, days = forecast.len(), "weather loaded");
                self.presenter.show_weather(&current, &forecast);
                Outcome::Shown
            }
            Err(e) => {
                info!(request_id = id, error = %e, "query failed");
                self.presenter.show_error(&self.message_for(&e, query));
                Outcome::Failed(e)
            }
        }
    }

    fn message_for(&self, err: &WeatherError, query: Option<&LocationQuery>) -> String {
        let coordinates = matches!(query, Some(LocationQuery::Coordinates(_)));

        if err.is_fetch_failure() && (!self.detailed_errors || *err == WeatherError::NotFound) {
            return if coordinates {
                "Unable to fetch weather data for your location".to_string()
            } else {
                WeatherError::NotFound.user_message()
            };
        }

        err.user_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        location::{ConfiguredLocator, FixedLocator},
        model::{Condition, Coordinates, ForecastSample},
    };
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::{
        collections::HashMap,
        sync::{Mutex, atomic::AtomicUsize},
        time::Duration,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Loading,
        Error(String),
        Weather { place: String, days: Vec<String> },
    }

    #[derive(Default)]
    struct RecordingPresenter {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingPresenter {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Presenter for RecordingPresenter {
        fn show_loading(&self) {
            self.events.lock().unwrap().push(Event::Loading);
        }

        fn show_error(&self, message: &str) {
            self.events.lock().unwrap().push(Event::Error(message.to_string()));
        }

        fn show_weather(&self, current: &CurrentConditions, forecast: &[DailySummary]) {
            self.events.lock().unwrap().push(Event::Weather {
                place: current.place.clone(),
                days: forecast.iter().map(|d| d.day.clone()).collect(),
            });
        }
    }

    #[derive(Debug, Default)]
    struct FakeProvider {
        calls: AtomicUsize,
        current_error: Option<WeatherError>,
        forecast_error: Option<WeatherError>,
        delays: HashMap<String, Duration>,
        samples: Option<Vec<ForecastSample>>,
    }

    impl FakeProvider {
        async fn pause_for(&self, query: &LocationQuery) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(&query.to_string()) {
                tokio::time::sleep(*delay).await;
            }
        }
    }

    fn condition(icon: &str) -> Condition {
        Condition { icon: icon.into(), description: "test".into() }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch_current(
            &self,
            query: &LocationQuery,
        ) -> Result<CurrentConditions, WeatherError> {
            self.pause_for(query).await;
            if let Some(e) = &self.current_error {
                return Err(e.clone());
            }

            Ok(CurrentConditions {
                place: query.to_string(),
                country: "XX".into(),
                condition: condition("01d"),
                temperature: 20.0,
                feels_like: 19.0,
                humidity_pct: 50,
                wind_speed: 2.0,
                visibility_m: Some(10_000),
                pressure_hpa: 1012,
                observed_at: Utc::now(),
            })
        }

        async fn fetch_forecast(
            &self,
            query: &LocationQuery,
        ) -> Result<Vec<ForecastSample>, WeatherError> {
            self.pause_for(query).await;
            if let Some(e) = &self.forecast_error {
                return Err(e.clone());
            }
            if let Some(samples) = &self.samples {
                return Ok(samples.clone());
            }

            // Monday 2026-10-19 12:00 UTC, then every 12 hours.
            let start = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
            Ok((0..4)
                .map(|i| ForecastSample {
                    timestamp: start + ChronoDuration::hours(12 * i),
                    temperature: 10.0 + i as f64,
                    condition: condition("02d"),
                })
                .collect())
        }
    }

    fn dashboard(
        provider: FakeProvider,
    ) -> Dashboard<FakeProvider, RecordingPresenter, FixedOffset> {
        Dashboard::new(provider, RecordingPresenter::default())
            .with_offset(FixedOffset::east_opt(0).unwrap())
    }

    #[tokio::test]
    async fn search_shows_current_and_daily_forecast() {
        let dash = dashboard(FakeProvider::default());

        assert_eq!(dash.search("  Zurich ").await, Outcome::Shown);

        assert_eq!(
            dash.presenter().events(),
            vec![
                Event::Loading,
                Event::Weather {
                    place: "Zurich".into(),
                    days: vec!["Mon".into(), "Tue".into(), "Wed".into()],
                },
            ]
        );
    }

    #[tokio::test]
    async fn blank_search_fails_before_any_fetch() {
        let dash = dashboard(FakeProvider::default());

        assert_eq!(dash.search("   ").await, Outcome::Failed(WeatherError::EmptyQuery));

        assert_eq!(dash.provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            dash.presenter().events(),
            vec![Event::Error("Please enter a city name".into())]
        );
    }

    #[tokio::test]
    async fn forecast_failure_fails_whole_query() {
        let dash = dashboard(FakeProvider {
            forecast_error: Some(WeatherError::NotFound),
            ..FakeProvider::default()
        });

        assert_eq!(dash.search("Atlantis").await, Outcome::Failed(WeatherError::NotFound));

        let events = dash.presenter().events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            Event::Error("City not found. Please check the spelling and try again.".into())
        );
    }

    #[tokio::test]
    async fn detailed_errors_name_the_cause() {
        let dash = dashboard(FakeProvider {
            current_error: Some(WeatherError::RateLimited),
            ..FakeProvider::default()
        });

        dash.search("London").await;

        assert_eq!(
            dash.presenter().events().last(),
            Some(&Event::Error(WeatherError::RateLimited.user_message()))
        );
    }

    #[tokio::test]
    async fn generic_errors_hide_the_cause() {
        let dash = dashboard(FakeProvider {
            current_error: Some(WeatherError::RateLimited),
            ..FakeProvider::default()
        })
        .detailed_errors(false);

        dash.search("London").await;
        dash.search_here(&FixedLocator(Coordinates::new(1.0, 2.0))).await;

        let errors: Vec<_> = dash
            .presenter()
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Error(_)))
            .collect();
        assert_eq!(
            errors,
            vec![
                Event::Error("City not found. Please check the spelling and try again.".into()),
                Event::Error("Unable to fetch weather data for your location".into()),
            ]
        );
    }

    #[tokio::test]
    async fn search_here_uses_located_coordinates() {
        let dash = dashboard(FakeProvider::default());

        let outcome = dash.search_here(&FixedLocator(Coordinates::new(47.5, 8.5))).await;

        assert_eq!(outcome, Outcome::Shown);
        assert!(matches!(
            dash.presenter().events().last(),
            Some(Event::Weather { place, .. }) if place == "47.5, 8.5"
        ));
    }

    #[tokio::test]
    async fn search_here_without_location_source_is_unsupported() {
        let dash = dashboard(FakeProvider::default());

        let outcome = dash.search_here(&ConfiguredLocator::new(None)).await;

        assert_eq!(outcome, Outcome::Failed(WeatherError::GeolocationUnsupported));
        assert_eq!(dash.provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            dash.presenter().events(),
            vec![Event::Error(WeatherError::GeolocationUnsupported.user_message())]
        );
    }

    #[tokio::test]
    async fn day_labels_follow_daylight_saving_change() {
        // Helsinki leaves EEST (+03:00) for EET (+02:00) on 2026-10-25.
        // 2026-10-26 21:30 UTC is Monday 23:30 local, but Tuesday under +03:00.
        let before = Utc.with_ymd_and_hms(2026, 10, 24, 12, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 10, 26, 21, 30, 0).unwrap();
        let samples = vec![
            ForecastSample { timestamp: before, temperature: 8.0, condition: condition("04d") },
            ForecastSample { timestamp: after, temperature: 3.0, condition: condition("01n") },
        ];

        let dash = Dashboard::new(
            FakeProvider { samples: Some(samples), ..FakeProvider::default() },
            RecordingPresenter::default(),
        )
        .with_time_zone(chrono_tz::Europe::Helsinki);

        assert_eq!(dash.search("Helsinki").await, Outcome::Shown);
        assert_eq!(
            dash.presenter().events().last(),
            Some(&Event::Weather {
                place: "Helsinki".into(),
                days: vec!["Sat".into(), "Mon".into()],
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_older_query_is_discarded() {
        let dash = dashboard(FakeProvider {
            delays: HashMap::from([("Slowtown".to_string(), Duration::from_secs(5))]),
            ..FakeProvider::default()
        });

        let (slow, fast) = tokio::join!(dash.search("Slowtown"), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            dash.search("Fasttown").await
        });

        assert_eq!(slow, Outcome::Superseded);
        assert_eq!(fast, Outcome::Shown);

        let shown: Vec<_> = dash
            .presenter()
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Weather { place, .. } => Some(place),
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec!["Fasttown".to_string()]);
    }

    #[tokio::test]
    async fn run_accepts_prebuilt_query() {
        let dash = dashboard(FakeProvider::default());

        assert_eq!(dash.run(LocationQuery::coordinates(0.0, 0.0)).await, Outcome::Shown);
        assert_eq!(dash.provider.calls.load(Ordering::SeqCst), 2);
    }
}
