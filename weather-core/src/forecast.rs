//! Reduction of the provider's 3-hourly forecast into daily summaries.

use chrono::TimeZone;

use crate::model::{Condition, DailySummary, ForecastSample};

/// Number of daily summaries kept from a forecast.
pub const MAX_FORECAST_DAYS: usize = 5;

struct DayGroup {
    day: String,
    condition: Condition,
    temps: Vec<f64>,
}

/// Short weekday label ("Mon", "Tue", ...) of a sample in the given zone.
pub fn day_label<Tz: TimeZone>(sample: &ForecastSample, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    sample.timestamp.with_timezone(tz).format("%a").to_string()
}

/// Group samples by weekday label, in first-seen order, and keep the first
/// `MAX_FORECAST_DAYS` groups.
///
/// The condition of a group comes from its first sample; later samples only
/// contribute temperatures. Samples are not re-sorted, and samples a week
/// apart share a label and are merged.
pub fn daily_summaries<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailySummary>
where
    Tz::Offset: std::fmt::Display,
{
    let mut groups: Vec<DayGroup> = Vec::new();

    for sample in samples {
        let day = day_label(sample, tz);

        match groups.iter_mut().find(|g| g.day == day) {
            Some(group) => group.temps.push(sample.temperature),
            None => groups.push(DayGroup {
                day,
                condition: sample.condition.clone(),
                temps: vec![sample.temperature],
            }),
        }
    }

    groups
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(|g| {
            let high = g.temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let low = g.temps.iter().copied().fold(f64::INFINITY, f64::min);

            DailySummary {
                day: g.day,
                condition: g.condition,
                high: round_half_up(high),
                low: round_half_up(low),
            }
        })
        .collect()
}

/// Nearest whole degree, with halves rounded towards positive infinity.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
