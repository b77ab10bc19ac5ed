use std::fmt::Write as _;

use chrono::{DateTime, Local};
use weather_core::{CurrentConditions, DailySummary, Presenter, Units, round_half_up};

/// Prints dashboard states to the terminal.
#[derive(Debug)]
pub struct TerminalPresenter {
    units: Units,
}

impl TerminalPresenter {
    pub fn new(units: Units) -> Self {
        Self { units }
    }
}

impl Presenter for TerminalPresenter {
    fn show_loading(&self) {
        eprintln!("Fetching weather...");
    }

    fn show_error(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    fn show_weather(&self, current: &CurrentConditions, forecast: &[DailySummary]) {
        println!("{}", render_current(current, self.units, Local::now()));
        if !forecast.is_empty() {
            println!();
            print!("{}", render_forecast(forecast));
        }
    }
}

/// e.g. "Monday, October 19, 2026 02:15 PM"
pub fn format_date_time(at: DateTime<Local>) -> String {
    at.format("%A, %B %-d, %Y %I:%M %p").to_string()
}

pub fn render_current(current: &CurrentConditions, units: Units, now: DateTime<Local>) -> String {
    let temp = units.temperature_symbol();
    let visibility = current
        .visibility_km()
        .map(|km| format!("{km:.1} km"))
        .unwrap_or_else(|| "n/a".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "{}, {}", current.place, current.country);
    let _ = writeln!(out, "{}", format_date_time(now));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}{temp}  {}", round_half_up(current.temperature), current.condition.description);
    let _ = writeln!(out, "Feels like {}{temp}", round_half_up(current.feels_like));
    let _ = writeln!(out, "Icon: {}", current.condition.icon_url());
    let _ = writeln!(out);
    let _ = writeln!(out, "Wind:       {} {}", current.wind_speed, units.speed_symbol());
    let _ = writeln!(out, "Humidity:   {}%", current.humidity_pct);
    let _ = writeln!(out, "Visibility: {visibility}");
    let _ = writeln!(out, "Pressure:   {} hPa", current.pressure_hpa);
    let _ = write!(
        out,
        "Observed:   {}",
        current.observed_at.with_timezone(&Local).format("%I:%M %p")
    );
    out
}

pub fn render_forecast(forecast: &[DailySummary]) -> String {
    let mut out = String::new();
    for day in forecast {
        let _ = writeln!(
            out,
            "{:<4} {:>4}° {:>4}°  {}  {}",
            day.day,
            day.high,
            day.low,
            day.condition.description,
            day.condition.icon_url()
        );
    }
    out
}
