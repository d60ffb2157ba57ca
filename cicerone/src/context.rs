//! Situational preamble prepended to every outbound recommendation query.

use chrono::{NaiveDateTime, Timelike};

use crate::models::{UserContext, WeatherSnapshot};

fn time_of_day(hour: u32) -> &'static str {
    match hour {
        5..=11 => "morning",
        12..=16 => "afternoon",
        17..=20 => "evening",
        _ => "night",
    }
}

/// Trailing-zero-free radius rendering: 5.0 -> "5", 2.5 -> "2.5".
fn format_radius(radius: f64) -> String {
    if radius.fract() == 0.0 {
        format!("{}", radius as i64)
    } else {
        format!("{radius}")
    }
}

/// Composes the context string, e.g.
/// `Current context: morning (9:30 AM), 72°F, clear sky, Location: New York
/// (40.7128, -74.0060), Strictly limit results to within 5 miles`.
///
/// Deterministic given its inputs; callers pass the current local time.
pub fn build_context_string(
    weather: Option<&WeatherSnapshot>,
    ctx: &UserContext,
    city: Option<&str>,
    radius_miles: Option<f64>,
    now: NaiveDateTime,
) -> String {
    let bucket = time_of_day(now.hour());
    let time_string = now.format("%-I:%M %p").to_string();

    let place = city.filter(|c| !c.is_empty()).unwrap_or("your area");
    let location = format!(
        "Location: {place} ({:.4}, {:.4})",
        ctx.latitude, ctx.longitude
    );

    let mut parts = vec![format!("Current context: {bucket} ({time_string})")];
    if let Some(weather) = weather {
        parts.push(format!("{}°F", weather.temp_f.round()));
        parts.push(weather.description.clone());
    }
    parts.push(location);

    if let Some(radius) = radius_miles.filter(|r| *r != 0.0) {
        // Strong phrasing keeps the model from wandering past the radius
        let plural = if radius != 1.0 { "s" } else { "" };
        parts.push(format!(
            "Strictly limit results to within {} mile{plural}",
            format_radius(radius)
        ));
    }

    parts.join(", ")
}
