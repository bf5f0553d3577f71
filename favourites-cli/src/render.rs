use chrono::Local;
use favourites_core::{Coordinates, LocationView, WeatherSnapshot, WeatherState};
use std::fmt::Write;

/// Weather box for the selected point.
pub fn preview(coordinates: Coordinates, state: &WeatherState) -> String {
    let mut out = format!("Selected location: {}\n", coordinates.short_label());

    match state {
        WeatherState::Ready(snapshot) => {
            let _ = writeln!(out, "  Location: {}", snapshot.place_name);
            push_readings(&mut out, snapshot);
            let _ = write!(
                out,
                "  Observed: {}",
                snapshot.observed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }
        WeatherState::Pending => out.push_str("  Weather: loading..."),
        WeatherState::Failed(reason) => {
            let _ = write!(out, "  Weather unavailable: {reason}");
        }
    }

    out
}

/// Favourites list, one block per saved location.
pub fn list(views: &[LocationView]) -> String {
    if views.is_empty() {
        return "No saved locations yet. Add one with `favourites save --lat <LAT> --lon <LON>`."
            .to_string();
    }

    let blocks: Vec<String> = views.iter().map(list_item).collect();
    blocks.join("\n\n")
}

fn list_item(view: &LocationView) -> String {
    let location = &view.location;
    let mut out = format!(
        "[{}] {} ({})\n",
        location.id,
        location.label,
        location.coordinates().short_label()
    );

    match &view.weather {
        WeatherState::Ready(snapshot) => {
            let _ = writeln!(out, "  {}", snapshot.place_name);
            let _ = writeln!(out, "  Weather: {} ({})", description_or_na(snapshot), snapshot.condition_icon_code);
            push_readings(&mut out, snapshot);
        }
        WeatherState::Pending => out.push_str("  Weather: N/A\n"),
        WeatherState::Failed(reason) => {
            let _ = writeln!(out, "  Weather: N/A (unavailable: {})", first_line(reason));
        }
    }

    out.trim_end().to_string()
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn push_readings(out: &mut String, snapshot: &WeatherSnapshot) {
    let _ = writeln!(out, "  Temperature: {}", format_temperature(snapshot.temperature_celsius));
    let _ = writeln!(out, "  Wind Speed: {}", format_wind(snapshot.wind_speed_mps));
}

fn description_or_na(snapshot: &WeatherSnapshot) -> &str {
    if snapshot.description.is_empty() { "N/A" } else { &snapshot.description }
}

fn format_temperature(celsius: f64) -> String {
    // Avoid printing "-0°C" for small negatives.
    let rounded = celsius.round();
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}°C")
}

fn format_wind(mps: f64) -> String {
    format!("{mps:.1} m/s")
}
