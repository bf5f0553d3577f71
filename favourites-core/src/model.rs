use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both values are finite and inside the geographic ranges.
    pub fn is_within_range(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Fallback label for a location saved without a name.
    pub fn short_label(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A favourite location persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub id: i64,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl SavedLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Current weather at a point, as reported by the provider. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub place_name: String,
    pub temperature_celsius: f64,
    pub wind_speed_mps: f64,
    pub condition_icon_code: String,
    pub description: String,
    pub observed_at: DateTime<Utc>,
}

/// Weather attached to a saved location or to the current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum WeatherState {
    #[default]
    Pending,
    Ready(WeatherSnapshot),
    Failed(String),
}

impl WeatherState {
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            WeatherState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// A saved location merged with its weather, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub location: SavedLocation,
    pub weather: WeatherState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check_accepts_edges_and_rejects_outliers() {
        assert!(Coordinates::new(90.0, -180.0).is_within_range());
        assert!(Coordinates::new(-90.0, 180.0).is_within_range());
        assert!(!Coordinates::new(90.5, 0.0).is_within_range());
        assert!(!Coordinates::new(0.0, 181.0).is_within_range());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_within_range());
    }

    #[test]
    fn short_label_uses_four_decimals() {
        assert_eq!(Coordinates::new(60.192059, 24.945831).short_label(), "60.1921, 24.9458");
    }

    #[test]
    fn weather_state_serializes_with_status_tag() {
        let json = serde_json::to_value(WeatherState::Failed("boom".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "failed", "data": "boom" }));

        let json = serde_json::to_value(WeatherState::Pending).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "pending" }));
    }
}
