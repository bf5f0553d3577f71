use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{Coordinates, WeatherError, WeatherSnapshot};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_current(
        &self,
        api_key: &str,
        coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/weather", self.base_url);
        debug!(lat = coordinates.latitude, lon = coordinates.longitude, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(format!("failed to reach OpenWeather: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::Network(format!("failed to read OpenWeather response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(WeatherError::Network(format!(
                "OpenWeather returned status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        parse_current(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

fn parse_current(body: &str) -> Result<WeatherSnapshot, WeatherError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::Parse(format!("invalid current weather JSON: {e}")))?;

    let condition = parsed
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Parse("response contained no weather conditions".to_string()))?;

    let observed_at = parsed
        .dt
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    Ok(WeatherSnapshot {
        place_name: parsed.name,
        temperature_celsius: parsed.main.temp,
        wind_speed_mps: parsed.wind.speed,
        condition_icon_code: condition.icon,
        description: condition.description,
        observed_at,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, coordinates: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(WeatherError::MissingApiKey)?;

        self.fetch_current(api_key, coordinates).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELSINKI: &str = r#"{
        "coord": {"lon": 24.94, "lat": 60.17},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "main": {"temp": -3.42, "feels_like": -8.1, "humidity": 86},
        "wind": {"speed": 4.63, "deg": 190},
        "dt": 1700000000,
        "name": "Helsinki"
    }"#;

    #[test]
    fn parse_current_maps_fields() {
        let snapshot = parse_current(HELSINKI).expect("valid payload");

        assert_eq!(snapshot.place_name, "Helsinki");
        assert_eq!(snapshot.temperature_celsius, -3.42);
        assert_eq!(snapshot.wind_speed_mps, 4.63);
        assert_eq!(snapshot.condition_icon_code, "04d");
        assert_eq!(snapshot.description, "broken clouds");
        assert_eq!(snapshot.observed_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn parse_current_rejects_empty_weather_array() {
        let body = r#"{"name": "X", "main": {"temp": 1.0}, "wind": {"speed": 1.0}, "weather": []}"#;
        let err = parse_current(body).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[test]
    fn parse_current_rejects_missing_main() {
        let body = r#"{"name": "X", "wind": {"speed": 1.0}, "weather": [{"icon": "01d", "description": "clear sky"}]}"#;
        let err = parse_current(body).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(msg) if msg.contains("main")));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "ä".repeat(150);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
    }

    #[tokio::test]
    async fn fetch_without_api_key_fails_before_any_request() {
        let provider = OpenWeatherProvider::new(None).with_base_url("http://127.0.0.1:9");
        let err = provider.fetch(Coordinates::new(60.17, 24.94)).await.unwrap_err();
        assert_eq!(err, WeatherError::MissingApiKey);

        let provider = OpenWeatherProvider::new(Some(String::new()));
        let err = provider.fetch(Coordinates::new(60.17, 24.94)).await.unwrap_err();
        assert_eq!(err, WeatherError::MissingApiKey);
    }

    #[test]
    fn with_base_url_trims_trailing_slash() {
        let provider = OpenWeatherProvider::new(None).with_base_url("http://localhost:1234/");
        assert_eq!(provider.base_url, "http://localhost:1234");
    }
}
