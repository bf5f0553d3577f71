use crate::{Config, Coordinates, WeatherError, WeatherSnapshot, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current weather at `coordinates`. One request per call, no caching.
    async fn fetch(&self, coordinates: Coordinates) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the OpenWeather provider from config.
///
/// A missing API key is not an error here: every lookup made through the
/// returned provider fails instead, so saved locations can still be listed.
pub fn provider_from_config(config: &Config) -> Box<dyn WeatherProvider> {
    let mut provider = OpenWeatherProvider::new(config.api_key());

    if let Some(base_url) = config.openweather.base_url.as_deref() {
        provider = provider.with_base_url(base_url);
    }

    Box::new(provider)
}
