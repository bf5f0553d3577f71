//! Core library for the `favourites` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather lookup against OpenWeather
//! - The SQLite store of saved locations
//! - The application state tying both together
//!
//! It is used by `favourites-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod store;

pub use app::FavouritesApp;
pub use config::{Config, OpenWeatherConfig};
pub use error::{AppError, StoreError, WeatherError};
pub use model::{Coordinates, LocationView, SavedLocation, WeatherSnapshot, WeatherState};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use store::{LocationStore, SqliteLocationStore};
