//! Application state: the mirror of saved locations, the current selection
//! and the weather attached to each of them.
//!
//! All mutation goes through the transitions on [`FavouritesApp`]. The store
//! stays the source of truth; the mirror only changes after the store has
//! accepted a write.

use futures_util::future::join_all;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::{
    AppError, Coordinates, LocationStore, LocationView, SavedLocation, WeatherProvider,
    WeatherState,
};

#[derive(Debug)]
pub struct FavouritesApp {
    store: Box<dyn LocationStore>,
    provider: Box<dyn WeatherProvider>,
    locations: Vec<SavedLocation>,
    weather: HashMap<i64, WeatherState>,
    selection: Option<Coordinates>,
    preview: WeatherState,
}

impl FavouritesApp {
    /// The store is expected to be initialized already.
    pub fn new(store: Box<dyn LocationStore>, provider: Box<dyn WeatherProvider>) -> Self {
        Self {
            store,
            provider,
            locations: Vec::new(),
            weather: HashMap::new(),
            selection: None,
            preview: WeatherState::Pending,
        }
    }

    /// Replace the mirror with the store's current contents and fetch
    /// weather for every record.
    pub async fn load(&mut self) -> Result<(), AppError> {
        let locations = self.store.list_all().await?;

        self.weather = locations.iter().map(|l| (l.id, WeatherState::Pending)).collect();
        self.locations = locations;
        debug!(count = self.locations.len(), "loaded saved locations");

        self.refresh_weather().await;
        Ok(())
    }

    /// Select a point and fetch its weather preview. The store is not touched.
    pub async fn select(&mut self, coordinates: Coordinates) -> &WeatherState {
        self.selection = Some(coordinates);
        self.preview = match self.provider.fetch(coordinates).await {
            Ok(snapshot) => WeatherState::Ready(snapshot),
            Err(err) => {
                warn!(error = %err, "weather preview failed");
                WeatherState::Failed(err.to_string())
            }
        };

        &self.preview
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.preview = WeatherState::Pending;
    }

    /// Persist the selected point.
    ///
    /// Without a label the preview's place name is used, or the coordinates
    /// when no usable preview exists. A ready preview becomes the new record's
    /// weather; otherwise the record's weather is fetched.
    pub async fn save(&mut self, label: Option<String>) -> Result<SavedLocation, AppError> {
        let coordinates = self
            .selection
            .ok_or_else(|| AppError::Validation("No location selected to save.".to_string()))?;

        let label = label
            .filter(|l| !l.trim().is_empty())
            .or_else(|| {
                self.preview
                    .snapshot()
                    .map(|s| s.place_name.clone())
                    .filter(|name| !name.is_empty())
            })
            .unwrap_or_else(|| coordinates.short_label());

        let id = self.store.insert(&label, coordinates).await?;

        let location = SavedLocation {
            id,
            label,
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        };

        self.locations.push(location.clone());

        let weather = match &self.preview {
            WeatherState::Ready(snapshot) => WeatherState::Ready(snapshot.clone()),
            _ => {
                self.weather.insert(id, WeatherState::Pending);
                lookup(self.provider.as_ref(), id, coordinates).await.1
            }
        };
        self.apply_weather(id, weather);

        Ok(location)
    }

    /// Delete a saved location. The mirror only changes once the store agrees.
    pub async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        self.store.delete(id).await?;

        self.locations.retain(|l| l.id != id);
        self.weather.remove(&id);
        Ok(())
    }

    /// Fetch weather for every mirrored location concurrently.
    ///
    /// Each lookup settles its own record; a failure only marks that record.
    pub async fn refresh_weather(&mut self) {
        let targets: Vec<(i64, Coordinates)> =
            self.locations.iter().map(|l| (l.id, l.coordinates())).collect();

        for (id, _) in &targets {
            self.weather.insert(*id, WeatherState::Pending);
        }

        let provider = self.provider.as_ref();
        let lookups =
            targets.into_iter().map(|(id, coordinates)| lookup(provider, id, coordinates));

        let results = join_all(lookups).await;
        for (id, state) in results {
            self.apply_weather(id, state);
        }
    }

    /// Record a lookup outcome. Results for locations no longer mirrored are dropped.
    pub fn apply_weather(&mut self, id: i64, state: WeatherState) -> bool {
        if !self.locations.iter().any(|l| l.id == id) {
            debug!(id, "discarding weather for removed location");
            return false;
        }

        self.weather.insert(id, state);
        true
    }

    pub fn selection(&self) -> Option<Coordinates> {
        self.selection
    }

    pub fn preview(&self) -> Option<(Coordinates, &WeatherState)> {
        self.selection.map(|c| (c, &self.preview))
    }

    pub fn locations(&self) -> &[SavedLocation] {
        &self.locations
    }

    pub fn weather_for(&self, id: i64) -> Option<&WeatherState> {
        self.weather.get(&id)
    }

    /// Saved locations merged with their weather, in mirror order.
    pub fn views(&self) -> Vec<LocationView> {
        self.locations
            .iter()
            .map(|location| LocationView {
                location: location.clone(),
                weather: self.weather.get(&location.id).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

async fn lookup(
    provider: &dyn WeatherProvider,
    id: i64,
    coordinates: Coordinates,
) -> (i64, WeatherState) {
    let state = match provider.fetch(coordinates).await {
        Ok(snapshot) => WeatherState::Ready(snapshot),
        Err(err) => {
            warn!(id, error = %err, "weather lookup failed");
            WeatherState::Failed(err.to_string())
        }
    };
    (id, state)
}
