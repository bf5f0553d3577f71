use thiserror::Error;

/// Failure of a single weather lookup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WeatherError {
    #[error(
        "No OpenWeather API key configured.\n\
         Hint: run `favourites configure` or set OPENWEATHER_API_KEY."
    )]
    MissingApiKey,

    #[error("Weather provider request failed: {0}")]
    Network(String),

    #[error("Malformed weather provider response: {0}")]
    Parse(String),
}

/// Failure of the location store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Errors surfaced by the application shell.
///
/// Weather failures never appear here: they stay on the affected record as
/// [`WeatherState::Failed`](crate::WeatherState::Failed).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_messages_pass_through() {
        let err = AppError::from(StoreError::Task("worker panicked".into()));
        assert_eq!(err.to_string(), "Storage task failed: worker panicked");

        let err = AppError::Validation("No location selected to save.".into());
        assert_eq!(err.to_string(), "No location selected to save.");
    }
}
