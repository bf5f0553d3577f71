//! Durable storage for saved locations.
//!
//! The store is the single source of truth for favourites. Each public
//! operation is one atomic unit of work; nothing spans calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, params};
use std::{fmt::Debug, fs, path::Path, sync::Arc};
use tracing::debug;

use crate::{Coordinates, SavedLocation, StoreError};

#[async_trait]
pub trait LocationStore: Send + Sync + Debug {
    /// Create the backing table if it is missing. Safe to call on every start.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Persist a new location and return its freshly assigned id.
    async fn insert(&self, label: &str, coordinates: Coordinates) -> Result<i64, StoreError>;

    /// Remove the location with `id`. Unknown ids are not an error.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// All saved locations in insertion order.
    async fn list_all(&self) -> Result<Vec<SavedLocation>, StoreError>;
}

/// SQLite-backed [`LocationStore`].
///
/// The connection lives behind a mutex and every operation runs on the
/// blocking pool holding the lock until it finishes, so mutations never
/// interleave.
#[derive(Debug, Clone)]
pub struct SqliteLocationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLocationStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened location database");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self { conn: Arc::new(Mutex::new(conn)) }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        let result = tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?;

        Ok(result?)
    }
}

fn row_to_location(row: &rusqlite::Row) -> rusqlite::Result<SavedLocation> {
    let label: Option<String> = row.get(1)?;

    Ok(SavedLocation {
        id: row.get(0)?,
        label: label.unwrap_or_default(),
        latitude: row.get(2)?,
        longitude: row.get(3)?,
    })
}

#[async_trait]
impl LocationStore for SqliteLocationStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS locations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    location TEXT,
                    latitude REAL,
                    longitude REAL
                );",
            )
        })
        .await
    }

    async fn insert(&self, label: &str, coordinates: Coordinates) -> Result<i64, StoreError> {
        let label = label.to_string();

        let id = self
            .with_conn(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO locations (location, latitude, longitude) VALUES (?1, ?2, ?3)",
                    params![label, coordinates.latitude, coordinates.longitude],
                )?;
                let id = tx.last_insert_rowid();
                tx.commit()?;
                Ok(id)
            })
            .await?;

        debug!(id, "inserted location");
        Ok(id)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let removed = self
            .with_conn(move |conn| conn.execute("DELETE FROM locations WHERE id = ?1", params![id]))
            .await?;

        debug!(id, removed, "deleted location");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SavedLocation>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, location, latitude, longitude FROM locations ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], row_to_location)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
    }
}
