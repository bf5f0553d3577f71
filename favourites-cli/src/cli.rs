use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use favourites_core::{
    Config, Coordinates, FavouritesApp, LocationStore, SqliteLocationStore, provider_from_config,
};
use inquire::Password;
use std::path::PathBuf;
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "favourites", version, about = "Favourite locations with live weather")]
pub struct Cli {
    /// Use this SQLite file instead of the configured one.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Point {
    /// Latitude in degrees, -90..=90.
    #[arg(long, allow_hyphen_values = true, value_parser = parse_degrees)]
    pub lat: f64,

    /// Longitude in degrees, -180..=180.
    #[arg(long, allow_hyphen_values = true, value_parser = parse_degrees)]
    pub lon: f64,
}

impl Point {
    fn coordinates(&self) -> Result<Coordinates> {
        let coordinates = Coordinates::new(self.lat, self.lon);
        if !coordinates.is_within_range() {
            bail!(
                "Coordinates {}, {} are outside latitude -90..=90 / longitude -180..=180",
                self.lat,
                self.lon
            );
        }
        Ok(coordinates)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Preview the weather at a point without saving it.
    Show {
        #[command(flatten)]
        point: Point,
    },

    /// Save a point to the favourites list.
    Save {
        #[command(flatten)]
        point: Point,

        /// Display name; defaults to the place name reported for the point.
        #[arg(long)]
        label: Option<String>,
    },

    /// List saved locations with their current weather.
    List {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Delete a saved location by id.
    Delete {
        id: i64,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        let db = self.db;

        match self.command {
            Command::Configure => configure(&mut config)?,
            Command::Show { point } => {
                let mut app = open_app(&config, db).await?;
                let coordinates = point.coordinates()?;
                let preview = app.select(coordinates).await;
                println!("{}", render::preview(coordinates, preview));
            }
            Command::Save { point, label } => {
                let mut app = open_app(&config, db).await?;
                app.select(point.coordinates()?).await;
                let saved = app.save(label).await?;
                println!("Saved \"{}\" with id {}.", saved.label, saved.id);
            }
            Command::List { json } => {
                let mut app = open_app(&config, db).await?;
                app.load().await?;

                let views = app.views();
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&views)
                            .context("Failed to serialize saved locations")?
                    );
                } else {
                    println!("{}", render::list(&views));
                }
            }
            Command::Delete { id } => {
                let mut app = open_app(&config, db).await?;
                app.load().await?;
                if !app.locations().iter().any(|l| l.id == id) {
                    println!("No saved location with id {id}; nothing to delete.");
                    return Ok(());
                }
                app.delete(id).await?;
                println!("Deleted location {id}.");
            }
        }

        Ok(())
    }
}

fn configure(config: &mut Config) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn open_app(config: &Config, db: Option<PathBuf>) -> Result<FavouritesApp> {
    let path = match db {
        Some(path) => path,
        None => config.database_path()?,
    };

    debug!(path = %path.display(), "using location database");
    let store = SqliteLocationStore::open(&path)
        .with_context(|| format!("Failed to open location database: {}", path.display()))?;
    store
        .initialize()
        .await
        .with_context(|| format!("Failed to initialize location database: {}", path.display()))?;

    Ok(FavouritesApp::new(Box::new(store), provider_from_config(config)))
}

fn parse_degrees(s: &str) -> Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|_| format!("'{s}' is not a number"))?;

    if !value.is_finite() {
        return Err(format!("'{s}' is not a finite number"));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_parse_numbers_only() {
        assert_eq!(parse_degrees("60.17"), Ok(60.17));
        assert_eq!(parse_degrees(" -90 "), Ok(-90.0));
        assert!(parse_degrees("NaN").is_err());
        assert!(parse_degrees("east").is_err());
    }

    #[test]
    fn point_range_is_checked_against_geographic_limits() {
        let edge = Point { lat: -90.0, lon: 180.0 };
        assert_eq!(edge.coordinates().unwrap(), Coordinates::new(-90.0, 180.0));

        assert!(Point { lat: 90.01, lon: 0.0 }.coordinates().is_err());
        assert!(Point { lat: 0.0, lon: -181.0 }.coordinates().is_err());
    }

    #[test]
    fn save_command_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "favourites", "save", "--lat", "-33.87", "--lon", "151.21", "--label", "Sydney",
        ])
        .unwrap();

        match cli.command {
            Command::Save { point, label } => {
                assert_eq!(point.coordinates().unwrap(), Coordinates::new(-33.87, 151.21));
                assert_eq!(label.as_deref(), Some("Sydney"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_db_flag_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["favourites", "list", "--json", "--db", "/tmp/x.db"]).unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Command::List { json: true }));
    }

    #[test]
    fn out_of_range_latitude_is_rejected_before_lookup() {
        let cli = Cli::try_parse_from(["favourites", "show", "--lat", "91", "--lon", "0"]).unwrap();

        match cli.command {
            Command::Show { point } => {
                let err = point.coordinates().unwrap_err();
                assert!(err.to_string().contains("outside"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn non_numeric_latitude_fails_to_parse() {
        let err = Cli::try_parse_from(["favourites", "show", "--lat", "north", "--lon", "0"]);
        assert!(err.is_err());
    }
}
