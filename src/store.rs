//! Reads and writes the routes file.
//!
//! The whole book is rewritten on every change, last writer wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::model::{Route, RouteBook, Stop, default_route_book};
use crate::utils::is_schedule_time;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("couldn't access routes file {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("routes file {} isn't valid JSON", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("couldn't serialize the routes")]
    Serialize(#[from] serde_json::Error),

    #[error("a route needs a name")]
    EmptyRouteName,

    #[error("route {0} already exists")]
    DuplicateRoute(String),

    #[error("no route named {0}")]
    UnknownRoute(String),
}

#[derive(Debug)]
pub struct RouteStore {
    path: PathBuf,
    routes: RouteBook,
}

impl RouteStore {
    /// Loads the routes file, or the built in test route if there's no file yet.
    #[tracing::instrument(err)]
    pub fn open(path: impl AsRef<Path> + std::fmt::Debug) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let routes = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no routes file yet, starting from the test route");
                default_route_book()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self { path, routes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn routes(&self) -> &RouteBook {
        &self.routes
    }

    pub fn route_names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn stops(&self, route: &str) -> Option<&[Stop]> {
        self.routes.get(route).map(Vec::as_slice)
    }

    pub fn route(&self, name: &str) -> Option<Route> {
        self.routes
            .get(name)
            .map(|stops| Route::new(name, stops.clone()))
    }

    /// Creates an empty route and saves.
    #[tracing::instrument(err, skip(self))]
    pub fn add_route(&mut self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyRouteName);
        }
        if self.routes.contains_key(name) {
            return Err(StoreError::DuplicateRoute(name.to_string()));
        }

        self.routes.insert(name.to_string(), Vec::new());
        if let Err(e) = self.save() {
            self.routes.remove(name);
            return Err(e);
        }

        info!("created route {name}");
        Ok(())
    }

    /// Appends a stop to the end of a route and saves.
    #[tracing::instrument(err, skip(self))]
    pub fn add_stop(&mut self, route: &str, stop: Stop) -> Result<(), StoreError> {
        if !is_schedule_time(&stop.scheduled_time) {
            warn!(
                "stop {} has scheduled time {:?} which isn't HH:MM",
                stop.name, stop.scheduled_time
            );
        }

        let stops = self
            .routes
            .get_mut(route)
            .ok_or_else(|| StoreError::UnknownRoute(route.to_string()))?;
        stops.push(stop);
        let count = stops.len();

        if let Err(e) = self.save() {
            if let Some(stops) = self.routes.get_mut(route) {
                stops.pop();
            }
            return Err(e);
        }

        info!("route {route} now has {count} stops");
        Ok(())
    }

    fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.routes)?;

        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use super::{RouteStore, StoreError};
    use crate::model::Stop;

    /// A routes file path no other test uses. Removes stale leftovers.
    pub(crate) fn scratch_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "bus_progress_{}_{}.json",
            name,
            std::process::id()
        ));
        _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_missing_file_seeds_test_route() -> Result<(), anyhow::Error> {
        let path = scratch_file("seed");

        let store = RouteStore::open(&path)?;

        assert_eq!(store.route_names().collect::<Vec<_>>(), vec!["Ligne Test"]);
        assert_eq!(store.stops("Ligne Test").map(|s| s.len()), Some(3));
        assert!(!path.exists());

        Ok(())
    }

    #[test]
    fn test_reads_legacy_file() -> Result<(), anyhow::Error> {
        let path = scratch_file("legacy");
        std::fs::write(
            &path,
            r#"{"Ligne 1": [{"nom": "Gare", "lat": 47.63, "lon": 7.25, "h": "09:00"}], "Vide": []}"#,
        )?;

        let store = RouteStore::open(&path)?;

        assert_eq!(
            store.stops("Ligne 1"),
            Some(&[Stop::new("Gare", 47.63, 7.25, "09:00")][..])
        );
        assert_eq!(store.stops("Vide"), Some(&[][..]));

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn test_broken_file_is_an_error() -> Result<(), anyhow::Error> {
        let path = scratch_file("broken");
        std::fs::write(&path, "{ not json")?;

        assert!(matches!(
            RouteStore::open(&path),
            Err(StoreError::Parse { .. })
        ));

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn test_add_route_and_stop_persist() -> Result<(), anyhow::Error> {
        let path = scratch_file("persist");
        let mut store = RouteStore::open(&path)?;

        store.add_route("Ligne 2")?;
        store.add_stop("Ligne 2", Stop::new("Mairie", 47.5, 7.1, "10:00"))?;
        store.add_stop("Ligne 2", Stop::new("Piscine", 47.51, 7.11, "whenever"))?;

        let reopened = RouteStore::open(&path)?;
        assert_eq!(reopened.routes(), store.routes());
        let names = reopened
            .stops("Ligne 2")
            .unwrap_or_default()
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Mairie", "Piscine"]);
        assert!(reopened.route_names().any(|n| n == "Ligne Test"));

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn test_rejects_bad_route_names() -> Result<(), anyhow::Error> {
        let path = scratch_file("names");
        let mut store = RouteStore::open(&path)?;

        assert!(matches!(
            store.add_route("   "),
            Err(StoreError::EmptyRouteName)
        ));
        assert!(matches!(
            store.add_route("Ligne Test"),
            Err(StoreError::DuplicateRoute(_))
        ));
        assert!(!path.exists());

        Ok(())
    }

    #[test]
    fn test_failed_write_leaves_book_untouched() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir()
            .join(format!("bus_progress_missing_dir_{}", std::process::id()))
            .join("routes.json");
        let mut store = RouteStore::open(&path)?;
        let before = store.routes().clone();

        assert!(matches!(store.add_route("X"), Err(StoreError::Io { .. })));
        assert!(matches!(store.add_route("X"), Err(StoreError::Io { .. })));
        assert!(
            matches!(
                store.add_stop("Ligne Test", Stop::new("Gare", 47.63, 7.25, "09:00")),
                Err(StoreError::Io { .. })
            )
        );

        assert_eq!(store.routes(), &before);
        assert!(!path.exists());

        Ok(())
    }

    #[test]
    fn test_add_stop_to_unknown_route() -> Result<(), anyhow::Error> {
        let path = scratch_file("unknown");
        let mut store = RouteStore::open(&path)?;

        let res = store.add_stop("Nowhere", Stop::new("X", 0.0, 0.0, "00:00"));

        assert!(matches!(res, Err(StoreError::UnknownRoute(r)) if r == "Nowhere"));
        assert!(!path.exists());

        Ok(())
    }
}
