// ── On-disk location cache ──
//
// Last-known locations as a single JSON document. Used to populate the
// list at cold start; a refresh overwrites it wholesale.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use clouddoor_core::{Location, LocationCache};

use crate::ConfigError;

/// Contents of `locations.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLocations {
    pub saved_at: DateTime<Utc>,
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone)]
pub struct FileLocationCache {
    path: PathBuf,
}

impl FileLocationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache at the platform cache directory.
    pub fn at_default_path() -> Result<Self, ConfigError> {
        Ok(Self::new(crate::cache_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<CachedLocations, ConfigError> {
        let raw = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Write `locations` through a temporary sibling, then rename over the
    /// cache file so readers never observe a partial document.
    pub fn save(&self, locations: &[Location]) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let doc = CachedLocations {
            saved_at: Utc::now(),
            locations: locations.to_vec(),
        };
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&doc)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LocationCache for FileLocationCache {
    fn cached_locations(&self) -> Option<Vec<Location>> {
        match self.load() {
            Ok(doc) => Some(doc.locations),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no usable location cache");
                None
            }
        }
    }

    fn store_locations(&self, locations: &[Location]) {
        if let Err(e) = self.save(locations) {
            warn!(path = %self.path.display(), error = %e, "failed to write location cache");
        } else {
            debug!(count = locations.len(), "location cache updated");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use clouddoor_core::Geolocation;

    fn office() -> Location {
        Location {
            id: "loc-1".into(),
            name: "Office".into(),
            geolocations: vec![Geolocation {
                id: "geo-1".into(),
                name: "Main entrance".into(),
                latitude: 46.051_4,
                longitude: 14.506,
                radius: 100,
            }],
        }
    }

    #[test]
    fn absent_file_reads_as_no_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLocationCache::new(dir.path().join("locations.json"));
        assert_eq!(cache.cached_locations(), None);
    }

    #[test]
    fn stores_and_reads_back_locations() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLocationCache::new(dir.path().join("sub").join("locations.json"));

        cache.store_locations(&[office()]);

        assert_eq!(cache.cached_locations(), Some(vec![office()]));
        let doc = cache.load().unwrap();
        assert!(doc.saved_at <= Utc::now());
        assert!(!cache.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_reads_as_no_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let cache = FileLocationCache::new(&path);
        assert_eq!(cache.cached_locations(), None);
        assert!(matches!(cache.load(), Err(ConfigError::CacheFormat(_))));
    }

    #[test]
    fn write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        // Parent is a regular file, so the directory cannot be created.
        let cache = FileLocationCache::new(blocker.join("locations.json"));
        cache.store_locations(&[office()]);
        assert_eq!(cache.cached_locations(), None);
    }

    #[test]
    fn empty_set_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLocationCache::new(dir.path().join("locations.json"));
        cache.store_locations(&[office()]);
        cache.store_locations(&[]);
        assert_eq!(cache.cached_locations(), Some(Vec::new()));
    }
}
