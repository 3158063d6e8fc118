use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ExploreError, Result};
use crate::model::City;

/// Where each city's trip data lives.
///
/// Stored as a JSON object on disk; every field is optional:
/// ```json
/// {
///   "data_dir": "/srv/bikeshare",
///   "files": { "new york city": "nyc_2017.csv" }
/// }
/// ```
/// Cities missing from `files` fall back to their default file name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub files: BTreeMap<City, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("."),
            files: default_files(),
        }
    }
}

fn default_files() -> BTreeMap<City, String> {
    City::ALL
        .into_iter()
        .map(|c| (c, c.default_file().to_string()))
        .collect()
}

impl Config {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ExploreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = serde_json::from_str(&content)?;
        for (city, file) in default_files() {
            config.files.entry(city).or_insert(file);
        }
        Ok(config)
    }

    /// Builds the effective config: defaults, then the optional file, then the
    /// data directory override.
    pub fn resolve(file: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config = match file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let config = match data_dir {
            Some(dir) => config.with_data_dir(dir),
            None => config,
        };
        debug!(data_dir = %config.data_dir.display(), "Configuration resolved");
        Ok(config)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Full path of the CSV file for `city`.
    pub fn path_for(&self, city: City) -> PathBuf {
        let file = self
            .files
            .get(&city)
            .map(String::as_str)
            .unwrap_or_else(|| city.default_file());
        self.data_dir.join(file)
    }
}
