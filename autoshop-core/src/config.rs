//! Configuration: where the database lives and how the id sequences are
//! seeded. Stored as YAML in the platform config directory; a missing file
//! means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ids::IdSeeds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Path to the SQLite database file
    pub database: PathBuf,
    /// Seed values for the id sequences, applied when the database is created
    pub seeds: IdSeeds,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            seeds: IdSeeds::default(),
        }
    }
}

/// Default config file location: `<config dir>/autoshop/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autoshop")
        .join("config.yaml")
}

/// Default database location: `<data dir>/autoshop/autoshop.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autoshop")
        .join("autoshop.db")
}

impl ShopConfig {
    /// Loads the configuration from `path`. A file that does not exist is
    /// not an error; it yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Writes the configuration as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = ShopConfig::load(Path::new("/nonexistent/autoshop/config.yaml")).unwrap();
        assert_eq!(config, ShopConfig::default());
        assert_eq!(config.seeds.request, 30000);
    }

    #[test]
    fn round_trips_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = ShopConfig::default();
        config.database = PathBuf::from("/var/lib/autoshop/shop.db");
        config.seeds.mechanic = 500;
        config.save(&path).unwrap();

        let loaded = ShopConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "database: shop.db\n").unwrap();

        let loaded = ShopConfig::load(&path).unwrap();
        assert_eq!(loaded.database, PathBuf::from("shop.db"));
        assert_eq!(loaded.seeds, IdSeeds::default());
    }
}
