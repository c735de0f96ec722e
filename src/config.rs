use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{DEFAULT_MATCH_RADIUS_MILES, DEFAULT_NEARBY_RADIUS_MILES};
use crate::error::{Result, SchoolDataError};

/// Config file read when no explicit path is given; it may be absent
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Overrides `paths.base_dir`
pub const BASE_DIR_ENV: &str = "SCHOOL_MAPPER_BASE_DIR";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub enrich: EnrichConfig,
    pub nearby: NearbyConfig,
}

/// Data file locations; relative entries resolve against `base_dir`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub base_dir: PathBuf,
    pub schools_geojson: PathBuf,
    pub simplified_geojson: PathBuf,
    pub school_grades_csv: PathBuf,
    pub enriched_geojson: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            schools_geojson: PathBuf::from("data/us-private-schools.geojson"),
            simplified_geojson: PathBuf::from("data/us-private-schools-simplified.geojson"),
            school_grades_csv: PathBuf::from("data/nearby_schools_with_grades.csv"),
            enriched_geojson: PathBuf::from("data/us-private-schools-updated.geojson"),
        }
    }
}

impl PathsConfig {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn schools_geojson(&self) -> PathBuf {
        self.resolve(&self.schools_geojson)
    }

    pub fn simplified_geojson(&self) -> PathBuf {
        self.resolve(&self.simplified_geojson)
    }

    pub fn school_grades_csv(&self) -> PathBuf {
        self.resolve(&self.school_grades_csv)
    }

    pub fn enriched_geojson(&self) -> PathBuf {
        self.resolve(&self.enriched_geojson)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Same-name schools must be strictly closer than this to match
    pub match_radius_miles: f64,
    /// Copy the enrich input to `<name>.geojson.bak` once
    pub create_backup: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            match_radius_miles: DEFAULT_MATCH_RADIUS_MILES,
            create_backup: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NearbyConfig {
    pub radius_miles: f64,
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            radius_miles: DEFAULT_NEARBY_RADIUS_MILES,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `config.toml` in the
    /// working directory is used when present and defaults otherwise. The
    /// `SCHOOL_MAPPER_BASE_DIR` environment variable wins over the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?,
            None => {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                Self::default()
            }
        };

        let config = config.with_base_dir_override(std::env::var(BASE_DIR_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchoolDataError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Replace `paths.base_dir` when `base_dir` is a non-empty value
    pub fn with_base_dir_override(mut self, base_dir: Option<String>) -> Self {
        if let Some(dir) = base_dir.filter(|d| !d.trim().is_empty()) {
            self.paths.base_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let radius = self.enrich.match_radius_miles;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SchoolDataError::Config(format!(
                "enrich.match_radius_miles must be a positive number, got {}",
                radius
            )));
        }
        let radius = self.nearby.radius_miles;
        if !radius.is_finite() || radius < 0.0 {
            return Err(SchoolDataError::Config(format!(
                "nearby.radius_miles must be zero or more, got {}",
                radius
            )));
        }
        Ok(())
    }
}
