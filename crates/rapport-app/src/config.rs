//! Rapport configuration
//!
//! Loaded from an optional TOML file. Every field has a default, so a
//! missing file (or a file naming only some fields) is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Geocode cache file name under the data directory.
pub const GEOCODE_CACHE_FILE: &str = "geocode-cache-v2.json";

/// Affinity store file name under the data directory.
pub const AFFINITY_FILE: &str = "affinities.json";

/// Default geocode cache capacity.
pub const DEFAULT_GEOCODE_CACHE_MAX_SIZE: usize = 2000;

/// Default calendar sync window, in days either side of now.
pub const DEFAULT_CALENDAR_WINDOW_DAYS: i64 = 365;

/// Default span, in degrees, the map zooms in to when focusing a coordinate.
pub const DEFAULT_FOCUSED_SPAN_DELTA: f64 = 0.02;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`RapportConfig`].
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RapportConfig {
    /// Directory holding the geocode cache and affinity store
    pub data_dir: PathBuf,
    /// Maximum number of geocode cache entries
    pub geocode_cache_max_size: usize,
    /// Minimum spacing between outbound geocode requests
    pub geocode_min_interval_ms: u64,
    /// Calendar sync window, in days either side of now
    pub calendar_window_days: i64,
    /// Span the map zooms in to when focusing a coordinate
    pub focused_span_delta: f64,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for RapportConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            geocode_cache_max_size: DEFAULT_GEOCODE_CACHE_MAX_SIZE,
            geocode_min_interval_ms: rapport_geocoder::DEFAULT_MIN_INTERVAL_MS,
            calendar_window_days: DEFAULT_CALENDAR_WINDOW_DAYS,
            focused_span_delta: DEFAULT_FOCUSED_SPAN_DELTA,
            log_filter: "info".to_string(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rapport")
}

impl RapportConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse TOML text.
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Geocode cache file.
    pub fn geocode_cache_path(&self) -> PathBuf {
        self.data_dir.join(GEOCODE_CACHE_FILE)
    }

    /// Affinity store file.
    pub fn affinity_path(&self) -> PathBuf {
        self.data_dir.join(AFFINITY_FILE)
    }
}
