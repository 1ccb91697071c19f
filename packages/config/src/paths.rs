//! Canonical locations of the input data files.
//!
//! Each path can be overridden with an environment variable; otherwise it
//! resolves under the project root's `data/` directory.

use std::path::{Path, PathBuf};

/// Environment variable overriding the housing CSV location.
pub const DATA_FILE_ENV: &str = "AFFORD_MAP_DATA";

/// Environment variable overriding the per-city `GeoJSON` directory.
pub const SHAPES_DIR_ENV: &str = "AFFORD_MAP_SHAPES_DIR";

/// Environment variable overriding the ZCTA gazetteer location.
pub const GAZETTEER_ENV: &str = "AFFORD_MAP_GAZETTEER";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`, falling back to the
/// current directory.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Resolved input locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Housing statistics CSV (one row per ZIP per year).
    pub data_file: PathBuf,
    /// Directory of `<CITY>.geojson` ZCTA shape files.
    pub shapes_dir: PathBuf,
    /// Census ZCTA gazetteer (tab-delimited).
    pub gazetteer: PathBuf,
}

impl DataPaths {
    /// Resolves paths from the environment, defaulting to `data/`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolves paths using `lookup` for overrides.
    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data = data_dir();
        let pick = |key: &str, default: PathBuf| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map_or(default, PathBuf::from)
        };

        Self {
            data_file: pick(DATA_FILE_ENV, data.join("HouseTS.csv")),
            shapes_dir: pick(SHAPES_DIR_ENV, data.join("city_geojson")),
            gazetteer: pick(GAZETTEER_ENV, data.join("zcta_gazetteer.txt")),
        }
    }
}
