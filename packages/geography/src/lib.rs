#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! ZIP code geography for the affordability map.
//!
//! Reads per-metro ZCTA boundary files, resolves a representative point for
//! each ZIP code (from boundary centroids or the Census gazetteer), and
//! turns housing records into [`ZipMapRow`]s ready for a choropleth layer.
//!
//! [`ZipMapRow`]: afford_map_geography_models::ZipMapRow

pub mod cache;
pub mod enrich;
pub mod locator;
pub mod shapes;

use thiserror::Error;

/// Errors that can occur during geography operations.
#[derive(Debug, Error)]
pub enum GeographyError {
    /// Reading a shape or gazetteer file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A shape file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The gazetteer file could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A shape file parsed but is not usable.
    #[error("Invalid shapes: {message}")]
    InvalidShapes {
        /// Description of what went wrong.
        message: String,
    },
}
