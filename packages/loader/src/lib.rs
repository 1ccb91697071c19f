#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Housing dataset loading.
//!
//! Reads the flat housing-statistics file (one row per ZIP code per year)
//! into a [`RawTable`], then [`normalize`]s it into
//! [`HousingRecord`]s with canonical field names and zero-padded ZIP codes.
//! Also provides the narrower ZIP-level loader used by the map view, which
//! restricts one metro's rows to an income ceiling.

pub mod normalize;
pub mod progress;
pub mod raw;

use std::path::Path;
use std::sync::Arc;

use afford_map_housing_models::HousingRecord;
use thiserror::Error;

pub use normalize::{Column, normalize, normalize_with_progress};
pub use progress::{NullProgress, ProgressCallback};
pub use raw::RawTable;

/// Errors that can occur while loading the housing dataset.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A required column is missing from the source table.
    #[error("Schema error: required column '{column}' is missing")]
    Schema {
        /// Canonical name of the missing column.
        column: String,
    },

    /// Reading the source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads and normalizes the housing CSV at `path`.
///
/// # Errors
///
/// Returns [`LoaderError`] if the file cannot be read or lacks a required
/// column.
pub fn load_housing_data(
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<HousingRecord>, LoaderError> {
    log::info!("Loading housing data from {}", path.display());
    progress.set_message(format!("reading {}", path.display()));

    let table = RawTable::from_path(path)?;
    let records = normalize_with_progress(&table, progress.as_ref())?;

    log::info!(
        "Loaded {} housing records ({} raw rows)",
        records.len(),
        table.len()
    );
    Ok(records)
}

/// Returns the rows of one metro whose per-capita income does not exceed
/// `ceiling`, in input order.
///
/// Rows with no income figure are excluded, since they cannot be shown to
/// satisfy the ceiling.
#[must_use]
pub fn load_city_zip_data(
    records: &[HousingRecord],
    city_code: &str,
    ceiling: f64,
) -> Vec<HousingRecord> {
    let rows: Vec<HousingRecord> = records
        .iter()
        .filter(|r| r.city_code == city_code)
        .filter(|r| r.per_capita_income.is_some_and(|income| income <= ceiling))
        .cloned()
        .collect();

    log::debug!(
        "{city_code}: {} ZIP rows at or below income {ceiling}",
        rows.len()
    );
    rows
}

#[cfg(test)]
mod tests {
    use afford_map_housing_models::ZipCode;

    use super::*;

    fn record(zip: &str, city: &str, income: Option<f64>) -> HousingRecord {
        HousingRecord {
            zip_code: ZipCode::parse(zip).unwrap(),
            year: 2021,
            city_code: city.to_string(),
            city_full_name: format!("{city} Metro Area"),
            median_sale_price: Some(300_000.0),
            per_capita_income: income,
            median_rent: None,
        }
    }

    #[test]
    fn city_zip_loader_filters_city_and_income() {
        let records = vec![
            record("30301", "ATL", Some(50_000.0)),
            record("02134", "BOS", Some(40_000.0)),
            record("30302", "ATL", Some(90_000.0)),
            record("30303", "ATL", Some(90_001.0)),
            record("30304", "ATL", None),
        ];
        let rows = load_city_zip_data(&records, "ATL", 90_000.0);
        let zips: Vec<&str> = rows.iter().map(|r| r.zip_code.as_str()).collect();
        assert_eq!(zips, ["30301", "30302"]);
    }

    #[test]
    fn city_zip_loader_empty_when_nothing_survives() {
        let records = vec![record("30301", "ATL", Some(50_000.0))];
        assert!(load_city_zip_data(&records, "ATL", 10_000.0).is_empty());
        assert!(load_city_zip_data(&records, "BOS", 1e9).is_empty());
    }
}
