//! Maps source headers onto canonical columns and builds
//! [`HousingRecord`]s.
//!
//! The housing files in circulation disagree on spelling
//! (`"Median Rent"` vs `median_rent`, `zipcode` vs `zip_code`, `city` vs
//! `city_geojson_code`). Headers are compared after lowercasing and folding
//! spaces and hyphens to underscores, then looked up in an alias table.

use std::collections::BTreeMap;

use afford_map_housing_models::{HousingRecord, ZipCode};
use strum_macros::{AsRefStr, Display};

use crate::progress::ProgressCallback;
use crate::raw::{RawTable, cell};
use crate::LoaderError;

/// A canonical column of the housing dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    /// ZIP code (numeric or string).
    ZipCode,
    /// Observation year.
    Year,
    /// Short metro identifier.
    CityCode,
    /// Metro display name.
    CityFullName,
    /// Median sale price.
    MedianSalePrice,
    /// Per-capita income.
    PerCapitaIncome,
    /// Median rent.
    MedianRent,
}

impl Column {
    /// Resolves a raw header to a canonical column, if recognised.
    #[must_use]
    pub fn from_header(header: &str) -> Option<Self> {
        let key: String = header
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match key.as_str() {
            "zipcode" | "zip_code" | "zip" | "zcta" => Some(Self::ZipCode),
            "year" => Some(Self::Year),
            "city" | "city_code" | "city_geojson_code" | "metro" => Some(Self::CityCode),
            "city_full" | "city_full_name" => Some(Self::CityFullName),
            "median_sale_price" => Some(Self::MedianSalePrice),
            "per_capita_income" => Some(Self::PerCapitaIncome),
            "median_rent" => Some(Self::MedianRent),
            _ => None,
        }
    }
}

/// Positions of the canonical columns within a [`RawTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: BTreeMap<Column, usize>,
}

impl ColumnMap {
    /// Builds the map for a header row. When two headers alias the same
    /// column, the first one wins.
    #[must_use]
    pub fn from_headers(headers: &[String]) -> Self {
        let mut indices = BTreeMap::new();
        for (i, header) in headers.iter().enumerate() {
            if let Some(column) = Column::from_header(header) {
                indices.entry(column).or_insert(i);
            }
        }
        Self { indices }
    }

    /// Returns the index of `column`, if present.
    #[must_use]
    pub fn get(&self, column: Column) -> Option<usize> {
        self.indices.get(&column).copied()
    }

    /// Returns the index of `column` or a schema error naming it.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Schema`] if the column is absent.
    pub fn require(&self, column: Column) -> Result<usize, LoaderError> {
        self.get(column).ok_or_else(|| LoaderError::Schema {
            column: column.to_string(),
        })
    }
}

/// Parses a currency-like cell (`"$1,250.00"`, `"600000"`). Non-finite and
/// unparseable values become `None`.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parses a year cell, accepting float renderings like `"2020.0"`.
#[must_use]
pub fn parse_year(raw: &str) -> Option<i32> {
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(value as i32)
}

/// Converts a raw table into housing records.
///
/// # Errors
///
/// Returns [`LoaderError::Schema`] if the city, ZIP, or year column is
/// missing. Per-row problems never fail the load: unparseable amounts
/// become `None`, and rows without a usable ZIP, year, or city are skipped.
pub fn normalize(table: &RawTable) -> Result<Vec<HousingRecord>, LoaderError> {
    normalize_with_progress(table, &crate::progress::NullProgress)
}

/// Same as [`normalize`], reporting one progress tick per row.
///
/// # Errors
///
/// Returns [`LoaderError::Schema`] if a required column is missing.
pub fn normalize_with_progress(
    table: &RawTable,
    progress: &dyn ProgressCallback,
) -> Result<Vec<HousingRecord>, LoaderError> {
    let columns = ColumnMap::from_headers(table.headers());

    let city_idx = columns.require(Column::CityCode)?;
    let zip_idx = columns.require(Column::ZipCode)?;
    let year_idx = columns.require(Column::Year)?;
    let full_name_idx = columns.get(Column::CityFullName);
    let price_idx = columns.get(Column::MedianSalePrice);
    let income_idx = columns.get(Column::PerCapitaIncome);
    let rent_idx = columns.get(Column::MedianRent);

    let amount = |row: &[String], idx: Option<usize>| {
        let raw = idx.and_then(|i| cell(row, i))?;
        let parsed = parse_amount(raw);
        if parsed.is_none() {
            log::debug!("Unparseable amount '{raw}' treated as missing");
        }
        parsed
    };

    progress.set_total(table.len() as u64);

    let mut records = Vec::with_capacity(table.len());
    let mut skipped = 0u64;

    for (line, row) in table.rows().iter().enumerate() {
        progress.inc(1);

        let Some(city_code) = cell(row, city_idx) else {
            log::warn!("Row {}: missing city, skipping", line + 1);
            skipped += 1;
            continue;
        };
        let Some(zip_code) = cell(row, zip_idx).and_then(ZipCode::parse) else {
            log::warn!("Row {}: missing or invalid ZIP, skipping", line + 1);
            skipped += 1;
            continue;
        };
        let Some(year) = cell(row, year_idx).and_then(parse_year) else {
            log::warn!("Row {}: missing or invalid year, skipping", line + 1);
            skipped += 1;
            continue;
        };

        let city_full_name = full_name_idx
            .and_then(|i| cell(row, i))
            .map_or_else(|| default_full_name(city_code), str::to_owned);

        records.push(HousingRecord {
            zip_code,
            year,
            city_code: city_code.to_owned(),
            city_full_name,
            median_sale_price: amount(row, price_idx),
            per_capita_income: amount(row, income_idx),
            median_rent: amount(row, rent_idx),
        });
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} malformed rows");
    }
    progress.finish(format!("normalized {} rows", records.len()));

    Ok(records)
}

/// Display name used when the source has no full metro name.
#[must_use]
pub fn default_full_name(city_code: &str) -> String {
    format!("{city_code} Metro Area")
}
