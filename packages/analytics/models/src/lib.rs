#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result and parameter types for the affordability analytics.
//!
//! These are the rows handed to a presentation layer: metro aggregates for
//! bar charts, and the two history series for time-series charts. All
//! serialize as camelCase JSON.

use afford_map_housing_models::{CategoryLabel, HistoryCategory};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One metro area in one year, aggregated from its ZIP rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityYearAggregate {
    /// Short metro identifier (e.g. "ATL").
    pub city_code: String,
    /// Metro display name.
    pub city_full_name: String,
    /// Year aggregated.
    pub year: i32,
    /// Median of the ZIP-level price-to-income ratios.
    pub price_to_income_ratio: Option<f64>,
    /// Median of the ZIP-level median sale prices.
    pub median_sale_price: Option<f64>,
    /// Median of the ZIP-level per-capita incomes.
    pub per_capita_income: Option<f64>,
    /// Number of distinct ZIP codes contributing.
    pub zip_count: u64,
    /// Whether the ratio is at or below the binary threshold.
    pub is_affordable: bool,
    /// Display category of the aggregate ratio.
    pub affordability_category: CategoryLabel,
    /// Distance from the binary threshold, positive when affordable and
    /// negative otherwise.
    pub threshold_gap: Option<f64>,
}

/// Median city ratio for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedianRatioPoint {
    /// Year.
    pub year: i32,
    /// Median of the metro ratios that year.
    pub median_ratio: f64,
}

/// Share of metros falling in one history tier in one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// Year.
    pub year: i32,
    /// History tier.
    pub category: HistoryCategory,
    /// Percentage of metros (0-100).
    pub percentage: f64,
}

/// Both history series over every year with data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySeries {
    /// One point per year.
    pub median_ratio: Vec<MedianRatioPoint>,
    /// Five rows per year, one per tier.
    pub category_shares: Vec<CategoryShare>,
}

/// Ordering applied to the metro ranking.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
    /// Full metro name, A to Z.
    #[default]
    #[strum(to_string = "name", serialize = "city_name")]
    CityName,
    /// Price-to-income ratio, most affordable first.
    Ratio,
    /// Median sale price, highest first.
    #[strum(to_string = "price", serialize = "median_sale_price")]
    MedianSalePrice,
    /// Per-capita income, highest first.
    #[strum(to_string = "income", serialize = "per_capita_income")]
    PerCapitaIncome,
}

impl SortKey {
    /// Returns all variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CityName,
            Self::Ratio,
            Self::MedianSalePrice,
            Self::PerCapitaIncome,
        ]
    }

    /// Returns the human-readable label shown in pickers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CityName => "City name",
            Self::Ratio => "Price to Income Ratio",
            Self::MedianSalePrice => "Median Sale Price",
            Self::PerCapitaIncome => "Per Capita Income",
        }
    }
}

/// Parameters for building the metro ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityViewParams {
    /// Year to show. Defaults to the latest year in the data.
    pub year: Option<i32>,
    /// Annual income ceiling. When set, only ZIP rows at or below it are
    /// aggregated.
    pub income: Option<f64>,
    /// Ordering of the result.
    pub sort: SortKey,
    /// Restrict to these metro display names.
    pub metros: Option<Vec<String>>,
}

/// Result of building the metro ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityViewResult {
    /// Year shown, or `None` when the data has no years.
    pub year: Option<i32>,
    /// Ranked metros. Empty means "no data".
    pub cities: Vec<CityYearAggregate>,
    /// Description of the view.
    pub description: String,
}

/// The inputs that determine which ZIP map is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewKey {
    /// Selected metro display name.
    pub city: String,
    /// Selected annual income.
    pub income: f64,
}
