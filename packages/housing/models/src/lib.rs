#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Housing record types and the affordability taxonomy.
//!
//! This crate defines the per-ZIP housing rows shared by every stage of
//! the affordability pipeline, along with the two classification schemes
//! used downstream:
//!
//! - the configurable display bands ([`BandTable`]) that color charts and
//!   label ZIP and metro rows, and
//! - the pinned strict tiers ([`HistoryCategory`]) used only for the
//!   historical category-share series.
//!
//! The two are deliberately separate so that recalibrating the display
//! bands never shifts the historical series.

pub mod bands;
pub mod zip;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use bands::{AffordabilityBand, BandTable, BandTableError, CANONICAL_BANDS};
pub use zip::{InvalidZipError, ZipCode};

/// Default ratio at or below which a metro counts as "affordable" in the
/// binary sense.
///
/// Independent of the lowest display band's upper bound even though both
/// are currently 3.0.
pub const DEFAULT_AFFORDABLE_THRESHOLD: f64 = 3.0;

/// Five ordered affordability tiers, least to most expensive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AffordabilityCategory {
    /// Ratio at or below 3.0 in the canonical table.
    #[serde(rename = "Affordable")]
    #[strum(serialize = "Affordable")]
    Affordable,
    /// Ratio in (3.0, 4.0].
    #[serde(rename = "Moderately Unaffordable")]
    #[strum(serialize = "Moderately Unaffordable")]
    ModeratelyUnaffordable,
    /// Ratio in (4.0, 5.0].
    #[serde(rename = "Seriously Unaffordable")]
    #[strum(serialize = "Seriously Unaffordable")]
    SeriouslyUnaffordable,
    /// Ratio in (5.0, 8.9].
    #[serde(rename = "Severely Unaffordable")]
    #[strum(serialize = "Severely Unaffordable")]
    SeverelyUnaffordable,
    /// Ratio above 8.9.
    #[serde(rename = "Impossibly Unaffordable")]
    #[strum(serialize = "Impossibly Unaffordable")]
    ImpossiblyUnaffordable,
}

impl AffordabilityCategory {
    /// Returns the chart color for this tier as a hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Affordable => "#4CAF50",
            Self::ModeratelyUnaffordable => "#FFC107",
            Self::SeriouslyUnaffordable => "#FF9800",
            Self::SeverelyUnaffordable => "#E57373",
            Self::ImpossiblyUnaffordable => "#B71C1C",
        }
    }

    /// Returns all variants in ascending ratio order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Affordable,
            Self::ModeratelyUnaffordable,
            Self::SeriouslyUnaffordable,
            Self::SeverelyUnaffordable,
            Self::ImpossiblyUnaffordable,
        ]
    }
}

/// Outcome of classifying a single ratio against a [`BandTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryLabel {
    /// The ratio fell inside a band.
    Category(AffordabilityCategory),
    /// The ratio is undefined (missing price or non-positive income).
    NotAvailable,
    /// No band matched. Only reachable with an inconsistent band table.
    Uncategorized,
}

/// Display form of [`CategoryLabel::NotAvailable`].
pub const NOT_AVAILABLE: &str = "N/A";

/// Display form of [`CategoryLabel::Uncategorized`].
pub const UNCATEGORIZED: &str = "Uncategorized";

impl CategoryLabel {
    /// Returns the matched category, if any.
    #[must_use]
    pub const fn category(self) -> Option<AffordabilityCategory> {
        match self {
            Self::Category(category) => Some(category),
            Self::NotAvailable | Self::Uncategorized => None,
        }
    }

    /// Returns the display name (`"Affordable"`, `"N/A"`, ...).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Category(category) => category.as_ref(),
            Self::NotAvailable => NOT_AVAILABLE,
            Self::Uncategorized => UNCATEGORIZED,
        }
    }
}

impl std::fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CategoryLabel> for String {
    fn from(label: CategoryLabel) -> Self {
        label.as_str().to_string()
    }
}

/// Error returned when a string names no known category label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCategoryError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidCategoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown affordability category '{}'", self.value)
    }
}

impl std::error::Error for InvalidCategoryError {}

impl TryFrom<String> for CategoryLabel {
    type Error = InvalidCategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let label = match value.as_str() {
            NOT_AVAILABLE => Some(Self::NotAvailable),
            UNCATEGORIZED => Some(Self::Uncategorized),
            other => other.parse().ok().map(Self::Category),
        };
        label.ok_or(InvalidCategoryError { value })
    }
}

/// Fixed tiers for the historical category-share series.
///
/// Edges are pinned at 3.0 / 4.0 / 5.0 / 9.0 and the lowest tier is
/// strictly below 3.0. These do not follow the configurable [`BandTable`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum HistoryCategory {
    /// Ratio strictly below 3.0.
    #[serde(rename = "Affordable (<3.0)")]
    #[strum(serialize = "Affordable (<3.0)")]
    Affordable,
    /// Ratio in [3.0, 4.0].
    #[serde(rename = "Moderately Unaffordable (3.1-4.0)")]
    #[strum(serialize = "Moderately Unaffordable (3.1-4.0)")]
    ModeratelyUnaffordable,
    /// Ratio in (4.0, 5.0].
    #[serde(rename = "Seriously Unaffordable (4.1-5.0)")]
    #[strum(serialize = "Seriously Unaffordable (4.1-5.0)")]
    SeriouslyUnaffordable,
    /// Ratio in (5.0, 9.0].
    #[serde(rename = "Severely Unaffordable (5.1-9.0)")]
    #[strum(serialize = "Severely Unaffordable (5.1-9.0)")]
    SeverelyUnaffordable,
    /// Ratio above 9.0.
    #[serde(rename = "Impossibly Unaffordable (>9.0)")]
    #[strum(serialize = "Impossibly Unaffordable (>9.0)")]
    ImpossiblyUnaffordable,
}

impl HistoryCategory {
    /// Classifies a city-level ratio with the pinned strict edges.
    #[must_use]
    pub fn classify_strict(ratio: f64) -> Self {
        if ratio < 3.0 {
            Self::Affordable
        } else if ratio <= 4.0 {
            Self::ModeratelyUnaffordable
        } else if ratio <= 5.0 {
            Self::SeriouslyUnaffordable
        } else if ratio <= 9.0 {
            Self::SeverelyUnaffordable
        } else {
            Self::ImpossiblyUnaffordable
        }
    }

    /// Returns the chart color used for this tier in the history chart.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Affordable => "green",
            Self::ModeratelyUnaffordable => "#FFD700",
            Self::SeriouslyUnaffordable => "orange",
            Self::SeverelyUnaffordable => "red",
            Self::ImpossiblyUnaffordable => "maroon",
        }
    }

    /// Returns all variants in ascending ratio order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Affordable,
            Self::ModeratelyUnaffordable,
            Self::SeriouslyUnaffordable,
            Self::SeverelyUnaffordable,
            Self::ImpossiblyUnaffordable,
        ]
    }
}

/// One row of the housing dataset: a single ZIP code in a single year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HousingRecord {
    /// Five-character zero-padded ZIP code.
    pub zip_code: ZipCode,
    /// Observation year.
    pub year: i32,
    /// Short metro identifier (e.g. "ATL"), also the shape file stem.
    pub city_code: String,
    /// Display name of the metro area.
    pub city_full_name: String,
    /// Median home sale price in dollars.
    pub median_sale_price: Option<f64>,
    /// Per-capita annual income in dollars.
    pub per_capita_income: Option<f64>,
    /// Median monthly rent in dollars.
    pub median_rent: Option<f64>,
}

/// A [`HousingRecord`] with its derived price-to-income ratio and display
/// category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioRecord {
    /// The source row.
    #[serde(flatten)]
    pub record: HousingRecord,
    /// `median_sale_price / per_capita_income`, or `None` when undefined.
    pub price_to_income_ratio: Option<f64>,
    /// Display category for the ratio.
    pub affordability_category: CategoryLabel,
}

/// Any row that wraps a [`HousingRecord`].
///
/// Lets filters and pickers work the same over raw records, ratio records,
/// and map rows.
pub trait HousingRow {
    /// Returns the underlying housing record.
    fn housing_record(&self) -> &HousingRecord;

    /// Per-capita income of the row.
    fn per_capita_income(&self) -> Option<f64> {
        self.housing_record().per_capita_income
    }

    /// Observation year of the row.
    fn year(&self) -> i32 {
        self.housing_record().year
    }

    /// Metro code of the row.
    fn city_code(&self) -> &str {
        &self.housing_record().city_code
    }
}

impl HousingRow for HousingRecord {
    fn housing_record(&self) -> &HousingRecord {
        self
    }
}

impl HousingRow for RatioRecord {
    fn housing_record(&self) -> &HousingRecord {
        &self.record
    }
}
