//! Affordability band tables and the display classifier.
//!
//! A [`BandTable`] is an ordered list of `(lower, upper]` intervals, one
//! per [`AffordabilityCategory`]. The lowest band has no lower bound and
//! the highest has no upper bound. Ratios sitting exactly on a boundary
//! belong to the lower band because every interval is upper-inclusive.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{AffordabilityCategory, CategoryLabel};

/// A single named tier covering the half-open interval `(lower, upper]`.
///
/// `lower == None` means negative infinity and `upper == None` means
/// positive infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityBand {
    /// Category assigned to ratios inside this band.
    pub category: AffordabilityCategory,
    /// Exclusive lower bound.
    pub lower: Option<f64>,
    /// Inclusive upper bound.
    pub upper: Option<f64>,
}

impl AffordabilityBand {
    /// Creates a band.
    #[must_use]
    pub const fn new(category: AffordabilityCategory, lower: Option<f64>, upper: Option<f64>) -> Self {
        Self {
            category,
            lower,
            upper,
        }
    }
}

/// The five canonical display bands: 3.0 / 4.0 / 5.0 / 8.9.
pub const CANONICAL_BANDS: [AffordabilityBand; 5] = [
    AffordabilityBand::new(AffordabilityCategory::Affordable, None, Some(3.0)),
    AffordabilityBand::new(
        AffordabilityCategory::ModeratelyUnaffordable,
        Some(3.0),
        Some(4.0),
    ),
    AffordabilityBand::new(
        AffordabilityCategory::SeriouslyUnaffordable,
        Some(4.0),
        Some(5.0),
    ),
    AffordabilityBand::new(
        AffordabilityCategory::SeverelyUnaffordable,
        Some(5.0),
        Some(8.9),
    ),
    AffordabilityBand::new(AffordabilityCategory::ImpossiblyUnaffordable, Some(8.9), None),
];

/// An ordered, configurable table of affordability bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandTable {
    bands: Vec<AffordabilityBand>,
}

impl Default for BandTable {
    fn default() -> Self {
        Self::canonical()
    }
}

impl BandTable {
    /// Returns the canonical five-band display table.
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            bands: CANONICAL_BANDS.to_vec(),
        }
    }

    /// Builds a table from arbitrary bands. Use [`Self::validate`] to check
    /// that the bands are contiguous and exhaustive.
    #[must_use]
    pub const fn new(bands: Vec<AffordabilityBand>) -> Self {
        Self { bands }
    }

    /// Returns the bands in their configured order.
    #[must_use]
    pub fn bands(&self) -> &[AffordabilityBand] {
        &self.bands
    }

    /// Returns the bands sorted by upper bound ascending, with an absent
    /// upper bound sorting last.
    #[must_use]
    pub fn sorted(&self) -> Vec<&AffordabilityBand> {
        let mut sorted: Vec<&AffordabilityBand> = self.bands.iter().collect();
        sorted.sort_by(|a, b| compare_upper(a.upper, b.upper));
        sorted
    }

    /// Classifies a price-to-income ratio.
    ///
    /// Returns [`CategoryLabel::NotAvailable`] for a missing or NaN ratio
    /// and [`CategoryLabel::Uncategorized`] when no band matches, which can
    /// only happen with a table that leaves part of the ratio domain
    /// uncovered.
    #[must_use]
    pub fn classify(&self, ratio: Option<f64>) -> CategoryLabel {
        let Some(ratio) = ratio.filter(|r| !r.is_nan()) else {
            return CategoryLabel::NotAvailable;
        };

        for (i, band) in self.sorted().into_iter().enumerate() {
            let matched = match (i, band.lower, band.upper) {
                (0, _, Some(upper)) => ratio <= upper,
                (0, _, None) => true,
                (_, Some(lower), Some(upper)) => lower < ratio && ratio <= upper,
                (_, Some(lower), None) => ratio > lower,
                (_, None, _) => false,
            };
            if matched {
                return CategoryLabel::Category(band.category);
            }
        }

        CategoryLabel::Uncategorized
    }

    /// Checks that the table is contiguous and exhaustive over finite
    /// ratios.
    ///
    /// # Errors
    ///
    /// Returns [`BandTableError`] describing the first inconsistency found.
    pub fn validate(&self) -> Result<(), BandTableError> {
        let sorted = self.sorted();
        let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
            return Err(BandTableError::Empty);
        };

        if first.lower.is_some() {
            return Err(BandTableError::OpenLowEndMissing);
        }
        if last.upper.is_some() {
            return Err(BandTableError::OpenHighEndMissing);
        }

        let mut seen = Vec::with_capacity(sorted.len());
        for band in &sorted {
            if seen.contains(&band.category) {
                return Err(BandTableError::DuplicateCategory {
                    category: band.category,
                });
            }
            seen.push(band.category);

            if let (Some(lower), Some(upper)) = (band.lower, band.upper)
                && lower.partial_cmp(&upper) != Some(Ordering::Less)
            {
                return Err(BandTableError::EmptyInterval {
                    category: band.category,
                });
            }
        }

        for pair in sorted.windows(2) {
            let (below, above) = (pair[0], pair[1]);
            if below.upper != above.lower {
                return Err(BandTableError::Discontinuous {
                    below: below.category,
                    above: above.category,
                });
            }
        }

        Ok(())
    }
}

fn compare_upper(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(f64::INFINITY)
        .total_cmp(&b.unwrap_or(f64::INFINITY))
}

/// An inconsistency detected by [`BandTable::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandTableError {
    /// The table has no bands.
    Empty,
    /// The lowest band has a lower bound, leaving small ratios uncovered.
    OpenLowEndMissing,
    /// The highest band has an upper bound, leaving large ratios uncovered.
    OpenHighEndMissing,
    /// A band's lower bound is not below its upper bound.
    EmptyInterval {
        /// The offending band.
        category: AffordabilityCategory,
    },
    /// Two adjacent bands do not share a boundary.
    Discontinuous {
        /// The lower of the two bands.
        below: AffordabilityCategory,
        /// The upper of the two bands.
        above: AffordabilityCategory,
    },
    /// The same category appears more than once.
    DuplicateCategory {
        /// The repeated category.
        category: AffordabilityCategory,
    },
}

impl std::fmt::Display for BandTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "band table is empty"),
            Self::OpenLowEndMissing => write!(f, "lowest band must not have a lower bound"),
            Self::OpenHighEndMissing => write!(f, "highest band must not have an upper bound"),
            Self::EmptyInterval { category } => {
                write!(f, "band '{category}' has lower bound >= upper bound")
            }
            Self::Discontinuous { below, above } => {
                write!(f, "bands '{below}' and '{above}' do not share a boundary")
            }
            Self::DuplicateCategory { category } => {
                write!(f, "category '{category}' appears more than once")
            }
        }
    }
}

impl std::error::Error for BandTableError {}

#[cfg(test)]
mod tests {
    use super::*;
    use AffordabilityCategory::{
        Affordable, ImpossiblyUnaffordable, ModeratelyUnaffordable, SeriouslyUnaffordable,
        SeverelyUnaffordable,
    };

    fn label(category: AffordabilityCategory) -> CategoryLabel {
        CategoryLabel::Category(category)
    }

    #[test]
    fn boundaries_belong_to_lower_band() {
        let table = BandTable::canonical();
        assert_eq!(table.classify(Some(3.0)), label(Affordable));
        assert_eq!(table.classify(Some(3.0 + 1e-9)), label(ModeratelyUnaffordable));
        assert_eq!(table.classify(Some(4.0)), label(ModeratelyUnaffordable));
        assert_eq!(table.classify(Some(5.0)), label(SeriouslyUnaffordable));
        assert_eq!(table.classify(Some(8.9)), label(SeverelyUnaffordable));
        assert_eq!(table.classify(Some(8.9 + 1e-9)), label(ImpossiblyUnaffordable));
    }

    #[test]
    fn interior_values_are_stable_under_perturbation() {
        let table = BandTable::canonical();
        for (ratio, expected) in [
            (1.0, Affordable),
            (3.5, ModeratelyUnaffordable),
            (4.5, SeriouslyUnaffordable),
            (7.0, SeverelyUnaffordable),
            (15.0, ImpossiblyUnaffordable),
        ] {
            for eps in [-1e-6, 0.0, 1e-6] {
                assert_eq!(table.classify(Some(ratio + eps)), label(expected), "{ratio}");
            }
        }
    }

    #[test]
    fn missing_ratio_is_not_available() {
        let table = BandTable::canonical();
        assert_eq!(table.classify(None), CategoryLabel::NotAvailable);
        assert_eq!(table.classify(Some(f64::NAN)), CategoryLabel::NotAvailable);
    }

    #[test]
    fn canonical_table_never_uncategorized() {
        let table = BandTable::canonical();
        let mut ratio = -5.0;
        while ratio < 50.0 {
            assert_ne!(
                table.classify(Some(ratio)),
                CategoryLabel::Uncategorized,
                "ratio {ratio} fell through"
            );
            ratio += 0.05;
        }
        for extreme in [f64::MIN, -0.0, 0.0, f64::MAX, f64::INFINITY, f64::NEG_INFINITY] {
            assert_ne!(table.classify(Some(extreme)), CategoryLabel::Uncategorized);
        }
    }

    #[test]
    fn classification_ignores_configured_order() {
        let mut bands = CANONICAL_BANDS.to_vec();
        bands.reverse();
        let table = BandTable::new(bands);
        assert_eq!(table.classify(Some(3.0)), label(Affordable));
        assert_eq!(table.classify(Some(20.0)), label(ImpossiblyUnaffordable));
    }

    #[test]
    fn gap_in_table_yields_uncategorized() {
        let table = BandTable::new(vec![
            AffordabilityBand::new(Affordable, None, Some(3.0)),
            AffordabilityBand::new(SeverelyUnaffordable, Some(5.0), Some(8.9)),
            AffordabilityBand::new(ImpossiblyUnaffordable, Some(8.9), None),
        ]);
        assert_eq!(table.classify(Some(4.0)), CategoryLabel::Uncategorized);
        assert_eq!(
            table.validate(),
            Err(BandTableError::Discontinuous {
                below: Affordable,
                above: SeverelyUnaffordable,
            })
        );
    }

    #[test]
    fn canonical_table_validates() {
        assert_eq!(BandTable::canonical().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_closed_ends_and_duplicates() {
        let closed_high = BandTable::new(vec![
            AffordabilityBand::new(Affordable, None, Some(3.0)),
            AffordabilityBand::new(ModeratelyUnaffordable, Some(3.0), Some(4.0)),
        ]);
        assert_eq!(
            closed_high.validate(),
            Err(BandTableError::OpenHighEndMissing)
        );

        let duplicate = BandTable::new(vec![
            AffordabilityBand::new(Affordable, None, Some(3.0)),
            AffordabilityBand::new(Affordable, Some(3.0), None),
        ]);
        assert_eq!(
            duplicate.validate(),
            Err(BandTableError::DuplicateCategory {
                category: Affordable
            })
        );

        assert_eq!(BandTable::new(vec![]).validate(), Err(BandTableError::Empty));
    }
}
