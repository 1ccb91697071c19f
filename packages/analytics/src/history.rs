//! Year-over-year affordability history.
//!
//! Each year is rolled up to metro aggregates first, then summarized across
//! metros. History tiers use the strict classifier from
//! [`HistoryCategory::classify_strict`], which is deliberately separate from
//! the configurable display bands. Years where no metro has a defined ratio
//! are left out of both series.

use afford_map_analytics_models::{CategoryShare, CityYearAggregate, HistorySeries, MedianRatioPoint};
use afford_map_config::AffordabilityConfig;
use afford_map_housing_models::{HistoryCategory, RatioRecord};

use crate::aggregate::{aggregate_by_year, median};

fn defined_ratios(cities: &[CityYearAggregate]) -> Vec<f64> {
    cities
        .iter()
        .filter_map(|c| c.price_to_income_ratio)
        .collect()
}

/// Median of the metro ratios for every year with data, ascending by year.
#[must_use]
pub fn median_ratio_history(
    records: &[RatioRecord],
    config: &AffordabilityConfig,
) -> Vec<MedianRatioPoint> {
    aggregate_by_year(records, config)
        .into_iter()
        .filter_map(|(year, cities)| {
            median(&mut defined_ratios(&cities)).map(|median_ratio| MedianRatioPoint {
                year,
                median_ratio,
            })
        })
        .collect()
}

/// Share of metros in each strict tier for every year with data.
///
/// Every included year has exactly five rows, in tier order, whose
/// percentages sum to 100.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn category_share_history(
    records: &[RatioRecord],
    config: &AffordabilityConfig,
) -> Vec<CategoryShare> {
    let mut out = vec![];

    for (year, cities) in aggregate_by_year(records, config) {
        let ratios = defined_ratios(&cities);
        if ratios.is_empty() {
            log::debug!("No metro ratios for {year}, skipping");
            continue;
        }

        let mut counts = [0_usize; 5];
        for ratio in &ratios {
            let tier = HistoryCategory::classify_strict(*ratio);
            if let Some(i) = HistoryCategory::all().iter().position(|c| *c == tier) {
                counts[i] += 1;
            }
        }

        let total = ratios.len() as f64;
        for (category, count) in HistoryCategory::all().iter().zip(counts) {
            out.push(CategoryShare {
                year,
                category: *category,
                percentage: count as f64 / total * 100.0,
            });
        }
    }

    out
}

/// Builds both history series.
#[must_use]
pub fn build_history(records: &[RatioRecord], config: &AffordabilityConfig) -> HistorySeries {
    let series = HistorySeries {
        median_ratio: median_ratio_history(records, config),
        category_shares: category_share_history(records, config),
    };
    log::debug!("Built history over {} years", series.median_ratio.len());
    series
}
