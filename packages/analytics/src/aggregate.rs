//! Metro-level aggregation.
//!
//! Groups ZIP rows by metro and year and takes the median (not the mean)
//! of ratio, sale price, and income so that a handful of outlier ZIP codes
//! cannot drag a whole metro's rating. The binary `is_affordable` flag and
//! the five-tier category are computed from the same median ratio but
//! against independently configured cut-offs.

use std::collections::{BTreeMap, BTreeSet};

use afford_map_analytics_models::CityYearAggregate;
use afford_map_config::AffordabilityConfig;
use afford_map_housing_models::{RatioRecord, ZipCode};

/// Returns the median of `values`, or `None` if empty.
///
/// Sorts in place. Even-length input takes the mean of the two middle
/// values.
#[must_use]
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some(f64::midpoint(values[mid - 1], values[mid]))
    } else {
        Some(values[mid])
    }
}

/// Per-metro accumulator while scanning ZIP rows.
#[derive(Default)]
struct CityAccum<'a> {
    full_name: Option<&'a str>,
    ratios: Vec<f64>,
    prices: Vec<f64>,
    incomes: Vec<f64>,
    zips: BTreeSet<&'a ZipCode>,
}

impl<'a> CityAccum<'a> {
    fn push(&mut self, row: &'a RatioRecord) {
        let record = &row.record;
        self.full_name.get_or_insert(record.city_full_name.as_str());
        self.ratios.extend(row.price_to_income_ratio);
        self.prices.extend(record.median_sale_price);
        self.incomes.extend(record.per_capita_income);
        self.zips.insert(&record.zip_code);
    }

    fn finish(mut self, city_code: &str, year: i32, config: &AffordabilityConfig) -> CityYearAggregate {
        let ratio = median(&mut self.ratios);
        let threshold = config.affordable_threshold;

        CityYearAggregate {
            city_code: city_code.to_string(),
            city_full_name: self.full_name.unwrap_or(city_code).to_string(),
            year,
            price_to_income_ratio: ratio,
            median_sale_price: median(&mut self.prices),
            per_capita_income: median(&mut self.incomes),
            zip_count: self.zips.len() as u64,
            is_affordable: ratio.is_some_and(|r| r <= threshold),
            affordability_category: config.bands.classify(ratio),
            threshold_gap: ratio.map(|r| threshold - r),
        }
    }
}

/// Aggregates every (year, metro) pair in one pass.
///
/// Returns a map from year to that year's metro rows, each year's rows
/// ordered by metro code.
#[must_use]
pub fn aggregate_by_year(
    records: &[RatioRecord],
    config: &AffordabilityConfig,
) -> BTreeMap<i32, Vec<CityYearAggregate>> {
    let mut groups: BTreeMap<(i32, &str), CityAccum<'_>> = BTreeMap::new();
    for row in records {
        groups
            .entry((row.record.year, row.record.city_code.as_str()))
            .or_default()
            .push(row);
    }

    let mut by_year: BTreeMap<i32, Vec<CityYearAggregate>> = BTreeMap::new();
    for ((year, city_code), accum) in groups {
        by_year
            .entry(year)
            .or_default()
            .push(accum.finish(city_code, year, config));
    }
    by_year
}

/// Aggregates one year's ZIP rows into one row per metro, ordered by metro
/// code.
///
/// A year with no rows yields an empty `Vec`.
#[must_use]
pub fn aggregate_cities(
    records: &[RatioRecord],
    year: i32,
    config: &AffordabilityConfig,
) -> Vec<CityYearAggregate> {
    let mut groups: BTreeMap<&str, CityAccum<'_>> = BTreeMap::new();
    for row in records.iter().filter(|r| r.record.year == year) {
        groups
            .entry(row.record.city_code.as_str())
            .or_default()
            .push(row);
    }

    let cities: Vec<CityYearAggregate> = groups
        .into_iter()
        .map(|(city_code, accum)| accum.finish(city_code, year, config))
        .collect();

    log::debug!("Aggregated {} metros for {year}", cities.len());
    cities
}

#[cfg(test)]
mod tests {
    use afford_map_housing_models::{
        AffordabilityBand, AffordabilityCategory, BandTable, CategoryLabel, HousingRecord,
    };

    use super::*;

    fn row(zip: &str, city: &str, year: i32, ratio: Option<f64>) -> RatioRecord {
        RatioRecord {
            record: HousingRecord {
                zip_code: ZipCode::parse(zip).unwrap(),
                year,
                city_code: city.to_string(),
                city_full_name: format!("{city} Metro Area"),
                median_sale_price: ratio.map(|r| r * 50_000.0),
                per_capita_income: Some(50_000.0),
                median_rent: None,
            },
            price_to_income_ratio: ratio,
            affordability_category: BandTable::canonical().classify(ratio),
        }
    }

    #[test]
    fn median_not_mean() {
        let config = AffordabilityConfig::default();
        let rows = vec![
            row("10001", "NYC", 2020, Some(2.0)),
            row("10002", "NYC", 2020, Some(3.0)),
            row("10003", "NYC", 2020, Some(100.0)),
        ];
        let agg = aggregate_cities(&rows, 2020, &config);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].price_to_income_ratio, Some(3.0));
        assert_eq!(agg[0].median_sale_price, Some(150_000.0));
        assert_eq!(agg[0].zip_count, 3);
    }

    #[test]
    fn atlanta_even_count_scenario() {
        let config = AffordabilityConfig::default();
        let rows = vec![
            row("30301", "ATL", 2021, Some(2.5)),
            row("30302", "ATL", 2021, Some(3.5)),
        ];
        let agg = aggregate_cities(&rows, 2021, &config);
        assert_eq!(agg[0].price_to_income_ratio, Some(3.0));
        assert!(agg[0].is_affordable);
        assert_eq!(
            agg[0].affordability_category,
            CategoryLabel::Category(AffordabilityCategory::Affordable)
        );
        assert_eq!(agg[0].threshold_gap, Some(0.0));
    }

    #[test]
    fn binary_flag_and_bands_are_independent() {
        let config = AffordabilityConfig {
            affordable_threshold: 5.0,
            bands: BandTable::new(vec![
                AffordabilityBand::new(AffordabilityCategory::Affordable, None, Some(2.0)),
                AffordabilityBand::new(AffordabilityCategory::ImpossiblyUnaffordable, Some(2.0), None),
            ]),
            ..AffordabilityConfig::default()
        };
        let rows = vec![row("30301", "ATL", 2021, Some(4.0))];
        let agg = aggregate_cities(&rows, 2021, &config);
        assert!(agg[0].is_affordable);
        assert_eq!(
            agg[0].affordability_category,
            CategoryLabel::Category(AffordabilityCategory::ImpossiblyUnaffordable)
        );
        assert_eq!(agg[0].threshold_gap, Some(1.0));
    }

    #[test]
    fn ignores_undefined_ratios_and_counts_distinct_zips() {
        let config = AffordabilityConfig::default();
        let rows = vec![
            row("30301", "ATL", 2021, Some(4.0)),
            row("30301", "ATL", 2021, Some(6.0)),
            row("30302", "ATL", 2021, None),
        ];
        let agg = aggregate_cities(&rows, 2021, &config);
        assert_eq!(agg[0].price_to_income_ratio, Some(5.0));
        assert_eq!(agg[0].zip_count, 2);
        assert!(!agg[0].is_affordable);
        assert_eq!(agg[0].threshold_gap, Some(-2.0));
    }

    #[test]
    fn all_undefined_metro_is_not_available() {
        let config = AffordabilityConfig::default();
        let rows = vec![row("30301", "ATL", 2021, None)];
        let agg = aggregate_cities(&rows, 2021, &config);
        assert_eq!(agg[0].price_to_income_ratio, None);
        assert!(!agg[0].is_affordable);
        assert_eq!(agg[0].affordability_category, CategoryLabel::NotAvailable);
    }

    #[test]
    fn empty_year_is_empty_not_error() {
        let config = AffordabilityConfig::default();
        let rows = vec![row("30301", "ATL", 2021, Some(4.0))];
        assert!(aggregate_cities(&rows, 1999, &config).is_empty());
    }

    #[test]
    fn one_row_per_metro_ordered_by_code() {
        let config = AffordabilityConfig::default();
        let rows = vec![
            row("98101", "SEA", 2021, Some(7.0)),
            row("30301", "ATL", 2021, Some(4.0)),
            row("02134", "BOS", 2021, Some(9.0)),
            row("02135", "BOS", 2020, Some(8.0)),
        ];
        let agg = aggregate_cities(&rows, 2021, &config);
        let codes: Vec<&str> = agg.iter().map(|a| a.city_code.as_str()).collect();
        assert_eq!(codes, ["ATL", "BOS", "SEA"]);
    }

    #[test]
    fn by_year_matches_single_year() {
        let config = AffordabilityConfig::default();
        let rows = vec![
            row("30301", "ATL", 2020, Some(4.0)),
            row("30302", "ATL", 2021, Some(2.0)),
            row("02134", "BOS", 2021, Some(9.0)),
        ];
        let by_year = aggregate_by_year(&rows, &config);
        assert_eq!(by_year.len(), 2);
        for (year, cities) in &by_year {
            assert_eq!(*cities, aggregate_cities(&rows, *year, &config));
        }
    }

    #[test]
    fn median_helper() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [5.0]), Some(5.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }
}
