//! Price-to-income and rent-to-income ratios.
//!
//! A ratio is only defined when both inputs are present and income is
//! strictly positive. Otherwise it is `None`, never infinite, and the row
//! is labelled `N/A`. Ratios are stored at full precision; rounding to two
//! decimals is left to whoever displays them.

use afford_map_housing_models::{BandTable, HousingRecord, RatioRecord};

/// Months per year, for converting annual income to monthly.
const MONTHS_PER_YEAR: f64 = 12.0;

/// Computes `price / income`, or `None` when undefined.
#[must_use]
pub fn price_to_income_ratio(price: Option<f64>, income: Option<f64>) -> Option<f64> {
    let income = income.filter(|i| *i > 0.0)?;
    let ratio = price? / income;
    ratio.is_finite().then_some(ratio)
}

/// Computes monthly rent over the rent budget (`budget_share` of monthly
/// income). A value at or below 1.0 means the rent fits the budget.
#[must_use]
pub fn rent_to_income_ratio(
    rent: Option<f64>,
    annual_income: Option<f64>,
    budget_share: f64,
) -> Option<f64> {
    let budget = annual_income.map(|i| monthly_income(i) * budget_share);
    price_to_income_ratio(rent, budget)
}

/// Converts annual income to monthly.
#[must_use]
pub fn monthly_income(annual: f64) -> f64 {
    annual / MONTHS_PER_YEAR
}

/// Highest sale price that keeps the ratio at or below `threshold` for the
/// given annual income.
#[must_use]
pub fn max_affordable_price(threshold: f64, annual_income: f64) -> f64 {
    threshold * annual_income
}

/// Clamps a ratio into `[0, max]` for map coloring.
#[must_use]
pub fn clip_ratio(ratio: Option<f64>, max: f64) -> Option<f64> {
    ratio.map(|r| r.clamp(0.0, max))
}

/// Derives the ratio and display category for one record.
#[must_use]
pub fn to_ratio_record(record: &HousingRecord, bands: &BandTable) -> RatioRecord {
    let ratio = price_to_income_ratio(record.median_sale_price, record.per_capita_income);
    RatioRecord {
        record: record.clone(),
        price_to_income_ratio: ratio,
        affordability_category: bands.classify(ratio),
    }
}

/// Derives ratios and categories for every record, preserving order.
#[must_use]
pub fn compute_ratios(records: &[HousingRecord], bands: &BandTable) -> Vec<RatioRecord> {
    let out: Vec<RatioRecord> = records
        .iter()
        .map(|r| to_ratio_record(r, bands))
        .collect();

    let undefined = out
        .iter()
        .filter(|r| r.price_to_income_ratio.is_none())
        .count();
    if undefined > 0 {
        log::debug!("{undefined} of {} rows have an undefined ratio", out.len());
    }

    out
}

#[cfg(test)]
mod tests {
    use afford_map_housing_models::{AffordabilityCategory, CategoryLabel, ZipCode};

    use super::*;

    fn record(zip: &str, price: Option<f64>, income: Option<f64>) -> HousingRecord {
        HousingRecord {
            zip_code: ZipCode::parse(zip).unwrap(),
            year: 2020,
            city_code: "BOS".to_string(),
            city_full_name: "BOS Metro Area".to_string(),
            median_sale_price: price,
            per_capita_income: income,
            median_rent: Some(2_000.0),
        }
    }

    #[test]
    fn boston_scenario() {
        let bands = BandTable::canonical();
        let out = to_ratio_record(&record("02134", Some(600_000.0), Some(40_000.0)), &bands);
        assert_eq!(out.price_to_income_ratio, Some(15.0));
        assert_eq!(
            out.affordability_category,
            CategoryLabel::Category(AffordabilityCategory::ImpossiblyUnaffordable)
        );
        assert_eq!(out.record.zip_code.as_str(), "02134");
    }

    #[test]
    fn zero_income_is_undefined_not_infinite() {
        let bands = BandTable::canonical();
        let out = to_ratio_record(&record("02134", Some(600_000.0), Some(0.0)), &bands);
        assert_eq!(out.price_to_income_ratio, None);
        assert_eq!(out.affordability_category, CategoryLabel::NotAvailable);
    }

    #[test]
    fn missing_inputs_are_undefined() {
        assert_eq!(price_to_income_ratio(None, Some(1.0)), None);
        assert_eq!(price_to_income_ratio(Some(1.0), None), None);
        assert_eq!(price_to_income_ratio(Some(1.0), Some(-5.0)), None);
        assert_eq!(price_to_income_ratio(Some(f64::INFINITY), Some(1.0)), None);
    }

    #[test]
    fn keeps_full_precision() {
        let ratio = price_to_income_ratio(Some(100_000.0), Some(30_000.0)).unwrap();
        assert!((ratio - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn rent_ratio_uses_budget_share() {
        let ratio = rent_to_income_ratio(Some(1_500.0), Some(60_000.0), 0.3).unwrap();
        assert!((ratio - 1.0).abs() < 1e-12);
        assert_eq!(rent_to_income_ratio(Some(1_500.0), Some(0.0), 0.3), None);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let bands = BandTable::canonical();
        let input = vec![
            record("02134", Some(600_000.0), Some(40_000.0)),
            record("02135", None, Some(40_000.0)),
            record("02136", Some(90_000.0), Some(30_000.0)),
        ];
        let first = compute_ratios(&input, &bands);
        let second = compute_ratios(&input, &bands);
        assert_eq!(first, second);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(
                a.price_to_income_ratio.map(f64::to_bits),
                b.price_to_income_ratio.map(f64::to_bits)
            );
        }
    }

    #[test]
    fn csv_rows_flow_through_to_categories() {
        let csv = "\
zipcode,year,city,city_full,median_sale_price,per_capita_income
2134,2021,BOS,Boston,600000,40000
30301,2021,ATL,Atlanta,150000,50000
30302,2021,ATL,Atlanta,200000,0
";
        let bands = BandTable::canonical();
        let table = afford_map_loader::RawTable::from_csv_reader(csv.as_bytes()).unwrap();
        let records = afford_map_loader::normalize(&table).unwrap();

        let first = compute_ratios(&records, &bands);
        let second = compute_ratios(&afford_map_loader::normalize(&table).unwrap(), &bands);
        let bits = |rows: &[RatioRecord]| -> Vec<Option<u64>> {
            rows.iter()
                .map(|r| r.price_to_income_ratio.map(f64::to_bits))
                .collect()
        };
        assert_eq!(first, second);
        assert_eq!(bits(&first), bits(&second));

        assert_eq!(first[0].record.zip_code.as_str(), "02134");
        assert_eq!(first[0].price_to_income_ratio, Some(15.0));
        assert_eq!(
            first[0].affordability_category,
            CategoryLabel::Category(AffordabilityCategory::ImpossiblyUnaffordable)
        );
        assert_eq!(first[1].price_to_income_ratio, Some(3.0));
        assert_eq!(
            first[1].affordability_category,
            CategoryLabel::Category(AffordabilityCategory::Affordable)
        );
        assert_eq!(first[2].price_to_income_ratio, None);
        assert_eq!(first[2].affordability_category, CategoryLabel::NotAvailable);
    }

    #[test]
    fn clip_and_helpers() {
        assert_eq!(clip_ratio(Some(20.0), 15.0), Some(15.0));
        assert_eq!(clip_ratio(Some(-1.0), 15.0), Some(0.0));
        assert_eq!(clip_ratio(None, 15.0), None);
        assert!((monthly_income(90_000.0) - 7_500.0).abs() < 1e-9);
        assert!((max_affordable_price(3.0, 90_000.0) - 270_000.0).abs() < 1e-9);
    }
}
