//! Metro ranking and view-selection helpers.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use afford_map_analytics_models::{CityViewParams, CityViewResult, CityYearAggregate, SortKey, ViewKey};
use afford_map_config::AffordabilityConfig;
use afford_map_housing_models::{HousingRow, RatioRecord};

use crate::{AnalyticsError, aggregate::aggregate_cities, filter::filter_by_income};

/// Orders `a` and `b` with `None` always last, regardless of direction.
fn cmp_optional(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts metros in place. The sort is stable.
pub fn sort_cities(cities: &mut [CityYearAggregate], key: SortKey) {
    match key {
        SortKey::CityName => cities.sort_by(|a, b| a.city_full_name.cmp(&b.city_full_name)),
        SortKey::Ratio => cities.sort_by(|a, b| {
            cmp_optional(a.price_to_income_ratio, b.price_to_income_ratio, false)
        }),
        SortKey::MedianSalePrice => {
            cities.sort_by(|a, b| cmp_optional(a.median_sale_price, b.median_sale_price, true));
        }
        SortKey::PerCapitaIncome => {
            cities.sort_by(|a, b| cmp_optional(a.per_capita_income, b.per_capita_income, true));
        }
    }
}

/// Keeps only metros whose display name is in `full_names`.
///
/// An empty selection keeps nothing.
#[must_use]
pub fn select_metros(cities: Vec<CityYearAggregate>, full_names: &[String]) -> Vec<CityYearAggregate> {
    cities
        .into_iter()
        .filter(|c| full_names.contains(&c.city_full_name))
        .collect()
}

/// Distinct `(display name, code)` pairs present in `rows`, sorted by
/// display name.
#[must_use]
pub fn metro_options<T: HousingRow>(rows: &[T]) -> Vec<(String, String)> {
    let mut options = BTreeMap::new();
    for row in rows {
        let record = row.housing_record();
        options
            .entry(record.city_full_name.clone())
            .or_insert_with(|| record.city_code.clone());
    }
    options.into_iter().collect()
}

/// Latest year present in `rows`.
#[must_use]
pub fn latest_year<T: HousingRow>(rows: &[T]) -> Option<i32> {
    rows.iter().map(HousingRow::year).max()
}

/// Whether the ZIP map needs recomputing for `current`.
///
/// Sort order, metro multi-selection, and year do not affect the ZIP map,
/// so only the selected metro and income are compared.
#[must_use]
pub fn view_changed(previous: Option<&ViewKey>, current: &ViewKey) -> bool {
    previous != Some(current)
}

/// Builds the metro ranking for one year.
///
/// # Errors
///
/// * If the income ceiling is negative or not finite
#[allow(clippy::cast_possible_truncation)]
pub fn city_view(
    records: &[RatioRecord],
    params: &CityViewParams,
    config: &AffordabilityConfig,
) -> Result<CityViewResult, AnalyticsError> {
    let filtered;
    let rows = match params.income {
        Some(income) if !income.is_finite() || income < 0.0 => {
            return Err(AnalyticsError::InvalidParameter {
                message: format!("income must be a non-negative number, got {income}"),
            });
        }
        Some(income) => {
            filtered = filter_by_income(records, income);
            filtered.as_slice()
        }
        None => records,
    };

    let Some(year) = params.year.or_else(|| latest_year(records)) else {
        return Ok(CityViewResult {
            year: None,
            cities: vec![],
            description: "No data".to_string(),
        });
    };

    let mut cities = aggregate_cities(rows, year, config);
    if let Some(metros) = &params.metros {
        cities = select_metros(cities, metros);
    }
    sort_cities(&mut cities, params.sort);

    let description = match params.income {
        Some(income) => format!(
            "{} metros in {year}, ZIP codes with per-capita income up to ${}, sorted by {}",
            cities.len(),
            income.round() as i64,
            params.sort.label()
        ),
        None => format!(
            "{} metros in {year}, sorted by {}",
            cities.len(),
            params.sort.label()
        ),
    };
    log::debug!("{description}");

    Ok(CityViewResult {
        year: Some(year),
        cities,
        description,
    })
}
