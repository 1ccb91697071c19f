//! Row filters: income ceiling and year.
//!
//! Both are order-preserving and work over anything implementing
//! [`HousingRow`]. An empty result is a normal outcome meaning "no data".

use afford_map_housing_models::HousingRow;

/// Keeps rows whose per-capita income is at or below `ceiling`.
///
/// Rows without an income figure are dropped.
#[must_use]
pub fn filter_by_income<T: HousingRow + Clone>(rows: &[T], ceiling: f64) -> Vec<T> {
    rows.iter()
        .filter(|r| r.per_capita_income().is_some_and(|i| i <= ceiling))
        .cloned()
        .collect()
}

/// Keeps rows observed in `year`.
#[must_use]
pub fn filter_by_year<T: HousingRow + Clone>(rows: &[T], year: i32) -> Vec<T> {
    rows.iter().filter(|r| r.year() == year).cloned().collect()
}
