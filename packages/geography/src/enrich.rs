//! Building ZIP map rows from housing records.

use std::collections::BTreeMap;

use afford_map_analytics::{
    aggregate::median,
    ratio::{clip_ratio, to_ratio_record},
};
use afford_map_geography_models::{Coordinates, ZipMapRow};
use afford_map_housing_models::{BandTable, HousingRecord, ZipCode};

use crate::locator::ZipLocator;

/// Attaches a point to each record and derives its map ratio.
///
/// Rows whose ZIP code cannot be located are dropped. The ratio and
/// category are recomputed from the record's own price and income, and the
/// map ratio is clamped into `[0, clip]`. Input order is preserved.
#[must_use]
pub fn enrich_with_coordinates<L: ZipLocator + ?Sized>(
    records: &[HousingRecord],
    locator: &L,
    bands: &BandTable,
    clip: f64,
) -> Vec<ZipMapRow> {
    let rows: Vec<ZipMapRow> = records
        .iter()
        .filter_map(|record| {
            let coordinates = locator.locate(&record.zip_code)?;
            let record = to_ratio_record(record, bands);
            Some(ZipMapRow {
                ratio_for_map: clip_ratio(record.price_to_income_ratio, clip),
                record,
                coordinates,
            })
        })
        .collect();

    let dropped = records.len() - rows.len();
    if dropped > 0 {
        log::debug!("{dropped} of {} ZIP rows had no coordinates", records.len());
    }
    rows
}

/// Mean latitude and longitude of `rows`, for centering the map.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn map_center(rows: &[ZipMapRow]) -> Option<Coordinates> {
    if rows.is_empty() {
        return None;
    }
    let n = rows.len() as f64;
    let (lat, lon) = rows.iter().fold((0.0, 0.0), |(lat, lon), row| {
        (lat + row.coordinates.latitude, lon + row.coordinates.longitude)
    });
    Some(Coordinates {
        latitude: lat / n,
        longitude: lon / n,
    })
}

#[derive(Default)]
struct ZipAccum<'a> {
    first: Option<&'a HousingRecord>,
    prices: Vec<f64>,
    incomes: Vec<f64>,
    rents: Vec<f64>,
}

/// Collapses one metro's rows for one year to a single row per ZIP code,
/// taking medians of price, income, and rent. Ordered by ZIP code.
#[must_use]
pub fn aggregate_zip_rows(records: &[HousingRecord], city_code: &str, year: i32) -> Vec<HousingRecord> {
    let mut groups: BTreeMap<&ZipCode, ZipAccum<'_>> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| r.city_code == city_code && r.year == year)
    {
        let accum = groups.entry(&record.zip_code).or_default();
        accum.first.get_or_insert(record);
        accum.prices.extend(record.median_sale_price);
        accum.incomes.extend(record.per_capita_income);
        accum.rents.extend(record.median_rent);
    }

    groups
        .into_values()
        .filter_map(|mut accum| {
            let first = accum.first?;
            Some(HousingRecord {
                median_sale_price: median(&mut accum.prices),
                per_capita_income: median(&mut accum.incomes),
                median_rent: median(&mut accum.rents),
                ..first.clone()
            })
        })
        .collect()
}
