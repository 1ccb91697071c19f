//! Implementations of the `afford_map` subcommands.
//!
//! Each command loads what it needs, runs the analytics, and prints either
//! an aligned text table or camelCase JSON.

use std::path::PathBuf;

use afford_map_analytics::{
    filter::{filter_by_income, filter_by_year},
    history::build_history,
    ratio::{compute_ratios, max_affordable_price, monthly_income, rent_to_income_ratio},
    view::{city_view, metro_options},
};
use afford_map_analytics_models::{CityViewParams, CityViewResult, HistorySeries};
use afford_map_cli_utils::{IndicatifProgress, MultiProgress};
use afford_map_config::{AffordabilityConfig, DataPaths};
use afford_map_geography::{
    cache::CachedLocator,
    enrich::{aggregate_zip_rows, enrich_with_coordinates, map_center},
    locator::{ChainedLocator, GazetteerLocator, ShapeCentroidLocator, ZipLocator},
    shapes::{city_shapes_path, load_city_shapes},
};
use afford_map_geography_models::{Coordinates, ZipMapRow};
use afford_map_housing_models::{BandTable, HousingRecord, HousingRow, RatioRecord};
use afford_map_loader::{load_city_zip_data, load_housing_data};
use serde::Serialize;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub config: AffordabilityConfig,
    pub paths: DataPaths,
    pub multi: MultiProgress,
}

impl Context {
    /// Reads and normalizes the housing CSV with a progress bar.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or lacks a required column.
    pub fn load_records(&self) -> Result<Vec<HousingRecord>, Box<dyn std::error::Error>> {
        let progress = IndicatifProgress::rows_bar(&self.multi, "Loading housing data");
        Ok(load_housing_data(&self.paths.data_file, &progress)?)
    }

    /// Loads the records and derives their ratios.
    ///
    /// # Errors
    ///
    /// See [`Self::load_records`].
    pub fn load_ratios(&self) -> Result<Vec<RatioRecord>, Box<dyn std::error::Error>> {
        let records = self.load_records()?;
        Ok(compute_ratios(&records, &self.config.bands))
    }

    /// Loads the gazetteer if the file exists, otherwise an empty locator.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is malformed.
    pub fn gazetteer(&self) -> Result<CachedLocator<GazetteerLocator>, Box<dyn std::error::Error>> {
        let gazetteer = if self.paths.gazetteer.is_file() {
            GazetteerLocator::from_path(&self.paths.gazetteer)?
        } else {
            log::debug!(
                "No gazetteer at {}, using shape centroids only",
                self.paths.gazetteer.display()
            );
            GazetteerLocator::default()
        };
        Ok(CachedLocator::with_ttl(gazetteer, self.config.cache_ttl()))
    }
}

/// Finds a metro by code or display name, case-insensitively.
#[must_use]
pub fn resolve_metro<T: HousingRow>(rows: &[T], query: &str) -> Option<(String, String)> {
    let query = query.trim();
    metro_options(rows)
        .into_iter()
        .find(|(name, code)| code.eq_ignore_ascii_case(query) || name.eq_ignore_ascii_case(query))
}

/// Formats an optional number with fixed decimals, `N/A` when missing.
#[must_use]
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.decimals$}"))
}

/// Formats an optional amount as whole dollars.
#[must_use]
pub fn fmt_dollars(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("${v:.0}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// cities
// ---------------------------------------------------------------------------

/// Prints a metro ranking.
pub fn print_city_view(view: &CityViewResult) {
    println!("{}", view.description);
    if view.cities.is_empty() {
        println!("No data for this selection.");
        return;
    }
    println!();
    println!(
        "{:<40} {:>7}  {:<24} {:>12} {:>10} {:>5}  Affordable",
        "Metro", "Ratio", "Category", "Price", "Income", "ZIPs"
    );
    println!("{}", "-".repeat(118));
    for city in &view.cities {
        println!(
            "{:<40} {:>7}  {:<24} {:>12} {:>10} {:>5}  {}",
            city.city_full_name,
            fmt_opt(city.price_to_income_ratio, 2),
            city.affordability_category.as_str(),
            fmt_dollars(city.median_sale_price),
            fmt_dollars(city.per_capita_income),
            city.zip_count,
            if city.is_affordable { "yes" } else { "no" },
        );
    }
    println!();
    println!("{} metro(s)", view.cities.len());
}

/// Runs `afford_map cities`.
///
/// # Errors
///
/// Returns an error if loading fails or the income is invalid.
pub fn cities(ctx: &Context, params: &CityViewParams, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let records = ctx.load_ratios()?;
    let view = city_view(&records, params, &ctx.config)?;
    if json {
        return print_json(&view);
    }
    print_city_view(&view);
    Ok(())
}

// ---------------------------------------------------------------------------
// zips
// ---------------------------------------------------------------------------

/// ZIP map for one metro and year.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipMapOutput {
    pub city_code: String,
    pub city_full_name: String,
    pub year: i32,
    /// Shape property the rows join on, e.g. `ZCTA5CE10`.
    pub key_property: Option<String>,
    pub center: Option<Coordinates>,
    pub rows: Vec<ZipMapRow>,
}

/// Arguments of `afford_map zips`.
pub struct ZipArgs {
    pub city: String,
    pub year: Option<i32>,
    pub income: Option<f64>,
    pub shapes: Option<PathBuf>,
    pub gazetteer: Option<PathBuf>,
}

/// Year a ZIP map shows: `requested` if given, otherwise the latest year in
/// which the metro has rows at or below the income ceiling.
#[must_use]
pub fn zip_map_year<T: HousingRow + Clone>(
    rows: &[T],
    city_code: &str,
    income: Option<f64>,
    requested: Option<i32>,
) -> Option<i32> {
    requested.or_else(|| {
        let in_city: Vec<T> = rows
            .iter()
            .filter(|r| r.city_code() == city_code)
            .cloned()
            .collect();
        let pool = match income {
            Some(ceiling) => filter_by_income(&in_city, ceiling),
            None => in_city,
        };
        pool.iter().map(HousingRow::year).max()
    })
}

/// Builds the ZIP map for a metro, or `None` when the metro has no shape
/// file.
///
/// # Errors
///
/// Returns an error if the shape file is malformed.
pub fn build_zip_map<L: ZipLocator + ?Sized>(
    ctx: &Context,
    records: &[HousingRecord],
    (city_full_name, city_code): (&str, &str),
    year: i32,
    income: Option<f64>,
    fallback: &L,
) -> Result<Option<ZipMapOutput>, Box<dyn std::error::Error>> {
    let Some(shapes) = load_city_shapes(&ctx.paths.shapes_dir, city_code)? else {
        println!(
            "No map available for {city_full_name}: {} not found",
            city_shapes_path(&ctx.paths.shapes_dir, city_code).display()
        );
        return Ok(None);
    };

    let in_city = load_city_zip_data(records, city_code, income.unwrap_or(f64::INFINITY));
    let in_year = filter_by_year(&in_city, year);
    if in_year.is_empty() {
        log::info!("{city_code} has no ZIP rows in {year} for this income");
    }
    let per_zip = aggregate_zip_rows(&in_year, city_code, year);

    let uncovered = per_zip.iter().filter(|r| !shapes.covers(&r.zip_code)).count();
    if uncovered > 0 {
        log::info!("{uncovered} ZIP codes in {city_code} have no polygon");
    }

    let centroids = ShapeCentroidLocator::from_shapes(&shapes);
    let locator = ChainedLocator::new(&centroids, fallback);
    let rows = enrich_with_coordinates(&per_zip, &locator, &ctx.config.bands, ctx.config.max_ratio_clip);

    Ok(Some(ZipMapOutput {
        city_code: city_code.to_string(),
        city_full_name: city_full_name.to_string(),
        year,
        key_property: shapes.key_property().map(str::to_string),
        center: map_center(&rows),
        rows,
    }))
}

/// Prints a ZIP map as a table.
pub fn print_zip_map(map: &ZipMapOutput) {
    println!("{} ({}) in {}", map.city_full_name, map.city_code, map.year);
    if let Some(center) = map.center {
        println!("Center: {:.4}, {:.4}", center.latitude, center.longitude);
    }
    if map.rows.is_empty() {
        println!("No ZIP codes to show for this selection.");
        return;
    }
    println!();
    println!(
        "{:<6} {:>7} {:>7}  {:<24} {:>12} {:>10}",
        "ZIP", "Ratio", "Map", "Category", "Price", "Income"
    );
    println!("{}", "-".repeat(72));
    for row in &map.rows {
        let record = &row.record.record;
        println!(
            "{:<6} {:>7} {:>7}  {:<24} {:>12} {:>10}",
            record.zip_code,
            fmt_opt(row.record.price_to_income_ratio, 2),
            fmt_opt(row.ratio_for_map, 2),
            row.record.affordability_category.as_str(),
            fmt_dollars(record.median_sale_price),
            fmt_dollars(record.per_capita_income),
        );
    }
    println!();
    println!("{} ZIP code(s)", map.rows.len());
}

/// Runs `afford_map zips`.
///
/// # Errors
///
/// Returns an error if loading fails, the metro is unknown, or the income
/// is invalid.
pub fn zips(ctx: &mut Context, args: ZipArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(income) = args.income
        && (!income.is_finite() || income < 0.0)
    {
        return Err(format!("income must be a non-negative number, got {income}").into());
    }
    if let Some(dir) = args.shapes {
        ctx.paths.shapes_dir = dir;
    }
    if let Some(file) = args.gazetteer {
        ctx.paths.gazetteer = file;
    }

    let records = ctx.load_records()?;
    let (name, code) = resolve_metro(&records, &args.city)
        .ok_or_else(|| format!("Unknown metro '{}'", args.city))?;

    let Some(year) = zip_map_year(&records, &code, args.income, args.year) else {
        println!("No data for {name} at this income.");
        return Ok(());
    };

    let gazetteer = ctx.gazetteer()?;
    let Some(map) = build_zip_map(ctx, &records, (&name, &code), year, args.income, &gazetteer)? else {
        return Ok(());
    };

    if json {
        return print_json(&map);
    }
    print_zip_map(&map);
    Ok(())
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

/// Prints both history series.
pub fn print_history(history: &HistorySeries) {
    if history.median_ratio.is_empty() {
        println!("No history available.");
        return;
    }

    println!("Median price-to-income ratio by year");
    println!();
    for point in &history.median_ratio {
        println!("  {}  {:>6.2}", point.year, point.median_ratio);
    }

    println!();
    println!("Share of metros by affordability tier");
    for point in &history.median_ratio {
        println!();
        println!("  {}", point.year);
        for share in history.category_shares.iter().filter(|s| s.year == point.year) {
            println!(
                "    {:<36} {:>6.1}%  {}",
                share.category.to_string(),
                share.percentage,
                share.category.color()
            );
        }
    }
}

/// Runs `afford_map history`.
///
/// # Errors
///
/// Returns an error if loading fails.
pub fn history(ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let records = ctx.load_ratios()?;
    let series = build_history(&records, &ctx.config);
    if json {
        return print_json(&series);
    }
    print_history(&series);
    Ok(())
}

// ---------------------------------------------------------------------------
// bands
// ---------------------------------------------------------------------------

/// Prints a band table with its colors.
pub fn print_bands(bands: &BandTable, threshold: f64) {
    println!("{:<26} {:>7} {:>7}  Color", "Category", "Above", "Up to");
    println!("{}", "-".repeat(52));
    for band in bands.sorted() {
        println!(
            "{:<26} {:>7} {:>7}  {}",
            band.category.to_string(),
            fmt_opt(band.lower, 1),
            fmt_opt(band.upper, 1),
            band.category.color(),
        );
    }
    println!();
    println!("A metro counts as affordable at a ratio of {threshold:.1} or less.");
}

/// Runs `afford_map bands`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn bands(ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        return print_json(&ctx.config.bands);
    }
    print_bands(&ctx.config.bands, ctx.config.affordable_threshold);
    Ok(())
}

// ---------------------------------------------------------------------------
// budget
// ---------------------------------------------------------------------------

/// What an income can afford.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOutput {
    pub annual_income: f64,
    pub monthly_income: f64,
    pub max_affordable_price: f64,
    pub monthly_rent_budget: f64,
    pub rent: Option<f64>,
    pub rent_to_income_ratio: Option<f64>,
}

/// Computes the budget for an annual income and optional monthly rent.
///
/// # Errors
///
/// Returns an error if the income is negative or not finite.
pub fn compute_budget(
    config: &AffordabilityConfig,
    annual_income: f64,
    rent: Option<f64>,
) -> Result<BudgetOutput, Box<dyn std::error::Error>> {
    if !annual_income.is_finite() || annual_income < 0.0 {
        return Err(format!("income must be a non-negative number, got {annual_income}").into());
    }
    let monthly = monthly_income(annual_income);
    Ok(BudgetOutput {
        annual_income,
        monthly_income: monthly,
        max_affordable_price: max_affordable_price(config.affordable_threshold, annual_income),
        monthly_rent_budget: monthly * config.rent_budget_share,
        rent,
        rent_to_income_ratio: rent_to_income_ratio(rent, Some(annual_income), config.rent_budget_share),
    })
}

/// Prints a budget.
pub fn print_budget(budget: &BudgetOutput) {
    println!("Annual income:        ${:.0}", budget.annual_income);
    println!("Monthly income:       ${:.0}", budget.monthly_income);
    println!("Max affordable price: ${:.0}", budget.max_affordable_price);
    println!("Monthly rent budget:  ${:.0}", budget.monthly_rent_budget);
    if let Some(rent) = budget.rent {
        println!(
            "Rent ${rent:.0} uses {} of the budget",
            budget
                .rent_to_income_ratio
                .map_or_else(|| "N/A".to_string(), |r| format!("{:.0}%", r * 100.0))
        );
    }
}

/// Runs `afford_map budget`.
///
/// # Errors
///
/// Returns an error if the income is invalid.
pub fn budget(ctx: &Context, income: f64, rent: Option<f64>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let budget = compute_budget(&ctx.config, income, rent)?;
    if json {
        return print_json(&budget);
    }
    print_budget(&budget);
    Ok(())
}
