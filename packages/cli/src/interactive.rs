//! Interactive session for exploring the data without memorizing flags.
//!
//! Loads the dataset once, then loops over a `dialoguer` menu. The last ZIP
//! map is kept and reprinted as-is while the selected metro and income stay
//! the same.

use std::str::FromStr;

use afford_map_analytics::{
    filter::filter_by_income,
    history::build_history,
    ratio::compute_ratios,
    view::{city_view, metro_options, view_changed},
};
use afford_map_analytics_models::{CityViewParams, SortKey, ViewKey};
use dialoguer::{Input, MultiSelect, Select};

use crate::commands::{
    Context, ZipMapOutput, build_zip_map, compute_budget, print_bands, print_budget,
    print_city_view, print_history, print_zip_map, zip_map_year,
};

/// Top-level actions in the interactive menu.
enum Action {
    Cities,
    ZipMap,
    History,
    Bands,
    Budget,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Cities,
        Self::ZipMap,
        Self::History,
        Self::Bands,
        Self::Budget,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Cities => "Rank metro areas",
            Self::ZipMap => "ZIP code map for a metro",
            Self::History => "Affordability history",
            Self::Bands => "Affordability bands",
            Self::Budget => "What can I afford?",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive menu loop.
///
/// # Errors
///
/// Returns an error if loading the data fails or a prompt cannot be shown.
#[allow(clippy::too_many_lines)]
pub fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let records = ctx.load_records()?;
    let ratios = compute_ratios(&records, &ctx.config.bands);
    let gazetteer = ctx.gazetteer()?;

    println!("Housing Affordability Explorer");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let mut last_map: Option<(ViewKey, ZipMapOutput)> = None;

    loop {
        println!();
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::Cities => {
                let income = prompt_optional::<f64>("Annual income ceiling (empty for none)")?;
                let year = prompt_optional::<i32>("Year (empty for latest)")?;

                let sort_labels: Vec<&str> = SortKey::all().iter().map(|k| k.label()).collect();
                let sort = SortKey::all()[Select::new()
                    .with_prompt("Sort by")
                    .items(&sort_labels)
                    .default(0)
                    .interact()?];

                let pool = income.map_or_else(|| ratios.clone(), |i| filter_by_income(&ratios, i));
                let names: Vec<String> = metro_options(&pool).into_iter().map(|(name, _)| name).collect();
                let metros = if names.is_empty() {
                    None
                } else {
                    let defaults = vec![true; names.len()];
                    let chosen = MultiSelect::new()
                        .with_prompt("Metros to show (space=toggle, a=all, enter=confirm)")
                        .items(&names)
                        .defaults(&defaults)
                        .max_length(20)
                        .interact()?;
                    Some(chosen.into_iter().map(|i| names[i].clone()).collect())
                };

                let params = CityViewParams {
                    year,
                    income,
                    sort,
                    metros,
                };
                match city_view(&ratios, &params, &ctx.config) {
                    Ok(view) => print_city_view(&view),
                    Err(e) => println!("{e}"),
                }
            }
            Action::ZipMap => {
                let income = prompt_optional::<f64>("Annual income ceiling (empty for none)")?;
                let pool = income.map_or_else(|| records.clone(), |i| filter_by_income(&records, i));
                let options = metro_options(&pool);
                if options.is_empty() {
                    println!("No metro has ZIP codes at or below that income.");
                    continue;
                }

                let names: Vec<&str> = options.iter().map(|(name, _)| name.as_str()).collect();
                let choice = Select::new()
                    .with_prompt("Metro")
                    .items(&names)
                    .default(0)
                    .max_length(20)
                    .interact()?;
                let (name, code) = &options[choice];

                let key = ViewKey {
                    city: name.clone(),
                    income: income.unwrap_or(f64::INFINITY),
                };
                if let Some((_, map)) = last_map.as_ref().filter(|(k, _)| !view_changed(Some(k), &key)) {
                    log::debug!("Selection unchanged, reusing the last map");
                    print_zip_map(map);
                    continue;
                }

                let Some(year) = zip_map_year(&records, code, income, None) else {
                    continue;
                };
                if let Some(map) = build_zip_map(ctx, &records, (name.as_str(), code.as_str()), year, income, &gazetteer)? {
                    print_zip_map(&map);
                    last_map = Some((key, map));
                }
            }
            Action::History => print_history(&build_history(&ratios, &ctx.config)),
            Action::Bands => print_bands(&ctx.config.bands, ctx.config.affordable_threshold),
            Action::Budget => {
                let Some(income) = prompt_optional::<f64>("Annual income")? else {
                    continue;
                };
                let rent = prompt_optional::<f64>("Monthly rent (empty to skip)")?;
                match compute_budget(&ctx.config, income, rent) {
                    Ok(budget) => print_budget(&budget),
                    Err(e) => println!("{e}"),
                }
            }
            Action::Quit => break,
        }
    }

    log::debug!(
        "Gazetteer cache: {} hits, {} misses",
        gazetteer.hits(),
        gazetteer.misses()
    );
    Ok(())
}

/// Parses a prompt answer. Blank input is `None`; thousands separators and
/// dollar signs are ignored.
fn parse_optional<T: FromStr>(input: &str) -> Result<Option<T>, T::Err> {
    let cleaned = input.trim().replace([',', '$'], "");
    if cleaned.is_empty() {
        Ok(None)
    } else {
        cleaned.parse().map(Some)
    }
}

/// Prompts for an optional value, asking again until the answer parses.
fn prompt_optional<T: FromStr>(prompt: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T::Err: std::fmt::Display,
{
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            parse_optional::<T>(input)
                .map(|_| ())
                .map_err(|e| format!("'{}' is not valid: {e}", input.trim()))
        })
        .interact_text()?;

    Ok(parse_optional::<T>(&input).map_err(|e| e.to_string())?)
}
