#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the housing affordability map.
//!
//! Ranks metro areas by price-to-income ratio, builds per-ZIP map rows for
//! a metro, prints the year-over-year history, and shows the configured
//! affordability bands. With no subcommand it starts an interactive
//! `dialoguer` session.
//!
//! Uses `indicatif-log-bridge` (via [`afford_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod commands;
mod interactive;

use std::path::PathBuf;

use afford_map_analytics_models::{CityViewParams, SortKey};
use afford_map_config::{AffordabilityConfig, DataPaths};
use clap::{Parser, Subcommand};

use crate::commands::{Context, ZipArgs};

/// Explore housing affordability by metro area and ZIP code.
#[derive(Parser)]
#[command(name = "afford_map")]
#[command(about = "Explore housing affordability by metro area and ZIP code")]
struct Cli {
    /// TOML file overriding the default affordability settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Housing CSV (defaults to `$AFFORD_MAP_DATA` or `data/HouseTS.csv`).
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Subcommand to execute. Starts the interactive session when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Rank metro areas by affordability.
    Cities {
        /// Year to show (default: latest in the data).
        #[arg(long)]
        year: Option<i32>,

        /// Only aggregate ZIP codes with per-capita income at or below this.
        #[arg(long)]
        income: Option<f64>,

        /// Ordering: name, ratio, price, or income.
        #[arg(long, default_value_t = SortKey::CityName)]
        sort: SortKey,

        /// Restrict to these metro display names (repeatable).
        #[arg(long = "metro")]
        metros: Vec<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Per-ZIP affordability for one metro, ready for a map.
    Zips {
        /// Metro code or display name (e.g. "ATL").
        #[arg(long)]
        city: String,

        /// Year to show (default: latest for the metro).
        #[arg(long)]
        year: Option<i32>,

        /// Only include ZIP codes with per-capita income at or below this.
        #[arg(long)]
        income: Option<f64>,

        /// Directory of `<CITY>.geojson` shape files.
        #[arg(long)]
        shapes: Option<PathBuf>,

        /// Census ZCTA gazetteer used when a ZIP has no polygon.
        #[arg(long)]
        gazetteer: Option<PathBuf>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Median ratio and tier shares for every year.
    History {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the affordability band table.
    Bands {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show what an annual income can afford.
    Budget {
        /// Annual income.
        #[arg(long)]
        income: f64,

        /// Monthly rent to compare against the rent budget.
        #[arg(long)]
        rent: Option<f64>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = afford_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = AffordabilityConfig::load(cli.config.as_deref())?;
    let mut paths = DataPaths::from_env();
    if let Some(data) = cli.data {
        paths.data_file = data;
    }
    let mut ctx = Context {
        config,
        paths,
        multi,
    };

    match cli.command {
        None => interactive::run(&ctx)?,
        Some(Commands::Cities {
            year,
            income,
            sort,
            metros,
            json,
        }) => {
            let params = CityViewParams {
                year,
                income,
                sort,
                metros: (!metros.is_empty()).then_some(metros),
            };
            commands::cities(&ctx, &params, json)?;
        }
        Some(Commands::Zips {
            city,
            year,
            income,
            shapes,
            gazetteer,
            json,
        }) => {
            let args = ZipArgs {
                city,
                year,
                income,
                shapes,
                gazetteer,
            };
            commands::zips(&mut ctx, args, json)?;
        }
        Some(Commands::History { json }) => commands::history(&ctx, json)?,
        Some(Commands::Bands { json }) => commands::bands(&ctx, json)?,
        Some(Commands::Budget { income, rent, json }) => commands::budget(&ctx, income, rent, json)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cities_sort_defaults_to_name() {
        let cli = Cli::try_parse_from(["afford_map", "cities"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Cities {
                sort: SortKey::CityName,
                ..
            })
        ));
    }

    #[test]
    fn cities_sort_accepts_short_and_long_names() {
        let cli = Cli::try_parse_from(["afford_map", "cities", "--sort", "ratio"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Cities {
                sort: SortKey::Ratio,
                ..
            })
        ));

        let cli =
            Cli::try_parse_from(["afford_map", "cities", "--sort", "per_capita_income"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Cities {
                sort: SortKey::PerCapitaIncome,
                ..
            })
        ));
    }

    #[test]
    fn unknown_sort_key_is_rejected() {
        assert!(Cli::try_parse_from(["afford_map", "cities", "--sort", "size"]).is_err());
    }
}
