#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Affordability analytics over loaded housing records.
//!
//! A straight pipeline of pure functions:
//!
//! 1. [`ratio`] derives the price-to-income ratio and display category for
//!    each ZIP row.
//! 2. [`filter`] restricts rows to an income ceiling or a year.
//! 3. [`aggregate`] rolls ZIP rows up to one median row per metro and year.
//! 4. [`history`] repeats the roll-up across every year for the time
//!    series.
//! 5. [`view`] sorts and selects metros for the ranking panel.
//!
//! Nothing here performs I/O, and every function returns the same output
//! for the same input, so callers may memoize freely.

pub mod aggregate;
pub mod filter;
pub mod history;
pub mod ratio;
pub mod view;

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A caller-supplied parameter is out of range.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of what went wrong.
        message: String,
    },
}
