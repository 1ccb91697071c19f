#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate and ZIP map row types.
//!
//! A [`ZipMapRow`] is what a choropleth layer draws: one ZIP code's ratio
//! record plus a representative point and a ratio clipped for the color
//! scale.

use afford_map_housing_models::{HousingRecord, HousingRow, RatioRecord};
use serde::{Deserialize, Serialize};

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Builds a point, returning `None` for non-finite values or the
    /// `(0, 0)` placeholder that geocoders use for "not found".
    #[must_use]
    pub fn resolved(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if latitude == 0.0 && longitude == 0.0 {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }
}

/// One ZIP code ready for the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipMapRow {
    /// Underlying ratio record.
    #[serde(flatten)]
    pub record: RatioRecord,
    /// Representative point of the ZIP code.
    pub coordinates: Coordinates,
    /// Ratio clamped into the color scale range.
    pub ratio_for_map: Option<f64>,
}

impl HousingRow for ZipMapRow {
    fn housing_record(&self) -> &HousingRecord {
        &self.record.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_and_non_finite_are_unresolved() {
        assert_eq!(Coordinates::resolved(0.0, 0.0), None);
        assert_eq!(Coordinates::resolved(f64::NAN, -84.4), None);
        assert_eq!(Coordinates::resolved(33.7, f64::INFINITY), None);
    }

    #[test]
    fn a_single_zero_axis_is_resolved() {
        let point = Coordinates::resolved(0.0, 32.5).unwrap();
        assert!((point.longitude - 32.5).abs() < f64::EPSILON);
    }
}
