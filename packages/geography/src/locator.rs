//! Resolving a ZIP code to a representative point.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use afford_map_geography_models::Coordinates;
use afford_map_housing_models::ZipCode;
use serde::Deserialize;

use crate::{GeographyError, shapes::CityShapes};

/// Looks up a point for a ZIP code.
///
/// `None` means the ZIP code could not be placed and its row is left off
/// the map.
pub trait ZipLocator {
    /// Returns the point for `zip`, if known.
    fn locate(&self, zip: &ZipCode) -> Option<Coordinates>;
}

impl<L: ZipLocator + ?Sized> ZipLocator for &L {
    fn locate(&self, zip: &ZipCode) -> Option<Coordinates> {
        (**self).locate(zip)
    }
}

/// Fixed in-memory table of points.
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    points: BTreeMap<ZipCode, Coordinates>,
}

impl StaticLocator {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a point. Unresolved placeholder points are ignored.
    pub fn insert(&mut self, zip: ZipCode, latitude: f64, longitude: f64) {
        if let Some(point) = Coordinates::resolved(latitude, longitude) {
            self.points.insert(zip, point);
        }
    }

    /// Number of ZIP codes with a point.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(ZipCode, Coordinates)> for StaticLocator {
    fn from_iter<T: IntoIterator<Item = (ZipCode, Coordinates)>>(iter: T) -> Self {
        let mut locator = Self::new();
        for (zip, point) in iter {
            locator.insert(zip, point.latitude, point.longitude);
        }
        locator
    }
}

impl ZipLocator for StaticLocator {
    fn locate(&self, zip: &ZipCode) -> Option<Coordinates> {
        self.points.get(zip).copied()
    }
}

#[derive(Debug, Deserialize)]
struct GazetteerRow {
    #[serde(rename = "GEOID")]
    geoid: String,
    #[serde(rename = "INTPTLAT")]
    latitude: f64,
    #[serde(rename = "INTPTLONG")]
    longitude: f64,
}

/// Points from the Census ZCTA gazetteer file.
///
/// The gazetteer is tab delimited with (among others) `GEOID`, `INTPTLAT`
/// and `INTPTLONG` columns giving each ZCTA's internal point.
#[derive(Debug, Clone, Default)]
pub struct GazetteerLocator {
    points: StaticLocator,
}

impl GazetteerLocator {
    /// Reads a gazetteer from any reader.
    ///
    /// Rows with an unparseable `GEOID` are skipped.
    ///
    /// # Errors
    ///
    /// * If the header is missing a required column
    /// * If a row's coordinates are not numbers
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GeographyError> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut points = StaticLocator::new();
        let mut skipped = 0_usize;
        for row in csv.deserialize::<GazetteerRow>() {
            let row = row?;
            match ZipCode::parse(&row.geoid) {
                Some(zip) => points.insert(zip, row.latitude, row.longitude),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {skipped} gazetteer rows with an invalid GEOID");
        }
        Ok(Self { points })
    }

    /// Reads a gazetteer file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be opened
    /// * If the contents are malformed (see [`Self::from_reader`])
    pub fn from_path(path: &Path) -> Result<Self, GeographyError> {
        let file = std::fs::File::open(path)?;
        let locator = Self::from_reader(file)?;
        log::info!(
            "Loaded {} ZCTA points from {}",
            locator.points.len(),
            path.display()
        );
        Ok(locator)
    }

    /// Number of ZIP codes with a point.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no points were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl ZipLocator for GazetteerLocator {
    fn locate(&self, zip: &ZipCode) -> Option<Coordinates> {
        self.points.locate(zip)
    }
}

/// Points from the centroids of a metro's ZCTA polygons.
#[derive(Debug, Clone, Default)]
pub struct ShapeCentroidLocator {
    points: StaticLocator,
}

impl ShapeCentroidLocator {
    /// Computes the centroid of every ZIP polygon in `shapes`.
    #[must_use]
    pub fn from_shapes(shapes: &CityShapes) -> Self {
        let points: StaticLocator = shapes
            .zcta_keys()
            .keys()
            .filter_map(|zip| shapes.centroid(zip).map(|point| (zip.clone(), point)))
            .collect();
        log::debug!(
            "Computed {} centroids for {}",
            points.len(),
            shapes.city_code()
        );
        Self { points }
    }
}

impl ZipLocator for ShapeCentroidLocator {
    fn locate(&self, zip: &ZipCode) -> Option<Coordinates> {
        self.points.locate(zip)
    }
}

/// Tries `primary`, then `fallback`.
#[derive(Debug, Clone)]
pub struct ChainedLocator<A, B> {
    primary: A,
    fallback: B,
}

impl<A, B> ChainedLocator<A, B> {
    /// Creates a chain.
    pub const fn new(primary: A, fallback: B) -> Self {
        Self { primary, fallback }
    }
}

impl<A: ZipLocator, B: ZipLocator> ZipLocator for ChainedLocator<A, B> {
    fn locate(&self, zip: &ZipCode) -> Option<Coordinates> {
        self.primary
            .locate(zip)
            .or_else(|| self.fallback.locate(zip))
    }
}

#[cfg(test)]
mod tests {
    use crate::shapes::tests::ATL_SHAPES;

    use super::*;

    fn zip(s: &str) -> ZipCode {
        ZipCode::parse(s).unwrap()
    }

    const GAZETTEER: &str = "GEOID\tALAND\tAWATER\tINTPTLAT\tINTPTLONG                 \n\
        02134\t1\t0\t42.357\t-71.129\n\
        30301\t1\t0\t33.75\t-84.39\n\
        99999\t1\t0\t0.0\t0.0\n\
        bogus\t1\t0\t1.0\t1.0\n";

    #[test]
    fn reads_tab_delimited_gazetteer() {
        let locator = GazetteerLocator::from_reader(GAZETTEER.as_bytes()).unwrap();
        assert_eq!(locator.len(), 2);

        let point = locator.locate(&zip("02134")).unwrap();
        assert!((point.latitude - 42.357).abs() < 1e-9);
        assert!((point.longitude - -71.129).abs() < 1e-9);

        assert_eq!(locator.locate(&zip("99999")), None);
        assert_eq!(locator.locate(&zip("10001")), None);
    }

    #[test]
    fn malformed_gazetteer_is_an_error() {
        let text = "GEOID\tINTPTLAT\tINTPTLONG\n02134\tnorth\t-71.1\n";
        assert!(matches!(
            GazetteerLocator::from_reader(text.as_bytes()),
            Err(GeographyError::Csv(_))
        ));
    }

    #[test]
    fn centroids_from_shapes() {
        let shapes = CityShapes::from_geojson_str("ATL", ATL_SHAPES).unwrap();
        let locator = ShapeCentroidLocator::from_shapes(&shapes);
        assert!(locator.locate(&zip("30301")).is_some());
        assert!(locator.locate(&zip("30302")).is_some());
        assert!(locator.locate(&zip("02134")).is_none());
    }

    #[test]
    fn chain_prefers_primary() {
        let mut primary = StaticLocator::new();
        primary.insert(zip("30301"), 1.0, 1.0);
        let mut fallback = StaticLocator::new();
        fallback.insert(zip("30301"), 2.0, 2.0);
        fallback.insert(zip("30302"), 3.0, 3.0);

        let chain = ChainedLocator::new(primary, fallback);
        assert_eq!(chain.locate(&zip("30301")).unwrap().latitude, 1.0);
        assert_eq!(chain.locate(&zip("30302")).unwrap().latitude, 3.0);
        assert!(chain.locate(&zip("30303")).is_none());
    }

    #[test]
    fn static_ignores_placeholder_points() {
        let mut locator = StaticLocator::new();
        locator.insert(zip("30301"), 0.0, 0.0);
        assert!(locator.is_empty());
    }
}
