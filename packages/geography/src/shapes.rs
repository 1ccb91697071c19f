//! Per-metro ZCTA boundary files.
//!
//! Each metro has a `<CITY>.geojson` `FeatureCollection` of ZCTA polygons.
//! Different Census vintages name the ZIP property differently, so the key
//! is taken from the first of [`ZCTA_PROPERTIES`] present on a feature.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use afford_map_geography_models::Coordinates;
use afford_map_housing_models::ZipCode;
use geo::{Centroid, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson, JsonValue};

use crate::GeographyError;

/// Feature properties that may carry the ZIP code, in lookup order.
pub const ZCTA_PROPERTIES: [&str; 4] = ["ZCTA5CE10", "ZCTA", "ZCTA5CE20", "GEOID10"];

/// ZCTA polygons for one metro.
#[derive(Debug, Clone)]
pub struct CityShapes {
    city_code: String,
    collection: FeatureCollection,
    key_property: Option<&'static str>,
    keys: BTreeMap<ZipCode, usize>,
}

/// Path of a metro's shape file inside `dir`.
#[must_use]
pub fn city_shapes_path(dir: &Path, city_code: &str) -> PathBuf {
    dir.join(format!("{city_code}.geojson"))
}

/// Loads `<dir>/<city_code>.geojson`.
///
/// Returns `Ok(None)` when the file does not exist, which callers treat as
/// "no map for this metro" rather than a failure.
///
/// # Errors
///
/// * If the file exists but cannot be read
/// * If the file is not a `GeoJSON` `FeatureCollection`
pub fn load_city_shapes(dir: &Path, city_code: &str) -> Result<Option<CityShapes>, GeographyError> {
    let path = city_shapes_path(dir, city_code);
    if !path.is_file() {
        log::warn!("No shape file for {city_code} at {}", path.display());
        return Ok(None);
    }

    let text = std::fs::read_to_string(&path)?;
    let shapes = CityShapes::from_geojson_str(city_code, &text)?;
    log::info!(
        "Loaded {} ZCTA shapes for {city_code} from {}",
        shapes.keys.len(),
        path.display()
    );
    Ok(Some(shapes))
}

fn property_zip(value: &JsonValue) -> Option<ZipCode> {
    match value {
        JsonValue::String(s) => ZipCode::parse(s),
        JsonValue::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .and_then(ZipCode::from_number),
        _ => None,
    }
}

fn feature_zip(feature: &Feature) -> Option<(&'static str, ZipCode)> {
    ZCTA_PROPERTIES.iter().find_map(|name| {
        feature
            .property(name)
            .and_then(property_zip)
            .map(|zip| (*name, zip))
    })
}

fn feature_polygon(feature: &Feature) -> Option<MultiPolygon<f64>> {
    let geometry = feature.geometry.clone()?;
    match geo::Geometry::<f64>::try_from(geometry).ok()? {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

impl CityShapes {
    /// Parses a metro's `GeoJSON` text.
    ///
    /// Features without a recognizable ZIP property are kept in the
    /// collection but are not addressable by ZIP code.
    ///
    /// # Errors
    ///
    /// * If the text is not valid `GeoJSON`
    /// * If it is not a `FeatureCollection`
    pub fn from_geojson_str(city_code: &str, text: &str) -> Result<Self, GeographyError> {
        let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
            return Err(GeographyError::InvalidShapes {
                message: format!("{city_code} shapes are not a FeatureCollection"),
            });
        };

        let mut key_property = None;
        let mut keys = BTreeMap::new();
        for (i, feature) in collection.features.iter().enumerate() {
            if let Some((property, zip)) = feature_zip(feature) {
                key_property.get_or_insert(property);
                keys.entry(zip).or_insert(i);
            }
        }

        if keys.is_empty() && !collection.features.is_empty() {
            log::warn!(
                "{city_code} shapes have none of the ZIP properties {}",
                ZCTA_PROPERTIES.join(", ")
            );
        }

        Ok(Self {
            city_code: city_code.to_string(),
            collection,
            key_property,
            keys,
        })
    }

    /// Metro code these shapes belong to.
    #[must_use]
    pub fn city_code(&self) -> &str {
        &self.city_code
    }

    /// The parsed collection, for handing to a map renderer.
    #[must_use]
    pub const fn feature_collection(&self) -> &FeatureCollection {
        &self.collection
    }

    /// Name of the property that carries the ZIP code, e.g. `ZCTA5CE10`.
    #[must_use]
    pub const fn key_property(&self) -> Option<&'static str> {
        self.key_property
    }

    /// Maps each ZIP code to the index of its feature.
    #[must_use]
    pub const fn zcta_keys(&self) -> &BTreeMap<ZipCode, usize> {
        &self.keys
    }

    /// Whether a polygon exists for `zip`.
    #[must_use]
    pub fn covers(&self, zip: &ZipCode) -> bool {
        self.keys.contains_key(zip)
    }

    /// Polygon of `zip`, if present and polygonal.
    #[must_use]
    pub fn polygon(&self, zip: &ZipCode) -> Option<MultiPolygon<f64>> {
        let index = *self.keys.get(zip)?;
        feature_polygon(&self.collection.features[index])
    }

    /// Centroid of `zip`'s polygon.
    #[must_use]
    pub fn centroid(&self, zip: &ZipCode) -> Option<Coordinates> {
        let point = self.polygon(zip)?.centroid()?;
        Coordinates::resolved(point.y(), point.x())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const ATL_SHAPES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "ZCTA5CE10": "30301" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-84.4, 33.7], [-84.2, 33.7], [-84.2, 33.9], [-84.4, 33.9], [-84.4, 33.7]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "ZCTA5CE10": "30302" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[-84.0, 33.0], [-83.8, 33.0], [-83.8, 33.2], [-84.0, 33.2], [-84.0, 33.0]]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "unlabelled" },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn indexes_by_first_zip_property() {
        let shapes = CityShapes::from_geojson_str("ATL", ATL_SHAPES).unwrap();
        assert_eq!(shapes.key_property(), Some("ZCTA5CE10"));
        assert_eq!(shapes.zcta_keys().len(), 2);
        assert!(shapes.covers(&ZipCode::parse("30301").unwrap()));
        assert!(!shapes.covers(&ZipCode::parse("30399").unwrap()));
        assert_eq!(shapes.feature_collection().features.len(), 3);
    }

    #[test]
    fn falls_back_across_property_names() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "GEOID10": "2134" }, "geometry": null },
                { "type": "Feature", "properties": { "ZCTA": 2135 }, "geometry": null }
            ]
        }"#;
        let shapes = CityShapes::from_geojson_str("BOS", text).unwrap();
        assert!(shapes.covers(&ZipCode::parse("02134").unwrap()));
        assert!(shapes.covers(&ZipCode::parse("02135").unwrap()));
    }

    #[test]
    fn centroid_of_square() {
        let shapes = CityShapes::from_geojson_str("ATL", ATL_SHAPES).unwrap();
        let point = shapes.centroid(&ZipCode::parse("30301").unwrap()).unwrap();
        assert!((point.latitude - 33.8).abs() < 1e-9);
        assert!((point.longitude - -84.3).abs() < 1e-9);

        let point = shapes.centroid(&ZipCode::parse("30302").unwrap()).unwrap();
        assert!((point.latitude - 33.1).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_collections() {
        let text = r#"{ "type": "Point", "coordinates": [1.0, 2.0] }"#;
        assert!(matches!(
            CityShapes::from_geojson_str("ATL", text),
            Err(GeographyError::InvalidShapes { .. })
        ));
        assert!(matches!(
            CityShapes::from_geojson_str("ATL", "{ not json"),
            Err(GeographyError::GeoJson(_))
        ));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = std::env::temp_dir().join("afford_map_no_shapes_here");
        assert!(load_city_shapes(&dir, "ZZZ").unwrap().is_none());
    }

    #[test]
    fn loads_from_disk() {
        let dir = std::env::temp_dir().join(format!("afford_map_shapes_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(city_shapes_path(&dir, "ATL"), ATL_SHAPES).unwrap();

        let shapes = load_city_shapes(&dir, "ATL").unwrap().unwrap();
        assert_eq!(shapes.city_code(), "ATL");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
