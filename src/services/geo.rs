// src/services/geo.rs
// DOCUMENTATION: Geographic helpers for the Kuwait service region
// PURPOSE: Region bounding box, Haversine distance, distance ordering and GeoJSON output

use crate::models::{Coordinate, ResolvedRestaurant};
use geo_types::Point;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Region boundary definition
/// DOCUMENTATION: Geocoded hits outside these bounds are discarded
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBounds {
    /// Region name (for logging)
    pub name: String,
    /// Minimum latitude (south)
    pub min_lat: f64,
    /// Maximum latitude (north)
    pub max_lat: f64,
    /// Minimum longitude (west)
    pub min_lng: f64,
    /// Maximum longitude (east)
    pub max_lng: f64,
}

impl RegionBounds {
    /// Service region of the product
    pub fn kuwait() -> Self {
        RegionBounds {
            name: "Kuwait".to_string(),
            min_lat: 28.5,
            max_lat: 30.1,
            min_lng: 46.5,
            max_lng: 48.5,
        }
    }

    /// Inclusive containment check
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        coordinate.is_valid()
            && coordinate.latitude >= self.min_lat
            && coordinate.latitude <= self.max_lat
            && coordinate.longitude >= self.min_lng
            && coordinate.longitude <= self.max_lng
    }
}

/// Great-circle distance between two points in kilometers
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let a: Point<f64> = from.into();
    let b: Point<f64> = to.into();

    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let delta_lat = (b.y() - a.y()).to_radians();
    let delta_lng = (b.x() - a.x()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Human label for a distance: metres under 1 km, one decimal otherwise
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as i64)
    } else {
        format!("{:.1} km", km)
    }
}

/// Index of the coordinate nearest to `reference`
pub fn nearest_index(candidates: &[Coordinate], reference: Coordinate) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .map(|(idx, c)| (idx, haversine_km(reference, *c)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(idx, _)| idx)
}

/// Sort items by distance from `reference`
/// DOCUMENTATION: Items without a position go last; the sort is stable so
/// equal distances keep their input order
pub fn sort_by_distance<T, F>(items: &mut [T], reference: Coordinate, position: F)
where
    F: Fn(&T) -> Option<Coordinate>,
{
    items.sort_by(|a, b| {
        let da = position(a).map(|c| haversine_km(reference, c));
        let db = position(b).map(|c| haversine_km(reference, c));
        match (da, db) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}

/// Build a GeoJSON FeatureCollection of located restaurants for map display
pub fn to_feature_collection(results: &[ResolvedRestaurant]) -> FeatureCollection {
    let features = results
        .iter()
        .filter_map(|r| {
            let coordinate = r.location.coordinate()?;

            let mut properties = JsonObject::new();
            properties.insert(
                "restaurant_id".to_string(),
                serde_json::Value::String(r.restaurant_id.clone()),
            );
            properties.insert(
                "confidence".to_string(),
                serde_json::to_value(r.location.confidence).unwrap_or_default(),
            );
            if let Some(ref provider) = r.location.source_provider_id {
                properties.insert(
                    "source_provider_id".to_string(),
                    serde_json::Value::String(provider.clone()),
                );
            }

            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    coordinate.longitude,
                    coordinate.latitude,
                ]))),
                id: Some(geojson::feature::Id::String(r.restaurant_id.clone())),
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
