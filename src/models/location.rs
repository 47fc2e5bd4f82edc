// src/models/location.rs
// DOCUMENTATION: Location resolution data structures
// PURPOSE: Queries, coordinates and resolved locations exchanged with the resolver

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Within world bounds and finite
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<Coordinate> for geo_types::Point<f64> {
    fn from(c: Coordinate) -> Self {
        geo_types::Point::new(c.longitude, c.latitude)
    }
}

/// Coordinate already on file for a restaurant
/// DOCUMENTATION: `is_verified` is true only for admin-entered map links or
/// branch records, never for anything a geocoder produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnownCoordinate {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
    #[serde(default)]
    pub is_verified: bool,
}

impl KnownCoordinate {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Stored branch of a restaurant (trusted data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl BranchRecord {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Input to location resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RestaurantLocationQuery {
    #[serde(default)]
    pub restaurant_id: String,

    #[validate(length(max = 300))]
    #[serde(default, alias = "name")]
    pub primary_name: String,

    #[validate(length(max = 300))]
    #[serde(default)]
    pub alternate_name: Option<String>,

    #[serde(default)]
    pub known_coordinate: Option<KnownCoordinate>,

    /// Admin-entered map link (Google Maps share URL)
    #[serde(default)]
    pub map_link: Option<String>,

    #[serde(default)]
    pub branches: Vec<BranchRecord>,
}

impl RestaurantLocationQuery {
    pub fn named(restaurant_id: &str, primary_name: &str) -> Self {
        Self {
            restaurant_id: restaurant_id.to_string(),
            primary_name: primary_name.to_string(),
            alternate_name: None,
            known_coordinate: None,
            map_link: None,
            branches: Vec::new(),
        }
    }

    pub fn with_alternate(mut self, alternate_name: &str) -> Self {
        self.alternate_name = Some(alternate_name.to_string());
        self
    }

    pub fn with_known(mut self, coordinate: Coordinate, is_verified: bool) -> Self {
        self.known_coordinate = Some(KnownCoordinate {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            is_verified,
        });
        self
    }

    /// Non-blank names in declaration order
    pub fn names(&self) -> Vec<&str> {
        std::iter::once(self.primary_name.as_str())
            .chain(self.alternate_name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect()
    }
}

/// How trustworthy a resolved location is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Verified,
    Approximate,
    None,
}

/// Output of location resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub confidence: Confidence,
    /// Provider that produced an approximate location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_provider_id: Option<String>,
}

impl ResolvedLocation {
    pub fn verified(coordinate: Coordinate) -> Self {
        Self {
            latitude: Some(coordinate.latitude),
            longitude: Some(coordinate.longitude),
            confidence: Confidence::Verified,
            source_provider_id: None,
        }
    }

    pub fn approximate(coordinate: Coordinate, provider_id: &str) -> Self {
        Self {
            latitude: Some(coordinate.latitude),
            longitude: Some(coordinate.longitude),
            confidence: Confidence::Approximate,
            source_provider_id: Some(provider_id.to_string()),
        }
    }

    pub fn none() -> Self {
        Self {
            latitude: None,
            longitude: None,
            confidence: Confidence::None,
            source_provider_id: None,
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }

    pub fn is_located(&self) -> bool {
        self.confidence != Confidence::None
    }
}

/// Request body for POST /locations/resolve
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResolveRequest {
    #[validate]
    #[serde(flatten)]
    pub query: RestaurantLocationQuery,
    #[serde(default)]
    pub reference: Option<Coordinate>,
}

/// Request body for POST /locations/resolve-batch
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResolveBatchRequest {
    #[validate(length(min = 1, max = 500))]
    pub queries: Vec<RestaurantLocationQuery>,
    #[serde(default)]
    pub reference: Option<Coordinate>,
}

/// One entry of a resolution response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRestaurant {
    pub restaurant_id: String,
    #[serde(flatten)]
    pub location: ResolvedLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_label: Option<String>,
}

/// Restaurant position submitted for distance ordering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionedRestaurant {
    pub id: String,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

/// Request body for POST /locations/nearest
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NearestRequest {
    #[validate(length(max = 2000))]
    pub restaurants: Vec<PositionedRestaurant>,
    pub reference: Coordinate,
}
