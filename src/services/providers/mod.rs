// src/services/providers/mod.rs
// DOCUMENTATION: Location provider strategies
// PURPOSE: One interface for every geocoding source the resolver can fall back to

pub mod google_geocoding;
pub mod google_maps_client;
pub mod google_text_search;
pub mod nominatim;

pub use google_geocoding::GoogleGeocodingProvider;
pub use google_maps_client::GoogleMapsClient;
pub use google_text_search::GoogleTextSearchProvider;
pub use nominatim::NominatimProvider;

use crate::errors::ResolveError;
use crate::models::Coordinate;
use crate::services::geo::RegionBounds;
use async_trait::async_trait;
use std::time::Duration;

/// What a provider is asked to locate
#[derive(Debug, Clone)]
pub struct ProviderQuery {
    pub restaurant_id: String,
    /// Latin-script name, geocodes best against global map data
    pub english_name: Option<String>,
    /// Arabic or other localized name
    pub localized_name: Option<String>,
    /// Caller's position, used to choose between branches
    pub reference: Option<Coordinate>,
    pub region: RegionBounds,
}

impl ProviderQuery {
    /// English name when known, otherwise the localized one
    pub fn preferred_name(&self) -> Result<&str, ResolveError> {
        self.english_name
            .as_deref()
            .or(self.localized_name.as_deref())
            .ok_or_else(|| ResolveError::InvalidInput("restaurant has no name".to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.english_name
            .as_deref()
            .into_iter()
            .chain(self.localized_name.as_deref())
    }
}

/// A coordinate proposed by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderHit {
    pub coordinate: Coordinate,
    /// Provider's own label for the place (diagnostics only)
    pub label: Option<String>,
}

/// One step of the resolution waterfall
/// DOCUMENTATION: Implementations catch their own transport failures and
/// report them as `ResolveError::ProviderUnavailable`; the resolver decides
/// what happens next.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Stable identifier reported as `source_provider_id`
    fn id(&self) -> &'static str;

    /// Whether a missing credential disables this provider
    fn requires_credential(&self) -> bool {
        false
    }

    /// Minimum pause after a live call during batch resolution
    fn pacing(&self) -> Duration;

    async fn try_resolve(&self, query: &ProviderQuery) -> Result<ProviderHit, ResolveError>;
}
