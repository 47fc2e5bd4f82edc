// src/services/providers/google_geocoding.rs
// DOCUMENTATION: Primary location provider (Google Geocoding API)

use super::google_maps_client::{is_acceptable_place, GoogleMapsClient};
use super::{LocationProvider, ProviderHit, ProviderQuery};
use crate::errors::ResolveError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct GoogleGeocodingProvider {
    client: Arc<GoogleMapsClient>,
    pacing: Duration,
}

impl GoogleGeocodingProvider {
    pub fn new(client: Arc<GoogleMapsClient>, pacing: Duration) -> Self {
        Self { client, pacing }
    }
}

#[async_trait]
impl LocationProvider for GoogleGeocodingProvider {
    fn id(&self) -> &'static str {
        "google_geocoding"
    }

    fn requires_credential(&self) -> bool {
        true
    }

    fn pacing(&self) -> Duration {
        self.pacing
    }

    async fn try_resolve(&self, query: &ProviderQuery) -> Result<ProviderHit, ResolveError> {
        let name = query.preferred_name()?;
        let address = format!("{}, {}", name, query.region.name);

        let results = self.client.geocode(&address, "kw").await?;

        results
            .into_iter()
            .filter(|r| is_acceptable_place(&r.types))
            .map(|r| ProviderHit {
                coordinate: r.geometry.coordinate(),
                label: r.formatted_address,
            })
            .find(|hit| query.region.contains(&hit.coordinate))
            .ok_or(ResolveError::NoMatch)
    }
}
