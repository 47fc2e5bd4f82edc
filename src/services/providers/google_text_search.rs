// src/services/providers/google_text_search.rs
// DOCUMENTATION: Secondary location provider (Google Places Text Search)
// PURPOSE: Resolve restaurants the geocoder misses, choosing the nearest branch

use super::google_maps_client::{is_acceptable_place, GoogleMapsClient};
use super::{LocationProvider, ProviderHit, ProviderQuery};
use crate::errors::ResolveError;
use crate::services::geo::nearest_index;
use crate::services::name_match::is_exact_match;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Places Text Search provider
/// DOCUMENTATION: Candidates must carry a name that matches one of the
/// restaurant's names (see `is_exact_match`) and lie inside the region.
/// When several branches survive, the one nearest the reference wins.
/// If the Places endpoint itself is unavailable, the same query is retried
/// through the Geocoding endpoint.
pub struct GoogleTextSearchProvider {
    client: Arc<GoogleMapsClient>,
    pacing: Duration,
}

impl GoogleTextSearchProvider {
    pub fn new(client: Arc<GoogleMapsClient>, pacing: Duration) -> Self {
        Self { client, pacing }
    }

    async fn search(&self, query: &ProviderQuery, text: &str) -> Result<ProviderHit, ResolveError> {
        let places = self.client.text_search(text, "kw").await?;

        let candidates: Vec<ProviderHit> = places
            .into_iter()
            .filter(|p| query.names().any(|name| is_exact_match(name, &p.name)))
            .map(|p| ProviderHit {
                coordinate: p.geometry.coordinate(),
                label: Some(p.name),
            })
            .filter(|hit| query.region.contains(&hit.coordinate))
            .collect();

        log::debug!(
            "Text search for {} kept {} matching candidates",
            query.restaurant_id,
            candidates.len()
        );

        let index = match query.reference {
            Some(reference) => {
                let coordinates: Vec<_> = candidates.iter().map(|c| c.coordinate).collect();
                nearest_index(&coordinates, reference)
            }
            None if candidates.is_empty() => None,
            None => Some(0),
        };

        index
            .and_then(|i| candidates.into_iter().nth(i))
            .ok_or(ResolveError::NoMatch)
    }

    async fn geocode_fallback(
        &self,
        query: &ProviderQuery,
        text: &str,
    ) -> Result<ProviderHit, ResolveError> {
        let results = self.client.geocode(text, "kw").await?;

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

#[async_trait]
impl LocationProvider for GoogleTextSearchProvider {
    fn id(&self) -> &'static str {
        "google_text_search"
    }

    fn requires_credential(&self) -> bool {
        true
    }

    fn pacing(&self) -> Duration {
        self.pacing
    }

    async fn try_resolve(&self, query: &ProviderQuery) -> Result<ProviderHit, ResolveError> {
        let name = query.preferred_name()?;
        let text = format!("\"{}\" {}", name, query.region.name);

        match self.search(query, &text).await {
            Err(ResolveError::ProviderUnavailable(reason)) => {
                log::warn!(
                    "Places text search unavailable ({}), retrying via geocoding",
                    reason
                );
                self.geocode_fallback(query, &text).await
            }
            other => other,
        }
    }
}
