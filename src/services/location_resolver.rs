// src/services/location_resolver.rs
// DOCUMENTATION: Restaurant location resolution waterfall
// PURPOSE: Pick the best coordinate for a restaurant from stored data, cache and geocoding providers
//
// ORDER:
// 1. Verified data: known coordinate flagged verified, admin map link, branch records
// 2. Cache (keyed by the lowercased name composite, failures included)
// 3. Providers in configured order: Google Geocoding, Places Text Search, Nominatim
// 4. Nothing found: cache and return `Confidence::None`

use crate::config::Config;
use crate::errors::ResolveError;
use crate::models::{Coordinate, ResolvedLocation, ResolvedRestaurant, RestaurantLocationQuery};
use crate::services::cache::{CacheStats, LocationCache};
use crate::services::geo::{format_distance, haversine_km, nearest_index, RegionBounds};
use crate::services::map_link::parse_map_link;
use crate::services::name_match::{cache_key, split_names};
use crate::services::providers::{
    GoogleGeocodingProvider, GoogleMapsClient, GoogleTextSearchProvider, LocationProvider,
    NominatimProvider, ProviderQuery,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Location resolver service
/// DOCUMENTATION: Owns its cache and provider list. Waterfall runs are
/// serialized so concurrent requests for one name still make a single
/// live attempt.
pub struct LocationResolver {
    providers: Vec<Box<dyn LocationProvider>>,
    cache: LocationCache,
    region: RegionBounds,
    waterfall_lock: Mutex<()>,
}

/// Result of one resolution plus the pause owed to upstream providers
struct Resolution {
    location: ResolvedLocation,
    pause: Option<Duration>,
}

impl LocationResolver {
    pub fn new(
        providers: Vec<Box<dyn LocationProvider>>,
        cache: LocationCache,
        region: RegionBounds,
    ) -> Self {
        Self {
            providers,
            cache,
            region,
            waterfall_lock: Mutex::new(()),
        }
    }

    /// Build the production waterfall from configuration
    pub fn from_config(config: &Config) -> Self {
        let google = Arc::new(GoogleMapsClient::new(
            config.google_maps_api_key.clone(),
            config.google_maps_base_url.clone(),
        ));

        let providers: Vec<Box<dyn LocationProvider>> = vec![
            Box::new(GoogleGeocodingProvider::new(
                Arc::clone(&google),
                config.google_batch_delay(),
            )),
            Box::new(GoogleTextSearchProvider::new(
                google,
                config.google_batch_delay(),
            )),
            Box::new(NominatimProvider::new(
                config.nominatim_base_url.clone(),
                config.nominatim_user_agent.clone(),
                config.nominatim_batch_delay(),
            )),
        ];

        Self::new(providers, LocationCache::new(), RegionBounds::kuwait())
    }

    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Resolve a single restaurant
    /// DOCUMENTATION: Never fails; provider errors degrade to the next
    /// source and finally to `Confidence::None`
    pub async fn resolve(
        &self,
        query: &RestaurantLocationQuery,
        reference: Option<Coordinate>,
    ) -> ResolvedLocation {
        self.resolve_paced(query, reference).await.location
    }

    /// Resolve many restaurants strictly one after another
    /// DOCUMENTATION: After every query that reached a live provider the
    /// batch sleeps for the longest pacing among the providers called.
    /// Output order matches input order.
    pub async fn resolve_many(
        &self,
        queries: &[RestaurantLocationQuery],
        reference: Option<Coordinate>,
    ) -> Vec<ResolvedRestaurant> {
        let mut results = Vec::with_capacity(queries.len());

        for (idx, query) in queries.iter().enumerate() {
            let resolution = self.resolve_paced(query, reference).await;
            results.push(with_distance(&query.restaurant_id, resolution.location, reference));

            if let Some(pause) = resolution.pause {
                if idx + 1 < queries.len() && !pause.is_zero() {
                    log::debug!("Pacing batch for {:?}", pause);
                    tokio::time::sleep(pause).await;
                }
            }
        }

        let located = results.iter().filter(|r| r.location.is_located()).count();
        log::info!("Resolved batch: {}/{} located", located, results.len());

        results
    }

    pub async fn clear_cache(&self) -> usize {
        self.cache.clear().await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    async fn resolve_paced(
        &self,
        query: &RestaurantLocationQuery,
        reference: Option<Coordinate>,
    ) -> Resolution {
        if let Some(coordinate) = verified_coordinate(query, reference) {
            log::debug!("Restaurant {} has verified location", query.restaurant_id);
            return Resolution {
                location: ResolvedLocation::verified(coordinate),
                pause: None,
            };
        }

        let names = query.names();
        if names.is_empty() {
            log::warn!(
                "{}",
                ResolveError::InvalidInput(format!(
                    "restaurant {} has no name",
                    query.restaurant_id
                ))
            );
            return Resolution {
                location: ResolvedLocation::none(),
                pause: None,
            };
        }

        let key = cache_key(&names);
        if let Some(cached) = self.cache.get(&key).await {
            return Resolution {
                location: cached,
                pause: None,
            };
        }

        let _guard = self.waterfall_lock.lock().await;

        // another request may have filled the entry while we waited
        if let Some(cached) = self.cache.get(&key).await {
            return Resolution {
                location: cached,
                pause: None,
            };
        }

        let (english, localized) = split_names(&names);
        let provider_query = ProviderQuery {
            restaurant_id: query.restaurant_id.clone(),
            english_name: english.map(str::to_string),
            localized_name: localized.map(str::to_string),
            reference,
            region: self.region.clone(),
        };

        let (location, pause) = self.run_providers(&provider_query).await;
        self.cache.set(key, location.clone()).await;

        Resolution { location, pause }
    }

    async fn run_providers(&self, query: &ProviderQuery) -> (ResolvedLocation, Option<Duration>) {
        let mut credential_missing = false;
        let mut pause: Option<Duration> = None;

        for provider in &self.providers {
            if credential_missing && provider.requires_credential() {
                log::debug!("Skipping {}: credential missing", provider.id());
                continue;
            }

            let outcome = provider.try_resolve(query).await;
            pause = Some(pause.unwrap_or_default().max(provider.pacing()));

            match outcome {
                Ok(hit) if self.region.contains(&hit.coordinate) => {
                    log::info!(
                        "Resolved {} via {} ({:.5}, {:.5})",
                        query.restaurant_id,
                        provider.id(),
                        hit.coordinate.latitude,
                        hit.coordinate.longitude
                    );
                    return (
                        ResolvedLocation::approximate(hit.coordinate, provider.id()),
                        pause,
                    );
                }
                Ok(hit) => {
                    log::debug!(
                        "{} returned a hit outside {} for {}: {:?}",
                        provider.id(),
                        self.region.name,
                        query.restaurant_id,
                        hit.label
                    );
                }
                Err(ResolveError::Configuration(reason)) => {
                    log::warn!("{} not configured: {}", provider.id(), reason);
                    credential_missing = true;
                }
                Err(ResolveError::NoMatch) => {
                    log::debug!("{} found no match for {}", provider.id(), query.restaurant_id);
                }
                Err(e) => {
                    log::warn!("{} failed for {}: {}", provider.id(), query.restaurant_id, e);
                }
            }
        }

        log::info!("No location found for {}", query.restaurant_id);
        (ResolvedLocation::none(), pause)
    }
}

/// Trusted coordinate for a restaurant, if any
/// DOCUMENTATION: A known coordinate counts only when flagged verified.
/// Branch records are trusted; the branch nearest the reference wins.
fn verified_coordinate(
    query: &RestaurantLocationQuery,
    reference: Option<Coordinate>,
) -> Option<Coordinate> {
    if let Some(known) = query.known_coordinate {
        if known.is_verified && known.coordinate().is_valid() {
            return Some(known.coordinate());
        }
    }

    if let Some(coordinate) = query.map_link.as_deref().and_then(parse_map_link) {
        return Some(coordinate);
    }

    let branches: Vec<Coordinate> = query
        .branches
        .iter()
        .map(|b| b.coordinate())
        .filter(Coordinate::is_valid)
        .collect();

    match reference {
        Some(reference) => nearest_index(&branches, reference).map(|i| branches[i]),
        None => branches.first().copied(),
    }
}

/// Attach distance from `reference` to a resolved location
pub fn with_distance(
    restaurant_id: &str,
    location: ResolvedLocation,
    reference: Option<Coordinate>,
) -> ResolvedRestaurant {
    let distance_km = reference
        .zip(location.coordinate())
        .map(|(from, to)| (haversine_km(from, to) * 100.0).round() / 100.0);

    ResolvedRestaurant {
        restaurant_id: restaurant_id.to_string(),
        location,
        distance_km,
        distance_label: distance_km.map(format_distance),
    }
}
