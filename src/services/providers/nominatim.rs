// src/services/providers/nominatim.rs
// DOCUMENTATION: Last-resort location provider (OpenStreetMap Nominatim)
// PURPOSE: Keyless geocoding, throttled to the public usage policy of 1 request/second

use super::google_maps_client::is_acceptable_place;
use super::{LocationProvider, ProviderHit, ProviderQuery};
use crate::errors::ResolveError;
use crate::models::Coordinate;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// One Nominatim search result (coordinates arrive as strings)
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
    #[serde(default)]
    class: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl NominatimPlace {
    fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.parse().ok()?;
        let lng = self.lon.parse().ok()?;
        Some(Coordinate::new(lat, lng))
    }

    fn tags(&self) -> Vec<String> {
        self.class.iter().chain(self.kind.iter()).cloned().collect()
    }
}

pub struct NominatimProvider {
    client: Client,
    base_url: String,
    user_agent: String,
    pacing: Duration,
    limiter: Limiter,
}

impl NominatimProvider {
    pub fn new(base_url: String, user_agent: String, pacing: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent,
            pacing,
            limiter: RateLimiter::direct(Quota::per_second(NonZeroU32::MIN)),
        }
    }

    async fn search(&self, text: &str) -> Result<Vec<NominatimPlace>, ResolveError> {
        self.limiter.until_ready().await;

        let url = format!("{}/search", self.base_url);
        log::debug!("Nominatim search: q={}", text);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", text),
                ("countrycodes", "kw"),
                ("format", "json"),
                ("limit", "5"),
            ])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT_LANGUAGE, "ar,en")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            log::warn!("Nominatim error {}", status);
            return Err(ResolveError::ProviderUnavailable(format!(
                "Nominatim error {}",
                status
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl LocationProvider for NominatimProvider {
    fn id(&self) -> &'static str {
        "nominatim"
    }

    fn pacing(&self) -> Duration {
        self.pacing
    }

    async fn try_resolve(&self, query: &ProviderQuery) -> Result<ProviderHit, ResolveError> {
        query.preferred_name()?;

        // A failed search for one name does not stop the next name from being tried
        let mut answered = false;
        let mut last_error = None;

        for name in query.names() {
            let places = match self.search(name).await {
                Ok(places) => places,
                Err(ResolveError::ProviderUnavailable(reason)) => {
                    log::warn!("Nominatim search for {:?} failed: {}", name, reason);
                    last_error = Some(ResolveError::ProviderUnavailable(reason));
                    continue;
                }
                Err(e) => return Err(e),
            };
            answered = true;

            let hit = places
                .iter()
                .filter(|p| is_acceptable_place(&p.tags()))
                .filter_map(|p| {
                    p.coordinate().map(|coordinate| ProviderHit {
                        coordinate,
                        label: p.display_name.clone(),
                    })
                })
                .find(|hit| query.region.contains(&hit.coordinate));

            if let Some(hit) = hit {
                return Ok(hit);
            }
        }

        match last_error {
            Some(error) if !answered => Err(error),
            _ => Err(ResolveError::NoMatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geo::RegionBounds;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query(english: Option<&str>, localized: Option<&str>) -> ProviderQuery {
        ProviderQuery {
            restaurant_id: "r1".to_string(),
            english_name: english.map(str::to_string),
            localized_name: localized.map(str::to_string),
            reference: None,
            region: RegionBounds::kuwait(),
        }
    }

    fn provider_for(server: &MockServer) -> NominatimProvider {
        NominatimProvider::new(
            server.uri(),
            "shno-nakel-tests/1.0".to_string(),
            Duration::from_millis(1100),
        )
    }

    #[tokio::test]
    async fn test_parses_string_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Slice"))
            .and(query_param("countrycodes", "kw"))
            .and(header("user-agent", "shno-nakel-tests/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "lat": "29.3375",
                    "lon": "48.0758",
                    "display_name": "Slice, Salmiya, Kuwait",
                    "class": "amenity",
                    "type": "restaurant"
                }
            ])))
            .mount(&server)
            .await;

        let hit = provider_for(&server)
            .try_resolve(&query(Some("Slice"), None))
            .await
            .unwrap();

        assert_eq!(hit.coordinate, Coordinate::new(29.3375, 48.0758));
    }

    #[tokio::test]
    async fn test_tries_localized_name_after_english() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Slice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "سلايس"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "lat": "29.30", "lon": "47.95", "class": "amenity", "type": "fast_food" }
            ])))
            .mount(&server)
            .await;

        let hit = provider_for(&server)
            .try_resolve(&query(Some("Slice"), Some("سلايس")))
            .await
            .unwrap();

        assert_eq!(hit.coordinate, Coordinate::new(29.30, 47.95));
    }

    #[tokio::test]
    async fn test_out_of_region_is_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "lat": "24.71", "lon": "46.67", "class": "amenity", "type": "restaurant" }
            ])))
            .mount(&server)
            .await;

        let result = provider_for(&server)
            .try_resolve(&query(Some("Slice"), None))
            .await;

        assert_eq!(result, Err(ResolveError::NoMatch));
    }

    #[tokio::test]
    async fn test_http_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = provider_for(&server)
            .try_resolve(&query(Some("Slice"), None))
            .await;

        assert!(matches!(result, Err(ResolveError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn test_failed_english_search_still_tries_localized_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Slice"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "سلايس"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "lat": "29.33", "lon": "48.07", "class": "amenity", "type": "restaurant" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let hit = provider_for(&server)
            .try_resolve(&query(Some("Slice"), Some("سلايس")))
            .await
            .unwrap();

        assert_eq!(hit.coordinate, Coordinate::new(29.33, 48.07));
    }

    #[tokio::test]
    async fn test_failed_search_then_empty_result_is_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Slice"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "سلايس"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let result = provider_for(&server)
            .try_resolve(&query(Some("Slice"), Some("سلايس")))
            .await;

        assert_eq!(result, Err(ResolveError::NoMatch));
    }
}
