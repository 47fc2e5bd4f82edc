// src/services/providers/google_maps_client.rs
// DOCUMENTATION: Google Maps web service client
// PURPOSE: Geocoding and Places Text Search calls shared by the Google providers

use crate::errors::ResolveError;
use crate::models::Coordinate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Google Maps API client
/// DOCUMENTATION: Holds the API key and base URL; one instance is shared by
/// the geocoding and text search providers
pub struct GoogleMapsClient {
    /// HTTP client for making requests
    client: Client,
    /// Google Maps API key (empty = not configured)
    api_key: String,
    /// Base URL, e.g. https://maps.googleapis.com/maps/api
    base_url: String,
}

/// Response envelope shared by Geocoding and Text Search
#[derive(Debug, Deserialize, Serialize)]
pub struct GoogleResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    pub status: String,
    pub error_message: Option<String>,
}

/// One Geocoding API result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodeResult {
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
    /// Classification tags (e.g., ["restaurant", "food", "point_of_interest"])
    #[serde(default)]
    pub types: Vec<String>,
    pub geometry: GoogleGeometry,
}

/// One Places Text Search result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GooglePlace {
    pub place_id: Option<String>,
    pub name: String,
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    pub geometry: GoogleGeometry,
}

/// Geographic location from Google
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleGeometry {
    pub location: GoogleLocation,
}

/// Coordinates from Google
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleLocation {
    pub lat: f64,
    pub lng: f64,
}

impl GoogleGeometry {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.location.lat, self.location.lng)
    }
}

/// Types that mark a food-serving establishment
const FOOD_TYPES: [&str; 8] = [
    "restaurant",
    "food",
    "cafe",
    "bakery",
    "bar",
    "meal_takeaway",
    "meal_delivery",
    "coffee_shop",
];

/// Types that mark a storage-only site (delivery kitchens registered as warehouses)
const STORAGE_TYPES: [&str; 3] = ["storage", "warehouse", "moving_company"];

/// Classification check for a geocoded place
/// DOCUMENTATION: Food-serving tags are accepted outright. Anything else is
/// accepted unless a storage-only tag is present, so generic tags such as
/// "point_of_interest" or "establishment" do not disqualify a result.
pub fn is_acceptable_place(types: &[String]) -> bool {
    if types.iter().any(|t| FOOD_TYPES.contains(&t.as_str())) {
        return true;
    }
    !types.iter().any(|t| STORAGE_TYPES.contains(&t.as_str()))
}

impl GoogleMapsClient {
    /// Create new Google Maps API client
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Geocode a free-text address
    /// DOCUMENTATION: `region` is a ccTLD bias (e.g., "kw"). An empty vector
    /// means the API answered ZERO_RESULTS.
    pub async fn geocode(
        &self,
        address: &str,
        region: &str,
    ) -> Result<Vec<GeocodeResult>, ResolveError> {
        let url = format!("{}/geocode/json", self.base_url);
        log::debug!("Google geocode: address={}", address);

        let response: GoogleResponse<GeocodeResult> = self
            .get_json(&url, &[("address", address), ("region", region)])
            .await?;

        check_status(&response.status, response.error_message.as_deref())?;
        log::debug!("Google geocode returned {} results", response.results.len());
        Ok(response.results)
    }

    /// Places Text Search
    /// DOCUMENTATION: May return several branches of the same restaurant
    pub async fn text_search(
        &self,
        query: &str,
        region: &str,
    ) -> Result<Vec<GooglePlace>, ResolveError> {
        let url = format!("{}/place/textsearch/json", self.base_url);
        log::debug!("Google text search: query={}", query);

        let response: GoogleResponse<GooglePlace> = self
            .get_json(&url, &[("query", query), ("region", region)])
            .await?;

        check_status(&response.status, response.error_message.as_deref())?;
        log::debug!("Google text search returned {} results", response.results.len());
        Ok(response.results)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ResolveError> {
        if !self.has_credential() {
            return Err(ResolveError::Configuration(
                "GOOGLE_MAPS_API_KEY is not set".to_string(),
            ));
        }

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                log::warn!("Google Maps request failed: {}", e);
                ResolveError::ProviderUnavailable(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            log::warn!("Google Maps API error {}", status);
            return Err(ResolveError::ProviderUnavailable(format!(
                "API error {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            let e = e.without_url();
            log::warn!("Failed to parse Google Maps response: {}", e);
            ResolveError::ProviderUnavailable(format!("Parse error: {}", e))
        })
    }
}

/// Map a Google status string to the resolver taxonomy
fn check_status(status: &str, error_message: Option<&str>) -> Result<(), ResolveError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
            log::warn!("Google Maps API quota exceeded");
            Err(ResolveError::ProviderUnavailable("quota exceeded".to_string()))
        }
        "REQUEST_DENIED" => {
            let msg = error_message.unwrap_or("request denied").to_string();
            log::warn!("Google Maps API request denied: {}", msg);
            Err(ResolveError::Configuration(msg))
        }
        other => {
            let msg = error_message
                .map(str::to_string)
                .unwrap_or_else(|| format!("Unknown status: {}", other));
            log::warn!("Google Maps API unexpected status: {}", msg);
            Err(ResolveError::ProviderUnavailable(msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn types(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_classification() {
        assert!(is_acceptable_place(&types(&["restaurant", "food"])));
        assert!(is_acceptable_place(&types(&["point_of_interest", "establishment"])));
        assert!(is_acceptable_place(&types(&["street_address"])));
        assert!(!is_acceptable_place(&types(&["storage", "establishment"])));
        // food tag wins over storage tag
        assert!(is_acceptable_place(&types(&["meal_delivery", "storage"])));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("OK", None).is_ok());
        assert!(check_status("ZERO_RESULTS", None).is_ok());
        assert!(matches!(
            check_status("REQUEST_DENIED", Some("The provided API key is invalid.")),
            Err(ResolveError::Configuration(_))
        ));
        assert!(matches!(
            check_status("OVER_QUERY_LIMIT", None),
            Err(ResolveError::ProviderUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = GoogleMapsClient::new(String::new(), server.uri());
        let result = client.geocode("Slice, Kuwait", "kw").await;

        assert!(matches!(result, Err(ResolveError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_geocode_parses_results() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Salmiya, Kuwait",
                "place_id": "ChIJ1",
                "types": ["restaurant", "food", "point_of_interest"],
                "geometry": { "location": { "lat": 29.33, "lng": 48.07 } }
            }]
        });

        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .and(query_param("address", "Slice, Kuwait"))
            .and(query_param("region", "kw"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = GoogleMapsClient::new("test-key".to_string(), server.uri());
        let results = client.geocode("Slice, Kuwait", "kw").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].geometry.coordinate(), Coordinate::new(29.33, 48.07));
    }

    #[tokio::test]
    async fn test_zero_results_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/place/textsearch/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "results": [] })),
            )
            .mount(&server)
            .await;

        let client = GoogleMapsClient::new("test-key".to_string(), server.uri());
        let results = client.text_search("\"Nowhere\" Kuwait", "kw").await.unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = GoogleMapsClient::new("test-key".to_string(), server.uri());
        let result = client.geocode("Slice", "kw").await;

        assert!(matches!(result, Err(ResolveError::ProviderUnavailable(_))));
    }
}
