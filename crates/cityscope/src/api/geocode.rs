//! Google Maps Geocoding client.
//!
//! Turns a free-text location search into coordinates and a formatted
//! address. Results are memoized in the cache indefinitely, so this is
//! hit once per distinct search.

use serde::{Deserialize, Serialize};

use super::{upstream_error, ApiError, Result};

/// Geocoding API endpoint.
const API_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// A geocoded location, as served on `/location`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Location {
    pub search_query: String,
    pub formatted_query: String,
    pub latitude: f64,
    pub longitude: f64,
}

// ── Wire format (not public) ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

// ── Client ──────────────────────────────────────────────────────────

pub struct GeocodeClient {
    client: reqwest::Client,
    api_key: String,
}

impl GeocodeClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    /// Geocode a free-text search into a `Location`.
    pub async fn search(&self, query: &str) -> Result<Location> {
        let response = self
            .client
            .get(API_URL)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: GeocodeResponse = response.json().await?;
        map_location(query, body)
    }
}

/// Shape the upstream response into a `Location`.
///
/// The API reports `ZERO_RESULTS` with a 200, so the `status` field is
/// the authority here, not the HTTP code.
fn map_location(query: &str, body: GeocodeResponse) -> Result<Location> {
    if body.status != "OK" {
        return Err(ApiError::NoResults(query.to_string()));
    }
    let first = body
        .results
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NoResults(query.to_string()))?;

    Ok(Location {
        search_query: query.to_string(),
        formatted_query: first.formatted_address,
        latitude: first.geometry.location.lat,
        longitude: first.geometry.location.lng,
    })
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_location_renames_fields() {
        let json_str = r#"{
            "status": "OK",
            "results": [
                {
                    "formatted_address": "Seattle, WA, USA",
                    "geometry": {
                        "location": {"lat": 47.6062095, "lng": -122.3320708}
                    }
                },
                {
                    "formatted_address": "Seattle, Other Place",
                    "geometry": {
                        "location": {"lat": 0.0, "lng": 0.0}
                    }
                }
            ]
        }"#;
        let body: GeocodeResponse = serde_json::from_str(json_str).unwrap();
        let location = map_location("seattle", body).unwrap();

        assert_eq!(location.search_query, "seattle");
        assert_eq!(location.formatted_query, "Seattle, WA, USA");
        assert_eq!(location.latitude, 47.6062095);
        assert_eq!(location.longitude, -122.3320708);
    }

    #[test]
    fn map_location_zero_results() {
        let json_str = r#"{"status": "ZERO_RESULTS", "results": []}"#;
        let body: GeocodeResponse = serde_json::from_str(json_str).unwrap();
        let err = map_location("nowheresville", body).unwrap_err();
        assert!(matches!(err, ApiError::NoResults(q) if q == "nowheresville"));
    }

    #[test]
    fn map_location_ok_but_empty() {
        let json_str = r#"{"status": "OK", "results": []}"#;
        let body: GeocodeResponse = serde_json::from_str(json_str).unwrap();
        assert!(map_location("x", body).is_err());
    }
}
