//! Yelp Fusion business search client.

use serde::{Deserialize, Serialize};

use super::{upstream_error, Result};

/// Business search endpoint. Authenticated with a bearer token.
const API_URL: &str = "https://api.yelp.com/v3/businesses/search";

/// A restaurant, as served on `/yelp`.
///
/// `image_url` and `price` are missing for some businesses upstream
/// and pass through as `null`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Restaurant {
    pub name: String,
    pub image_url: Option<String>,
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub url: String,
}

// ── Wire format (not public) ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<Business>,
}

#[derive(Debug, Deserialize)]
struct Business {
    name: String,
    image_url: Option<String>,
    price: Option<String>,
    rating: Option<f64>,
    url: String,
}

// ── Client ──────────────────────────────────────────────────────────

pub struct YelpClient {
    client: reqwest::Client,
    api_key: String,
}

impl YelpClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    /// Search for restaurants around a coordinate pair.
    pub async fn search(&self, latitude: f64, longitude: f64) -> Result<Vec<Restaurant>> {
        let response = self
            .client
            .get(API_URL)
            .bearer_auth(&self.api_key)
            .query(&[("latitude", latitude), ("longitude", longitude)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: SearchResponse = response.json().await?;
        Ok(map_restaurants(body))
    }
}

fn map_restaurants(body: SearchResponse) -> Vec<Restaurant> {
    body.businesses
        .into_iter()
        .map(|b| Restaurant {
            name: b.name,
            image_url: b.image_url,
            price: b.price,
            rating: b.rating,
            url: b.url,
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_restaurants_renames_fields() {
        let json_str = r#"{
            "total": 2,
            "businesses": [
                {
                    "id": "abc123",
                    "name": "Pike Place Chowder",
                    "image_url": "https://s3-media.example/chowder.jpg",
                    "price": "$$",
                    "rating": 4.5,
                    "url": "https://www.yelp.com/biz/pike-place-chowder",
                    "review_count": 9000
                },
                {
                    "id": "def456",
                    "name": "Unrated Cart",
                    "url": "https://www.yelp.com/biz/unrated-cart"
                }
            ]
        }"#;
        let body: SearchResponse = serde_json::from_str(json_str).unwrap();
        let restaurants = map_restaurants(body);

        assert_eq!(restaurants.len(), 2);
        assert_eq!(restaurants[0].name, "Pike Place Chowder");
        assert_eq!(restaurants[0].price.as_deref(), Some("$$"));
        assert_eq!(restaurants[0].rating, Some(4.5));

        assert_eq!(restaurants[1].name, "Unrated Cart");
        assert_eq!(restaurants[1].image_url, None);
        assert_eq!(restaurants[1].price, None);
        assert_eq!(restaurants[1].rating, None);
    }

    #[test]
    fn map_restaurants_empty() {
        let body: SearchResponse = serde_json::from_str(r#"{"businesses": []}"#).unwrap();
        assert!(map_restaurants(body).is_empty());
    }
}
