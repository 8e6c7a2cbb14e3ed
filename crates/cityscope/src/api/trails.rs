//! Hiking Project trail search client.

use serde::{Deserialize, Serialize};

use super::{upstream_error, Result};

/// Trail search endpoint.
const API_URL: &str = "https://www.hikingproject.com/data/get-trails";

/// A hiking trail, as served on `/trails`.
///
/// `condition_date` and `condition_time` are the two halves of the
/// upstream's single `conditionDate` string.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Trail {
    pub name: String,
    pub location: String,
    pub length: f64,
    pub stars: f64,
    pub star_votes: i64,
    pub summary: String,
    pub trail_url: String,
    pub conditions: String,
    pub condition_date: String,
    pub condition_time: String,
}

// ── Wire format (not public) ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TrailsResponse {
    #[serde(default)]
    trails: Vec<TrailRecord>,
}

#[derive(Debug, Deserialize)]
struct TrailRecord {
    name: String,
    location: String,
    length: f64,
    stars: f64,
    #[serde(rename = "starVotes")]
    star_votes: i64,
    summary: String,
    url: String,
    #[serde(rename = "conditionStatus")]
    condition_status: Option<String>,
    #[serde(rename = "conditionDetails")]
    condition_details: Option<String>,
    #[serde(rename = "conditionDate")]
    condition_date: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────

pub struct TrailClient {
    client: reqwest::Client,
    api_key: String,
}

impl TrailClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    /// Fetch trails around a coordinate pair.
    pub async fn search(&self, latitude: f64, longitude: f64) -> Result<Vec<Trail>> {
        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: TrailsResponse = response.json().await?;
        Ok(map_trails(body))
    }
}

fn map_trails(body: TrailsResponse) -> Vec<Trail> {
    body.trails
        .into_iter()
        .map(|t| {
            let conditions = join_conditions(t.condition_status, t.condition_details);
            let (condition_date, condition_time) =
                split_condition_date(t.condition_date.as_deref().unwrap_or(""));
            Trail {
                name: t.name,
                location: t.location,
                length: t.length,
                stars: t.stars,
                star_votes: t.star_votes,
                summary: t.summary,
                trail_url: t.url,
                conditions,
                condition_date,
                condition_time,
            }
        })
        .collect()
}

/// Combine `conditionStatus` and `conditionDetails` into one string.
fn join_conditions(status: Option<String>, details: Option<String>) -> String {
    match (status, details) {
        (Some(status), Some(details)) if !details.is_empty() => {
            format!("{}: {}", status, details)
        }
        (Some(status), _) => status,
        (None, Some(details)) => details,
        (None, None) => String::new(),
    }
}

/// Split `"2019-07-01 12:34:56"` into date and time halves.
fn split_condition_date(raw: &str) -> (String, String) {
    match raw.split_once(' ') {
        Some((date, time)) => (date.to_string(), time.to_string()),
        None => (raw.to_string(), String::new()),
    }
}

// ── Tests ───────────────────────────────────────────────────────────
