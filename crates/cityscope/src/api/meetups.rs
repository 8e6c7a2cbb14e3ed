//! Meetup upcoming-events client.

use serde::{Deserialize, Serialize};

use super::{format_epoch_date, upstream_error, Result};

/// Upcoming events endpoint.
const API_URL: &str = "https://api.meetup.com/find/upcoming_events";

/// A meetup event, as served on `/meetups`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Meetup {
    pub link: String,
    pub name: String,
    pub creation_date: String,
    pub host: String,
}

// ── Wire format (not public) ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    link: String,
    name: String,
    /// Creation time in epoch milliseconds.
    created: i64,
    group: Group,
}

#[derive(Debug, Deserialize)]
struct Group {
    name: String,
}

// ── Client ──────────────────────────────────────────────────────────

pub struct MeetupClient {
    client: reqwest::Client,
    api_key: String,
}

impl MeetupClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    /// Fetch upcoming events around a coordinate pair.
    pub async fn upcoming(&self, latitude: f64, longitude: f64) -> Result<Vec<Meetup>> {
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

        let body: EventsResponse = response.json().await?;
        Ok(map_meetups(body))
    }
}

fn map_meetups(body: EventsResponse) -> Vec<Meetup> {
    body.events
        .into_iter()
        .map(|event| Meetup {
            link: event.link,
            name: event.name,
            creation_date: format_epoch_date(event.created / 1000),
            host: event.group.name,
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_meetups_renames_fields() {
        let json_str = r#"{
            "events": [
                {
                    "link": "https://www.meetup.com/seattle-rust/events/1/",
                    "name": "Rust Meetup",
                    "created": 1561939200000,
                    "group": {"name": "Seattle Rust", "members": 1200}
                }
            ],
            "city": {"city": "Seattle"}
        }"#;
        let body: EventsResponse = serde_json::from_str(json_str).unwrap();
        let meetups = map_meetups(body);

        assert_eq!(meetups.len(), 1);
        assert_eq!(meetups[0].name, "Rust Meetup");
        assert_eq!(meetups[0].host, "Seattle Rust");
        assert_eq!(meetups[0].creation_date, "Mon Jul 01 2019");
    }

    #[test]
    fn map_meetups_missing_events_key() {
        let body: EventsResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(map_meetups(body).is_empty());
    }
}
