//! Dark Sky daily forecast client.

use serde::{Deserialize, Serialize};

use super::{format_epoch_date, upstream_error, Result};

/// Forecast API endpoint. The key and coordinates are path segments:
/// `{API_URL}/{key}/{lat},{lng}`.
const API_URL: &str = "https://api.darksky.net/forecast";

/// One day of forecast, as served on `/weather`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Forecast {
    pub forecast: String,
    pub time: String,
}

// ── Wire format (not public) ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    data: Vec<DailyPoint>,
}

#[derive(Debug, Deserialize)]
struct DailyPoint {
    summary: String,
    time: i64,
}

// ── Client ──────────────────────────────────────────────────────────

pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
}

impl WeatherClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    /// Fetch the daily forecast for a coordinate pair.
    pub async fn daily_forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<Forecast>> {
        let url = format!("{}/{}/{},{}", API_URL, self.api_key, latitude, longitude);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: ForecastResponse = response.json().await?;
        Ok(map_forecasts(body))
    }
}

/// Shape the upstream daily data into `Forecast` records.
fn map_forecasts(body: ForecastResponse) -> Vec<Forecast> {
    body.daily
        .data
        .into_iter()
        .map(|day| Forecast {
            forecast: day.summary,
            time: format_epoch_date(day.time),
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_forecasts_renames_fields() {
        let json_str = r#"{
            "daily": {
                "data": [
                    {"summary": "Partly cloudy throughout the day.", "time": 1561939200},
                    {"summary": "Light rain in the morning.", "time": 1562025600}
                ]
            }
        }"#;
        let body: ForecastResponse = serde_json::from_str(json_str).unwrap();
        let days = map_forecasts(body);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].forecast, "Partly cloudy throughout the day.");
        assert_eq!(days[0].time, "Mon Jul 01 2019");
        assert_eq!(days[1].time, "Tue Jul 02 2019");
    }

    #[test]
    fn map_forecasts_empty_daily_data() {
        let json_str = r#"{"daily": {"data": []}}"#;
        let body: ForecastResponse = serde_json::from_str(json_str).unwrap();
        assert!(map_forecasts(body).is_empty());
    }

    #[test]
    fn wire_format_ignores_extra_fields() {
        // The upstream reply carries far more than the daily block
        let json_str = r#"{
            "latitude": 47.6,
            "longitude": -122.3,
            "timezone": "America/Los_Angeles",
            "currently": {"summary": "Clear", "temperature": 65.2},
            "daily": {
                "summary": "No precipitation throughout the week.",
                "data": [{"summary": "Clear throughout the day.", "time": 1561939200}]
            }
        }"#;
        let body: ForecastResponse = serde_json::from_str(json_str).unwrap();
        assert_eq!(map_forecasts(body).len(), 1);
    }
}
