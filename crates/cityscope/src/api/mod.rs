//! Clients for the upstream location-based APIs.
//!
//! One module per upstream. Each client holds a shared `reqwest::Client`
//! and its API key, deserializes the upstream wire format privately, and
//! exposes only the renamed record types the REST layer serves.

pub mod geocode;
pub mod meetups;
pub mod movies;
pub mod trails;
pub mod weather;
pub mod yelp;

use crate::config::Config;

/// Errors from upstream API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("no results for query: {0}")]
    NoResults(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Read the body of a non-2xx upstream reply into an `Upstream` error.
async fn upstream_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    ApiError::Upstream { status, message }
}

/// Format an epoch-seconds timestamp like `"Mon Jul 01 2019"`.
///
/// Matches the date rendering the frontend expects for forecast and
/// event creation dates.
pub(crate) fn format_epoch_date(epoch_secs: i64) -> String {
    chrono::DateTime::from_timestamp(epoch_secs, 0)
        .map(|dt| dt.format("%a %b %d %Y").to_string())
        .unwrap_or_default()
}

/// The full set of upstream clients, sharing one HTTP connection pool.
pub struct ApiClients {
    pub geocode: geocode::GeocodeClient,
    pub weather: weather::WeatherClient,
    pub yelp: yelp::YelpClient,
    pub movies: movies::MovieClient,
    pub meetups: meetups::MeetupClient,
    pub trails: trails::TrailClient,
}

impl ApiClients {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::new();
        Self {
            geocode: geocode::GeocodeClient::new(http.clone(), config.geocode_api_key.clone()),
            weather: weather::WeatherClient::new(http.clone(), config.weather_api_key.clone()),
            yelp: yelp::YelpClient::new(http.clone(), config.yelp_api_key.clone()),
            movies: movies::MovieClient::new(http.clone(), config.movie_api_key.clone()),
            meetups: meetups::MeetupClient::new(http.clone(), config.meetup_api_key.clone()),
            trails: trails::TrailClient::new(http, config.trail_api_key.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_epoch_date_renders_weekday() {
        // 2019-07-01 was a Monday
        assert_eq!(format_epoch_date(1561939200), "Mon Jul 01 2019");
    }

    #[test]
    fn format_epoch_date_out_of_range() {
        assert_eq!(format_epoch_date(i64::MAX), "");
    }
}
