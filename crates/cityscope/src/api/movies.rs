//! The Movie DB search client.
//!
//! Searches movies by the location's search text, matching the
//! "movies set in or about this place" behavior of the frontend.

use serde::{Deserialize, Serialize};

use super::{upstream_error, Result};

/// Movie search endpoint.
const API_URL: &str = "https://api.themoviedb.org/3/search/movie";

/// Poster images are addressed relative to this CDN base.
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// A movie, as served on `/movies`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Movie {
    pub title: String,
    pub overview: String,
    pub average_votes: f64,
    pub total_votes: i64,
    pub image_url: Option<String>,
    pub popularity: f64,
    pub released_on: Option<String>,
}

// ── Wire format (not public) ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<MovieResult>,
}

#[derive(Debug, Deserialize)]
struct MovieResult {
    title: String,
    #[serde(default)]
    overview: String,
    vote_average: f64,
    vote_count: i64,
    poster_path: Option<String>,
    popularity: f64,
    release_date: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────

pub struct MovieClient {
    client: reqwest::Client,
    api_key: String,
}

impl MovieClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    /// Search for movies matching the location's search text.
    pub async fn search(&self, query: &str) -> Result<Vec<Movie>> {
        let response = self
            .client
            .get(API_URL)
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: SearchResponse = response.json().await?;
        Ok(map_movies(body))
    }
}

fn map_movies(body: SearchResponse) -> Vec<Movie> {
    body.results
        .into_iter()
        .map(|m| Movie {
            title: m.title,
            overview: m.overview,
            average_votes: m.vote_average,
            total_votes: m.vote_count,
            image_url: m.poster_path.map(|p| format!("{}{}", IMAGE_BASE_URL, p)),
            popularity: m.popularity,
            released_on: m.release_date,
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_movies_renames_fields() {
        let json_str = r#"{
            "page": 1,
            "total_results": 1,
            "results": [
                {
                    "id": 9522,
                    "title": "Sleepless in Seattle",
                    "overview": "An Architect's son calls into a talk-radio show.",
                    "vote_average": 6.7,
                    "vote_count": 2200,
                    "poster_path": "/afkYP1KUZtLX9lLBq1NfjyTo0ZY.jpg",
                    "popularity": 13.9,
                    "release_date": "1993-06-24"
                }
            ]
        }"#;
        let body: SearchResponse = serde_json::from_str(json_str).unwrap();
        let movies = map_movies(body);

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Sleepless in Seattle");
        assert_eq!(movies[0].average_votes, 6.7);
        assert_eq!(movies[0].total_votes, 2200);
        assert_eq!(
            movies[0].image_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/afkYP1KUZtLX9lLBq1NfjyTo0ZY.jpg")
        );
        assert_eq!(movies[0].released_on.as_deref(), Some("1993-06-24"));
    }

    #[test]
    fn map_movies_missing_poster_and_release() {
        let json_str = r#"{
            "results": [
                {
                    "title": "Obscure Short",
                    "vote_average": 0.0,
                    "vote_count": 0,
                    "poster_path": null,
                    "popularity": 0.6
                }
            ]
        }"#;
        let body: SearchResponse = serde_json::from_str(json_str).unwrap();
        let movies = map_movies(body);

        assert_eq!(movies[0].overview, "");
        assert_eq!(movies[0].image_url, None);
        assert_eq!(movies[0].released_on, None);
    }
}
