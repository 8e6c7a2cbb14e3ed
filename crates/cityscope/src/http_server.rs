//! HTTP REST API.
//!
//! One route per resource. Every handler takes the same free-text
//! `data` search, resolves it to a cached location (geocoding on a
//! miss), then serves the resource from the cache or the upstream API.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::api::geocode::Location;
use crate::api::meetups::Meetup;
use crate::api::movies::Movie;
use crate::api::trails::Trail;
use crate::api::weather::Forecast;
use crate::api::yelp::Restaurant;
use crate::api::ApiClients;
use crate::cache::{Cache, LocationRow};
use crate::error::AppError;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub clients: Arc<ApiClients>,
    pub cache: Arc<Mutex<Cache>>,
}

impl AppState {
    /// Lock the cache for a short synchronous section.
    ///
    /// Guards are held only for the SQLite calls themselves, never
    /// across an `.await` point.
    fn lock_cache(&self) -> Result<MutexGuard<'_, Cache>, AppError> {
        self.cache.lock().map_err(|_| AppError::LockPoisoned)
    }
}

/// Query params shared by every resource route.
#[derive(Deserialize)]
pub struct SearchQuery {
    data: String,
}

fn location_response(row: LocationRow) -> Location {
    Location {
        search_query: row.search_query,
        formatted_query: row.formatted_query,
        latitude: row.latitude,
        longitude: row.longitude,
    }
}

/// Look up a search in the location cache, geocoding and persisting
/// on a miss.
async fn resolve_location(state: &AppState, search: &str) -> Result<LocationRow, AppError> {
    if let Some(row) = state.lock_cache()?.location(search)? {
        return Ok(row);
    }

    let location = state.clients.geocode.search(search).await?;
    let row = state.lock_cache()?.save_location(&location)?;
    log::info!("geocoded \"{}\" -> {}", search, row.formatted_query);
    Ok(row)
}

/// GET /location - Geocode a search (cached indefinitely).
async fn get_location(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Location>, AppError> {
    let row = resolve_location(&state, &query.data).await?;
    Ok(Json(location_response(row)))
}

/// GET /weather - Daily forecast for a location search.
async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Forecast>>, AppError> {
    let location = resolve_location(&state, &query.data).await?;

    if let Some(days) = state.lock_cache()?.weather(location.id)? {
        log::debug!("weather cache hit for {}", location.search_query);
        return Ok(Json(days));
    }

    let days = state
        .clients
        .weather
        .daily_forecast(location.latitude, location.longitude)
        .await?;
    state.lock_cache()?.save_weather(location.id, &days)?;
    Ok(Json(days))
}

/// GET /yelp - Restaurants for a location search.
async fn get_restaurants(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Restaurant>>, AppError> {
    let location = resolve_location(&state, &query.data).await?;

    if let Some(restaurants) = state.lock_cache()?.restaurants(location.id)? {
        log::debug!("restaurants cache hit for {}", location.search_query);
        return Ok(Json(restaurants));
    }

    let restaurants = state
        .clients
        .yelp
        .search(location.latitude, location.longitude)
        .await?;
    state
        .lock_cache()?
        .save_restaurants(location.id, &restaurants)?;
    Ok(Json(restaurants))
}

/// GET /movies - Movies matching a location search.
async fn get_movies(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Movie>>, AppError> {
    let location = resolve_location(&state, &query.data).await?;

    if let Some(movies) = state.lock_cache()?.movies(location.id)? {
        log::debug!("movies cache hit for {}", location.search_query);
        return Ok(Json(movies));
    }

    let movies = state.clients.movies.search(&location.search_query).await?;
    state.lock_cache()?.save_movies(location.id, &movies)?;
    Ok(Json(movies))
}

/// GET /meetups - Upcoming events for a location search.
async fn get_meetups(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Meetup>>, AppError> {
    let location = resolve_location(&state, &query.data).await?;

    if let Some(meetups) = state.lock_cache()?.meetups(location.id)? {
        log::debug!("meetups cache hit for {}", location.search_query);
        return Ok(Json(meetups));
    }

    let meetups = state
        .clients
        .meetups
        .upcoming(location.latitude, location.longitude)
        .await?;
    state.lock_cache()?.save_meetups(location.id, &meetups)?;
    Ok(Json(meetups))
}

/// GET /trails - Hiking trails for a location search.
async fn get_trails(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Trail>>, AppError> {
    let location = resolve_location(&state, &query.data).await?;

    if let Some(trails) = state.lock_cache()?.trails(location.id)? {
        log::debug!("trails cache hit for {}", location.search_query);
        return Ok(Json(trails));
    }

    let trails = state
        .clients
        .trails
        .search(location.latitude, location.longitude)
        .await?;
    state.lock_cache()?.save_trails(location.id, &trails)?;
    Ok(Json(trails))
}

/// GET /health - Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

/// Catch-all for unknown routes.
async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Sorry, that route does not exist.")
}

/// Create the HTTP router.
pub fn create_router(clients: Arc<ApiClients>, cache: Arc<Mutex<Cache>>) -> Router {
    let state = AppState { clients, cache };

    // CORS layer so a frontend served from elsewhere can call the API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/location", get(get_location))
        .route("/weather", get(get_weather))
        .route("/yelp", get(get_restaurants))
        .route("/movies", get(get_movies))
        .route("/meetups", get(get_meetups))
        .route("/trails", get(get_trails))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until the shutdown channel fires.
pub async fn run_http_server(
    clients: Arc<ApiClients>,
    cache: Arc<Mutex<Cache>>,
    port: u16,
    mut shutdown: tokio::sync::watch::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(clients, cache);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    log::info!("HTTP server listening on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.changed().await.ok();
        })
        .await?;

    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn test_config() -> Config {
        Config {
            port: 0,
            db_path: PathBuf::from("unused"),
            geocode_api_key: "test".into(),
            weather_api_key: "test".into(),
            yelp_api_key: "test".into(),
            movie_api_key: "test".into(),
            meetup_api_key: "test".into(),
            trail_api_key: "test".into(),
        }
    }

    fn test_router(dir: &tempfile::TempDir) -> Router {
        let cache = Cache::open(&dir.path().join("test.db")).unwrap();
        let clients = Arc::new(ApiClients::new(&test_config()));
        create_router(clients, Arc::new(Mutex::new(cache)))
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(&dir);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(&dir);

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Sorry, that route does not exist.");
    }

    #[tokio::test]
    async fn missing_query_param_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(&dir);

        // No ?data= -> the Query extractor rejects before the handler runs
        let response = app
            .oneshot(Request::builder().uri("/weather").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
