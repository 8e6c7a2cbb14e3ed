//! SQLite response cache keyed by location.
//!
//! Geocoded locations are memoized indefinitely; every other resource
//! table holds rows tied to a `location_id` with a `created_at` stamp
//! and ages out on lookup once its TTL passes. Stores everything in a
//! single database, by default `~/.cityscope/cache.db`.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection};

use crate::api::geocode::Location;
use crate::api::meetups::Meetup;
use crate::api::movies::Movie;
use crate::api::trails::Trail;
use crate::api::weather::Forecast;
use crate::api::yelp::Restaurant;

/// Errors from cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;

// How long each resource stays servable before a lookup purges it.
const WEATHER_TTL: Duration = Duration::from_secs(60 * 60);
const RESTAURANTS_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const MOVIES_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const MEETUPS_TTL: Duration = Duration::from_secs(6 * 60 * 60);
const TRAILS_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A cached location row.
#[derive(Debug, Clone)]
pub struct LocationRow {
    pub id: i64,
    pub search_query: String,
    pub formatted_query: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// SQLite-backed response cache.
pub struct Cache {
    conn: Connection,
}

impl Cache {
    /// Open (or create) the cache database at the given path.
    ///
    /// Creates all tables if they don't exist and sets WAL journal mode.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrent read performance
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS locations (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                search_query    TEXT NOT NULL UNIQUE,
                formatted_query TEXT NOT NULL,
                latitude        REAL NOT NULL,
                longitude       REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS weather (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                location_id INTEGER NOT NULL REFERENCES locations(id),
                forecast    TEXT NOT NULL,
                time        TEXT NOT NULL,
                created_at  INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_weather_location ON weather(location_id);

            CREATE TABLE IF NOT EXISTS restaurants (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                location_id INTEGER NOT NULL REFERENCES locations(id),
                name        TEXT NOT NULL,
                image_url   TEXT,
                price       TEXT,
                rating      REAL,
                url         TEXT NOT NULL,
                created_at  INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_restaurants_location ON restaurants(location_id);

            CREATE TABLE IF NOT EXISTS movies (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                location_id   INTEGER NOT NULL REFERENCES locations(id),
                title         TEXT NOT NULL,
                overview      TEXT NOT NULL,
                average_votes REAL NOT NULL,
                total_votes   INTEGER NOT NULL,
                image_url     TEXT,
                popularity    REAL NOT NULL,
                released_on   TEXT,
                created_at    INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_movies_location ON movies(location_id);

            CREATE TABLE IF NOT EXISTS meetups (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                location_id   INTEGER NOT NULL REFERENCES locations(id),
                link          TEXT NOT NULL,
                name          TEXT NOT NULL,
                creation_date TEXT NOT NULL,
                host          TEXT NOT NULL,
                created_at    INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_meetups_location ON meetups(location_id);

            CREATE TABLE IF NOT EXISTS trails (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                location_id    INTEGER NOT NULL REFERENCES locations(id),
                name           TEXT NOT NULL,
                location       TEXT NOT NULL,
                length         REAL NOT NULL,
                stars          REAL NOT NULL,
                star_votes     INTEGER NOT NULL,
                summary        TEXT NOT NULL,
                trail_url      TEXT NOT NULL,
                conditions     TEXT NOT NULL,
                condition_date TEXT NOT NULL,
                condition_time TEXT NOT NULL,
                created_at     INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trails_location ON trails(location_id);",
        )?;

        Ok(Self { conn })
    }

    // ── Locations ───────────────────────────────────────────────────

    /// Look up a location by its search text.
    pub fn location(&self, search_query: &str) -> Result<Option<LocationRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, search_query, formatted_query, latitude, longitude \
             FROM locations WHERE search_query = ?1",
        )?;
        let mut rows = stmt.query_map(params![search_query], |row| {
            Ok(LocationRow {
                id: row.get(0)?,
                search_query: row.get(1)?,
                formatted_query: row.get(2)?,
                latitude: row.get(3)?,
                longitude: row.get(4)?,
            })
        })?;
        rows.next().transpose().map_err(CacheError::from)
    }

    /// Insert a geocoded location (upsert on search text), returning
    /// the stored row.
    pub fn save_location(&self, location: &Location) -> Result<LocationRow> {
        let id: i64 = self.conn.query_row(
            "INSERT INTO locations (search_query, formatted_query, latitude, longitude) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(search_query) DO UPDATE SET \
                formatted_query = excluded.formatted_query, \
                latitude = excluded.latitude, \
                longitude = excluded.longitude \
             RETURNING id",
            params![
                location.search_query,
                location.formatted_query,
                location.latitude,
                location.longitude,
            ],
            |row| row.get(0),
        )?;

        Ok(LocationRow {
            id,
            search_query: location.search_query.clone(),
            formatted_query: location.formatted_query.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
        })
    }

    // ── Weather ─────────────────────────────────────────────────────

    /// Cached forecast for a location, or `None` on miss/expiry.
    pub fn weather(&self, location_id: i64) -> Result<Option<Vec<Forecast>>> {
        if !self.check_fresh("weather", location_id, WEATHER_TTL)? {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(
            "SELECT forecast, time FROM weather WHERE location_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![location_id], |row| {
            Ok(Forecast {
                forecast: row.get(0)?,
                time: row.get(1)?,
            })
        })?;
        let days = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(days))
    }

    /// Store a freshly fetched forecast for a location.
    pub fn save_weather(&self, location_id: i64, days: &[Forecast]) -> Result<()> {
        let created_at = now_epoch();
        let mut stmt = self.conn.prepare(
            "INSERT INTO weather (location_id, forecast, time, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for day in days {
            stmt.execute(params![location_id, day.forecast, day.time, created_at])?;
        }
        Ok(())
    }

    // ── Restaurants ─────────────────────────────────────────────────

    pub fn restaurants(&self, location_id: i64) -> Result<Option<Vec<Restaurant>>> {
        if !self.check_fresh("restaurants", location_id, RESTAURANTS_TTL)? {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(
            "SELECT name, image_url, price, rating, url \
             FROM restaurants WHERE location_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![location_id], |row| {
            Ok(Restaurant {
                name: row.get(0)?,
                image_url: row.get(1)?,
                price: row.get(2)?,
                rating: row.get(3)?,
                url: row.get(4)?,
            })
        })?;
        let restaurants = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(restaurants))
    }

    pub fn save_restaurants(&self, location_id: i64, restaurants: &[Restaurant]) -> Result<()> {
        let created_at = now_epoch();
        let mut stmt = self.conn.prepare(
            "INSERT INTO restaurants (location_id, name, image_url, price, rating, url, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for r in restaurants {
            stmt.execute(params![
                location_id,
                r.name,
                r.image_url,
                r.price,
                r.rating,
                r.url,
                created_at
            ])?;
        }
        Ok(())
    }

    // ── Movies ──────────────────────────────────────────────────────

    pub fn movies(&self, location_id: i64) -> Result<Option<Vec<Movie>>> {
        if !self.check_fresh("movies", location_id, MOVIES_TTL)? {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(
            "SELECT title, overview, average_votes, total_votes, image_url, popularity, released_on \
             FROM movies WHERE location_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![location_id], |row| {
            Ok(Movie {
                title: row.get(0)?,
                overview: row.get(1)?,
                average_votes: row.get(2)?,
                total_votes: row.get(3)?,
                image_url: row.get(4)?,
                popularity: row.get(5)?,
                released_on: row.get(6)?,
            })
        })?;
        let movies = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(movies))
    }

    pub fn save_movies(&self, location_id: i64, movies: &[Movie]) -> Result<()> {
        let created_at = now_epoch();
        let mut stmt = self.conn.prepare(
            "INSERT INTO movies \
             (location_id, title, overview, average_votes, total_votes, image_url, popularity, released_on, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for m in movies {
            stmt.execute(params![
                location_id,
                m.title,
                m.overview,
                m.average_votes,
                m.total_votes,
                m.image_url,
                m.popularity,
                m.released_on,
                created_at
            ])?;
        }
        Ok(())
    }

    // ── Meetups ─────────────────────────────────────────────────────

    pub fn meetups(&self, location_id: i64) -> Result<Option<Vec<Meetup>>> {
        if !self.check_fresh("meetups", location_id, MEETUPS_TTL)? {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(
            "SELECT link, name, creation_date, host \
             FROM meetups WHERE location_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![location_id], |row| {
            Ok(Meetup {
                link: row.get(0)?,
                name: row.get(1)?,
                creation_date: row.get(2)?,
                host: row.get(3)?,
            })
        })?;
        let meetups = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(meetups))
    }

    pub fn save_meetups(&self, location_id: i64, meetups: &[Meetup]) -> Result<()> {
        let created_at = now_epoch();
        let mut stmt = self.conn.prepare(
            "INSERT INTO meetups (location_id, link, name, creation_date, host, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for m in meetups {
            stmt.execute(params![
                location_id,
                m.link,
                m.name,
                m.creation_date,
                m.host,
                created_at
            ])?;
        }
        Ok(())
    }

    // ── Trails ──────────────────────────────────────────────────────

    pub fn trails(&self, location_id: i64) -> Result<Option<Vec<Trail>>> {
        if !self.check_fresh("trails", location_id, TRAILS_TTL)? {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(
            "SELECT name, location, length, stars, star_votes, summary, trail_url, \
                    conditions, condition_date, condition_time \
             FROM trails WHERE location_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![location_id], |row| {
            Ok(Trail {
                name: row.get(0)?,
                location: row.get(1)?,
                length: row.get(2)?,
                stars: row.get(3)?,
                star_votes: row.get(4)?,
                summary: row.get(5)?,
                trail_url: row.get(6)?,
                conditions: row.get(7)?,
                condition_date: row.get(8)?,
                condition_time: row.get(9)?,
            })
        })?;
        let trails = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(trails))
    }

    pub fn save_trails(&self, location_id: i64, trails: &[Trail]) -> Result<()> {
        let created_at = now_epoch();
        let mut stmt = self.conn.prepare(
            "INSERT INTO trails \
             (location_id, name, location, length, stars, star_votes, summary, trail_url, \
              conditions, condition_date, condition_time, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        for t in trails {
            stmt.execute(params![
                location_id,
                t.name,
                t.location,
                t.length,
                t.stars,
                t.star_votes,
                t.summary,
                t.trail_url,
                t.conditions,
                t.condition_date,
                t.condition_time,
                created_at
            ])?;
        }
        Ok(())
    }

    // ── Freshness ───────────────────────────────────────────────────

    /// Hit/miss/expiry gate shared by every resource table.
    ///
    /// Returns true when the location has rows newer than `ttl`.
    /// Stale rows are deleted before reporting a miss, so the caller's
    /// subsequent save starts from an empty slate.
    fn check_fresh(&self, table: &str, location_id: i64, ttl: Duration) -> Result<bool> {
        match self.newest_created_at(table, location_id)? {
            Some(created_at) if now_epoch() - created_at <= ttl.as_secs() as i64 => Ok(true),
            Some(_) => {
                self.purge(table, location_id)?;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Newest `created_at` among a location's rows in `table`.
    fn newest_created_at(&self, table: &str, location_id: i64) -> Result<Option<i64>> {
        let newest = self.conn.query_row(
            &format!("SELECT MAX(created_at) FROM {} WHERE location_id = ?1", table),
            params![location_id],
            |row| row.get(0),
        )?;
        Ok(newest)
    }

    /// Delete a location's rows from `table`.
    fn purge(&self, table: &str, location_id: i64) -> Result<()> {
        self.conn.execute(
            &format!("DELETE FROM {} WHERE location_id = ?1", table),
            params![location_id],
        )?;
        Ok(())
    }
}

/// Epoch seconds for the current time.
fn now_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
