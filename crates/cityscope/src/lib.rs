//! Cityscope - location-based API aggregator.
//!
//! A small HTTP service that geocodes a free-text location search and
//! serves weather, restaurants, movies, meetups, and hiking trails for
//! it from the upstream APIs, through a SQLite response cache keyed by
//! location.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http_server;

pub use cache::Cache;
pub use config::Config;
pub use http_server::{create_router, run_http_server, AppState};
