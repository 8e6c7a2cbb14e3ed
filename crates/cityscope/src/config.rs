//! Environment-based configuration.
//!
//! All settings come from the environment and are read once at
//! startup. The six upstream API keys are required; the port and the
//! database path have defaults.

use std::env;
use std::path::PathBuf;

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    MissingKey(&'static str),

    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Default listen port, matching the original deployment.
const DEFAULT_PORT: u16 = 3000;

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub geocode_api_key: String,
    pub weather_api_key: String,
    pub yelp_api_key: String,
    pub movie_api_key: String,
    pub meetup_api_key: String,
    pub trail_api_key: String,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// A missing API key is an error naming the variable; `PORT` and
    /// `CITYSCOPE_DB` fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            db_path: db_path_from_env(),
            geocode_api_key: require("GEOCODE_API_KEY")?,
            weather_api_key: require("WEATHER_API_KEY")?,
            yelp_api_key: require("YELP_API_KEY")?,
            movie_api_key: require("MOVIE_API_KEY")?,
            meetup_api_key: require("MEETUP_API_KEY")?,
            trail_api_key: require("TRAIL_API_KEY")?,
        })
    }
}

fn require(key: &'static str) -> Result<String> {
    env::var(key).map_err(|_| ConfigError::MissingKey(key))
}

/// Database path: `CITYSCOPE_DB` if set, else `~/.cityscope/cache.db`.
fn db_path_from_env() -> PathBuf {
    match env::var("CITYSCOPE_DB") {
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cityscope")
            .join("cache.db"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_env_override() {
        // Save, set, test, restore (env vars are process-global).
        let saved = env::var("CITYSCOPE_DB").ok();
        env::set_var("CITYSCOPE_DB", "/tmp/other.db");

        assert_eq!(db_path_from_env(), PathBuf::from("/tmp/other.db"));

        match saved {
            Some(value) => env::set_var("CITYSCOPE_DB", value),
            None => env::remove_var("CITYSCOPE_DB"),
        }
    }

    #[test]
    fn missing_key_names_variable() {
        let err = require("CITYSCOPE_TEST_UNSET_KEY").unwrap_err();
        assert_eq!(err.to_string(), "CITYSCOPE_TEST_UNSET_KEY not set");
    }
}
