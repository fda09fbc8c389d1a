//! Runtime configuration
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the working directory, falling back to built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};

const STATION_TRACKS_VAR: &str = "GMUSIC_STATION_TRACKS";
const LOG_DIR_VAR: &str = "GMUSIC_LOG_DIR";
const DEVICE_ID_VAR: &str = "GMUSIC_DEVICE_ID";

const DEFAULT_STATION_TRACKS: usize = 100;
const DEFAULT_LOG_DIR: &str = ".logs";
const DEVICE_NAME: &str = "gmusic-rs";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// How many tracks to request when loading a station
    pub station_track_limit: usize,
    pub log_dir: PathBuf,
    /// Device id sent along with credentials
    pub device_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            station_track_limit: DEFAULT_STATION_TRACKS,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            device_id: default_device_id(),
        }
    }
}

impl ClientConfig {
    /// Load from the process environment after reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(STATION_TRACKS_VAR) {
            config.station_track_limit = value
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive integer, got {:?}", STATION_TRACKS_VAR, value))?;
            anyhow::ensure!(config.station_track_limit > 0, "{} must be greater than zero", STATION_TRACKS_VAR);
        }
        if let Some(value) = lookup(LOG_DIR_VAR) {
            config.log_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(DEVICE_ID_VAR) {
            config.device_id = value;
        }

        Ok(config)
    }
}

fn default_device_id() -> String {
    // Generate a consistent device ID based on machine
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{}-{}", DEVICE_NAME, hostname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.station_track_limit, 100);
        assert_eq!(config.log_dir, PathBuf::from(".logs"));
        assert!(config.device_id.starts_with("gmusic-rs-"));
    }

    #[test]
    fn overrides_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("GMUSIC_STATION_TRACKS", "25"),
            ("GMUSIC_LOG_DIR", "/tmp/gm"),
            ("GMUSIC_DEVICE_ID", "abc"),
        ]))
        .unwrap();
        assert_eq!(config.station_track_limit, 25);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/gm"));
        assert_eq!(config.device_id, "abc");
    }

    #[test]
    fn rejects_bad_station_limit() {
        assert!(ClientConfig::from_lookup(lookup(&[("GMUSIC_STATION_TRACKS", "lots")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("GMUSIC_STATION_TRACKS", "0")])).is_err());
    }
}
