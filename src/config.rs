use crate::api::nba_stats_api::NBA_STATS_BASE_URL;
use crate::error::{Result, StatsError};
use crate::utils::fetcher::{RetryPolicy, RetryScope};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8888";
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Pause between per-team roster requests in the snapshot commands
pub const ROSTER_REQUEST_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct Config {
    pub nba_stats_base_url: String,
    /// Per-attempt network timeout (FETCH_TIMEOUT_SECS)
    pub fetch_timeout: Duration,
    /// Attempts, pause and scope for game log fetches (FETCH_RETRIES, FETCH_RETRY_PAUSE_SECS, RETRY_SCOPE)
    pub retry: RetryPolicy,
    pub bind_addr: String,
    /// Front end allowed by CORS (FRONTEND_ORIGIN)
    pub frontend_origin: String,
    /// Saved NBA roster snapshot used for the player directory (PLAYERS_SNAPSHOT)
    pub players_snapshot: Option<PathBuf>,
    /// Prefer the snapshot over the network at startup (USE_CACHE=1)
    pub use_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nba_stats_base_url: NBA_STATS_BASE_URL.to_string(),
            fetch_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            frontend_origin: DEFAULT_FRONTEND_ORIGIN.to_string(),
            players_snapshot: None,
            use_cache: false,
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| StatsError::Validation(format!("{} has an invalid value: '{}'", key, raw))),
        None => Ok(default),
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let attempts: u32 = parse_var(&lookup, "FETCH_RETRIES", defaults.retry.attempts)?;
        if attempts == 0 {
            return Err(StatsError::Validation(
                "FETCH_RETRIES must be at least 1".to_string(),
            ));
        }
        let pause_secs: u64 = parse_var(&lookup, "FETCH_RETRY_PAUSE_SECS", defaults.retry.pause.as_secs())?;
        let timeout_secs: u64 = parse_var(&lookup, "FETCH_TIMEOUT_SECS", defaults.fetch_timeout.as_secs())?;
        let scope = match lookup("RETRY_SCOPE") {
            Some(raw) => raw.parse::<RetryScope>()?,
            None => defaults.retry.scope,
        };

        Ok(Self {
            nba_stats_base_url: lookup("NBA_STATS_BASE_URL").unwrap_or(defaults.nba_stats_base_url),
            fetch_timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy {
                attempts,
                pause: Duration::from_secs(pause_secs),
                scope,
            },
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            frontend_origin: lookup("FRONTEND_ORIGIN").unwrap_or(defaults.frontend_origin),
            players_snapshot: lookup("PLAYERS_SNAPSHOT")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            use_cache: lookup("USE_CACHE").unwrap_or_default() == "1",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.pause, Duration::from_secs(2));
        assert_eq!(config.retry.scope, RetryScope::TimeoutsOnly);
        assert_eq!(config.fetch_timeout, Duration::from_secs(60));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.players_snapshot.is_none());
        assert!(!config.use_cache);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("FETCH_RETRIES", "5"),
            ("FETCH_RETRY_PAUSE_SECS", "0"),
            ("RETRY_SCOPE", "all"),
            ("PLAYERS_SNAPSHOT", "data/nba_data.json"),
            ("USE_CACHE", "1"),
        ]))
        .unwrap();
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.pause, Duration::ZERO);
        assert_eq!(config.retry.scope, RetryScope::AllErrors);
        assert_eq!(config.players_snapshot, Some(PathBuf::from("data/nba_data.json")));
        assert!(config.use_cache);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup_from(&[("FETCH_RETRIES", "three")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("FETCH_RETRIES", "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("RETRY_SCOPE", "never")])).is_err());
    }
}
