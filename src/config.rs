//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::cache::{CacheOptions, SweepStrategy};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL in seconds for writes that do not carry one (0 = never expires)
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Reaper sweep interval in seconds
    pub cleanup_interval: u64,
    /// How much of the cache each reaper sweep visits
    pub sweep_strategy: SweepStrategy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 0, no expiry)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Reaper frequency in seconds (default: 1)
    /// - `SWEEP_STRATEGY` - `full` or `tail` (default: full)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            sweep_strategy: parse_var("SWEEP_STRATEGY").unwrap_or(defaults.sweep_strategy),
        }
    }

    /// Cache construction options derived from this configuration.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions::new(self.max_entries)
            .reap_interval(Duration::from_secs(self.cleanup_interval))
            .sweep(self.sweep_strategy)
    }

    /// TTL applied to writes that do not specify one.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }
}

/// Reads and parses `name`, warning about values that do not parse.
fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value {:?} for {}", raw, name);
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 0,
            server_port: 3000,
            cleanup_interval: 1,
            sweep_strategy: SweepStrategy::Full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, 0);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.sweep_strategy, SweepStrategy::Full);
    }

    // Env vars are process-global, so every env case lives in one test
    #[test]
    fn test_config_from_env() {
        for name in [
            "MAX_ENTRIES",
            "DEFAULT_TTL",
            "SERVER_PORT",
            "CLEANUP_INTERVAL",
            "SWEEP_STRATEGY",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, 0);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.sweep_strategy, SweepStrategy::Full);

        env::set_var("MAX_ENTRIES", "64");
        env::set_var("SWEEP_STRATEGY", "tail");
        env::set_var("SERVER_PORT", "not-a-port");

        let config = Config::from_env();
        assert_eq!(config.max_entries, 64);
        assert_eq!(config.sweep_strategy, SweepStrategy::Tail);
        assert_eq!(config.server_port, 3000);

        env::remove_var("MAX_ENTRIES");
        env::remove_var("SWEEP_STRATEGY");
        env::remove_var("SERVER_PORT");
    }

    #[test]
    fn test_cache_options_from_config() {
        let config = Config {
            max_entries: 10,
            cleanup_interval: 5,
            sweep_strategy: SweepStrategy::Tail,
            ..Config::default()
        };

        let options = config.cache_options();
        assert_eq!(options.max_size, 10);
        assert_eq!(options.reap_interval, Duration::from_secs(5));
        assert_eq!(options.sweep, SweepStrategy::Tail);
    }
}
