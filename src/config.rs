//! Engine configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local runs.

use std::env;
use std::str::FromStr;
use tokio::sync::Semaphore;

use crate::services::distance::DEFAULT_PROXIMITY_BUFFER_MILES;

/// Engine configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GeoJSON file holding the attraction catalog
    pub attractions_path: String,
    /// Radius within which a visit earns a reward (statute miles)
    pub proximity_buffer_miles: f64,
    /// Batch worker pool size per available core
    pub workers_per_core: usize,
    /// Attractions checked at once for a single visit
    pub attraction_concurrency: usize,
    /// Default length of nearest-attraction listings
    pub nearest_attractions_count: usize,
    /// Simulated latency of the built-in reward oracle (milliseconds)
    pub oracle_latency_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            attractions_path: "data/attractions.geojson".to_string(),
            proximity_buffer_miles: DEFAULT_PROXIMITY_BUFFER_MILES,
            workers_per_core: 4,
            attraction_concurrency: 32,
            nearest_attractions_count: 5,
            oracle_latency_ms: 0,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let config = Self {
            attractions_path: env::var("ATTRACTIONS_PATH").unwrap_or(defaults.attractions_path),
            proximity_buffer_miles: parse_var(
                "PROXIMITY_BUFFER_MILES",
                defaults.proximity_buffer_miles,
            )?,
            workers_per_core: parse_var("REWARDS_WORKERS_PER_CORE", defaults.workers_per_core)?,
            attraction_concurrency: parse_var(
                "ATTRACTION_CONCURRENCY",
                defaults.attraction_concurrency,
            )?,
            nearest_attractions_count: parse_var(
                "NEAREST_ATTRACTIONS_COUNT",
                defaults.nearest_attractions_count,
            )?,
            oracle_latency_ms: parse_var("ORACLE_LATENCY_MS", defaults.oracle_latency_ms)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.proximity_buffer_miles.is_finite() && self.proximity_buffer_miles > 0.0) {
            return Err(ConfigError::Invalid {
                name: "PROXIMITY_BUFFER_MILES",
                value: self.proximity_buffer_miles.to_string(),
            });
        }
        // The batch pool is one semaphore sized cores * workers_per_core
        let pool_fits = available_cores()
            .checked_mul(self.workers_per_core)
            .is_some_and(|size| size <= Semaphore::MAX_PERMITS);
        if self.workers_per_core == 0 || !pool_fits {
            return Err(ConfigError::Invalid {
                name: "REWARDS_WORKERS_PER_CORE",
                value: self.workers_per_core.to_string(),
            });
        }
        if self.attraction_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "ATTRACTION_CONCURRENCY",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Number of cores the batch worker pool is scaled by.
pub(crate) fn available_cores() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Parse an optional environment variable, using `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::Invalid {
            name,
            value: "<non-unicode>".to_string(),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only test that touches the process environment.
    #[test]
    fn test_config_from_env() {
        env::remove_var("ATTRACTIONS_PATH");
        env::remove_var("REWARDS_WORKERS_PER_CORE");
        env::remove_var("NEAREST_ATTRACTIONS_COUNT");
        env::remove_var("ORACLE_LATENCY_MS");
        env::set_var("PROXIMITY_BUFFER_MILES", "25.5");
        env::set_var("ATTRACTION_CONCURRENCY", "8");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.attractions_path, "data/attractions.geojson");
        assert_eq!(config.proximity_buffer_miles, 25.5);
        assert_eq!(config.attraction_concurrency, 8);
        assert_eq!(config.workers_per_core, 4);
        assert_eq!(config.nearest_attractions_count, 5);

        env::set_var("PROXIMITY_BUFFER_MILES", "-3");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                name: "PROXIMITY_BUFFER_MILES",
                ..
            })
        ));

        env::set_var("PROXIMITY_BUFFER_MILES", "ten");
        assert!(Config::from_env().is_err());

        env::remove_var("PROXIMITY_BUFFER_MILES");
        env::remove_var("ATTRACTION_CONCURRENCY");
    }

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_oversized_worker_pool() {
        for workers_per_core in [0, Semaphore::MAX_PERMITS + 1, usize::MAX / 2, usize::MAX] {
            let config = Config {
                workers_per_core,
                ..Config::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::Invalid {
                        name: "REWARDS_WORKERS_PER_CORE",
                        ..
                    })
                ),
                "workers_per_core = {} should be rejected",
                workers_per_core
            );
        }

        let largest = Config {
            workers_per_core: Semaphore::MAX_PERMITS / available_cores(),
            ..Config::default()
        };
        assert!(largest.validate().is_ok());
    }
}
