//! Retry settings loaded from files or the environment.
//!
//! [`Settings`] is the serializable form of a [`BackoffConfig`] plus the
//! [`StatusPolicy`] and an optional retry cap. Durations are stored in
//! milliseconds so the TOML stays readable:
//!
//! ```toml
//! initial_interval_ms = 500
//! randomization_factor = 0.5
//! multiplier = 1.5
//! max_interval_ms = 60000
//! max_elapsed_time_ms = 900000
//! max_retries = 5
//! retryable_statuses = [429]
//! ```

use crate::error::Result;
use crate::outcome::{DEFAULT_RETRYABLE_STATUSES, StatusPolicy};
use httpbackoff_core::backoff::BackoffConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix of every environment variable read by [`Settings::from_env`].
pub const ENV_PREFIX: &str = "HTTPBACKOFF_";

/// Serializable retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// First wait, before jitter.
    pub initial_interval_ms: u64,

    /// Jitter spread, in `[0, 1)`.
    pub randomization_factor: f64,

    /// Growth factor per retry, greater than 1.
    pub multiplier: f64,

    /// Cap on the un-jittered wait.
    pub max_interval_ms: u64,

    /// Total time budget; 0 retries forever.
    pub max_elapsed_time_ms: u64,

    /// Optional cap on the number of retries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Non-5xx statuses that are retried.
    pub retryable_statuses: Vec<u16>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(BackoffConfig::default())
    }
}

impl From<BackoffConfig> for Settings {
    fn from(config: BackoffConfig) -> Self {
        Self {
            initial_interval_ms: millis(config.initial_interval),
            randomization_factor: config.randomization_factor,
            multiplier: config.multiplier,
            max_interval_ms: millis(config.max_interval),
            max_elapsed_time_ms: millis(config.max_elapsed_time),
            max_retries: None,
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Settings {
    /// Parse settings from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Load settings from environment variables, after reading `.env` if present.
    ///
    /// This will look for:
    /// - `HTTPBACKOFF_INITIAL_INTERVAL_MS`
    /// - `HTTPBACKOFF_RANDOMIZATION_FACTOR`
    /// - `HTTPBACKOFF_MULTIPLIER`
    /// - `HTTPBACKOFF_MAX_INTERVAL_MS`
    /// - `HTTPBACKOFF_MAX_ELAPSED_TIME_MS`
    /// - `HTTPBACKOFF_MAX_RETRIES`
    /// - `HTTPBACKOFF_RETRYABLE_STATUSES` (comma separated, may be empty)
    ///
    /// Unset variables keep their defaults; malformed ones are an error.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut settings = Self::default();

        if let Some(v) = env_parse("INITIAL_INTERVAL_MS")? {
            settings.initial_interval_ms = v;
        }
        if let Some(v) = env_parse("RANDOMIZATION_FACTOR")? {
            settings.randomization_factor = v;
        }
        if let Some(v) = env_parse("MULTIPLIER")? {
            settings.multiplier = v;
        }
        if let Some(v) = env_parse("MAX_INTERVAL_MS")? {
            settings.max_interval_ms = v;
        }
        if let Some(v) = env_parse("MAX_ELAPSED_TIME_MS")? {
            settings.max_elapsed_time_ms = v;
        }
        if let Some(v) = env_parse("MAX_RETRIES")? {
            settings.max_retries = Some(v);
        }
        if let Some(list) = env_var("RETRYABLE_STATUSES") {
            settings.retryable_statuses = parse_statuses(&list)?;
        }

        Ok(settings)
    }

    /// The backoff parameters, validated.
    pub fn backoff_config(&self) -> Result<BackoffConfig> {
        let config = BackoffConfig {
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            randomization_factor: self.randomization_factor,
            multiplier: self.multiplier,
            max_interval: Duration::from_millis(self.max_interval_ms),
            max_elapsed_time: Duration::from_millis(self.max_elapsed_time_ms),
        };
        config.validate()?;
        Ok(config)
    }

    /// The status policy these settings describe.
    pub fn status_policy(&self) -> StatusPolicy {
        StatusPolicy::with_statuses(self.retryable_statuses.iter().copied())
    }
}

#[cfg(feature = "env")]
fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}")).ok()
}

#[cfg(feature = "env")]
fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env_var(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| crate::Error::Settings(format!("{ENV_PREFIX}{name}: cannot parse {raw:?}"))),
    }
}

#[cfg(feature = "env")]
fn parse_statuses(list: &str) -> Result<Vec<u16>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u16>()
                .map_err(|_| crate::Error::Settings(format!("invalid status code {s:?}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use assert_matches::assert_matches;
    use httpbackoff_core::ConfigError;
    use std::io::Write;

    #[test]
    fn test_default_settings_match_default_config() {
        let settings = Settings::default();
        assert_eq!(settings.initial_interval_ms, 500);
        assert_eq!(settings.max_elapsed_time_ms, 15 * 60 * 1000);
        assert_eq!(settings.retryable_statuses, vec![429]);
        assert_eq!(settings.backoff_config().unwrap(), BackoffConfig::default());
        assert_eq!(settings.status_policy(), StatusPolicy::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            initial_interval_ms = 10
            max_retries = 3
            retryable_statuses = []
            "#,
        )
        .unwrap();

        assert_eq!(settings.initial_interval_ms, 10);
        assert_eq!(settings.multiplier, 1.5);
        assert_eq!(settings.max_retries, Some(3));
        assert_eq!(settings.status_policy(), StatusPolicy::strict());
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = Settings {
            max_retries: Some(7),
            retryable_statuses: vec![408, 429],
            ..Settings::from(BackoffConfig::fast())
        };
        let rendered = settings.to_toml_string().unwrap();
        assert_eq!(Settings::from_toml_str(&rendered).unwrap(), settings);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Settings::from_toml_str("multiplier = \"fast\"").unwrap_err();
        assert_matches!(err, Error::Settings(_));
    }

    #[test]
    fn test_invalid_backoff_rejected() {
        let settings = Settings {
            multiplier: 1.0,
            ..Settings::default()
        };
        assert_matches!(
            settings.backoff_config(),
            Err(Error::InvalidConfig(ConfigError::InvalidMultiplier(_)))
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "initial_interval_ms = 1\nmax_interval_ms = 5\nmax_elapsed_time_ms = 20").unwrap();

        let settings = Settings::load(file.path()).unwrap();
        let config = settings.backoff_config().unwrap();
        assert_eq!(config.initial_interval, Duration::from_millis(1));
        assert_eq!(config.max_interval, Duration::from_millis(5));
        assert_eq!(config.max_elapsed_time, Duration::from_millis(20));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(dir.path().join("missing.toml")).unwrap_err();
        assert_matches!(err, Error::Io(_));
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_parse_statuses() {
        assert_eq!(parse_statuses("429, 408,").unwrap(), vec![429, 408]);
        assert!(parse_statuses("").unwrap().is_empty());
        assert!(parse_statuses("teapot").is_err());
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_settings_from_env_variables() {
        temp_env::with_vars(
            [
                ("HTTPBACKOFF_INITIAL_INTERVAL_MS", Some("25")),
                ("HTTPBACKOFF_RANDOMIZATION_FACTOR", Some("0.1")),
                ("HTTPBACKOFF_MULTIPLIER", Some("2")),
                ("HTTPBACKOFF_MAX_INTERVAL_MS", Some("1000")),
                ("HTTPBACKOFF_MAX_ELAPSED_TIME_MS", Some("0")),
                ("HTTPBACKOFF_MAX_RETRIES", Some("4")),
                ("HTTPBACKOFF_RETRYABLE_STATUSES", Some("")),
            ],
            || {
                let settings = Settings::from_env().unwrap();
                assert_eq!(settings.initial_interval_ms, 25);
                assert_eq!(settings.randomization_factor, 0.1);
                assert_eq!(settings.multiplier, 2.0);
                assert_eq!(settings.max_interval_ms, 1000);
                assert_eq!(settings.max_retries, Some(4));
                assert!(settings.retryable_statuses.is_empty());

                let config = settings.backoff_config().unwrap();
                assert!(!config.has_elapsed_limit());
            },
        );
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_settings_from_env_rejects_garbage() {
        temp_env::with_var("HTTPBACKOFF_MAX_RETRIES", Some("lots"), || {
            let err = Settings::from_env().unwrap_err();
            assert!(err.to_string().contains("HTTPBACKOFF_MAX_RETRIES"));
        });
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_settings_from_env_defaults() {
        temp_env::with_vars_unset(
            [
                "HTTPBACKOFF_INITIAL_INTERVAL_MS",
                "HTTPBACKOFF_MAX_RETRIES",
                "HTTPBACKOFF_RETRYABLE_STATUSES",
            ],
            || {
                let settings = Settings::from_env().unwrap();
                assert_eq!(settings.initial_interval_ms, 500);
                assert_eq!(settings.max_retries, None);
                assert_eq!(settings.retryable_statuses, vec![429]);
            },
        );
    }
}
